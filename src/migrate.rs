//! Schema versions of the persisted main document and the migrations between
//! them.
//!
//! * V1 predates categories: tasks carry a flat `category` enum string, and
//!   `autoReset` / `notifications` may be missing. It has no `schemaVersion`.
//! * V2 is [`Document`], written with `schemaVersion: 2`.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    fallback_category, Category, Checklist, Document, Priority, Task, TaskStatus, Timestamp,
    SCHEMA_VERSION,
};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentV1 {
    #[serde(default)]
    pub checklists: Vec<ChecklistV1>,
    #[serde(default)]
    pub active_checklist_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistV1 {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskV1>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub auto_reset: Option<bool>,
    #[serde(default)]
    pub last_reset_date: Option<String>,
    #[serde(default)]
    pub notifications: Option<bool>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskV1 {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    /// Old flat enum (`news`, `solution`, ...). Superseded by `category_id`.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub enum VersionedDocument {
    V1(DocumentV1),
    V2(Document),
}

impl VersionedDocument {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        match value.get("schemaVersion").and_then(Value::as_u64) {
            None | Some(1) => Ok(VersionedDocument::V1(serde_json::from_value(value)?)),
            Some(version) => {
                if version > u64::from(SCHEMA_VERSION) {
                    log::warn!(
                        "migrate: document schema_version={version} is newer than {SCHEMA_VERSION}, reading as current"
                    );
                }
                Ok(VersionedDocument::V2(serde_json::from_value(value)?))
            }
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            VersionedDocument::V1(_) => 1,
            VersionedDocument::V2(_) => SCHEMA_VERSION,
        }
    }

    /// Brings any supported version up to the current schema and repairs the
    /// data-model invariants.
    pub fn into_current(self, now: Timestamp) -> Document {
        let mut document = match self {
            VersionedDocument::V1(v1) => migrate_v1_to_v2(v1, now),
            VersionedDocument::V2(v2) => v2,
        };
        document.schema_version = SCHEMA_VERSION;
        let repaired = repair_document(&mut document);
        if repaired > 0 {
            log::warn!("migrate: repaired {repaired} inconsistencies in loaded document");
        }
        document
    }
}

pub fn load_document(raw: &str, now: Timestamp) -> Result<Document, serde_json::Error> {
    let versioned = VersionedDocument::parse(raw)?;
    if versioned.version() != SCHEMA_VERSION {
        log::info!(
            "migrate: upgrading document from schema_version={} to {}",
            versioned.version(),
            SCHEMA_VERSION
        );
    }
    Ok(versioned.into_current(now))
}

pub fn migrate_v1_to_v2(document: DocumentV1, now: Timestamp) -> Document {
    Document {
        schema_version: SCHEMA_VERSION,
        checklists: document
            .checklists
            .into_iter()
            .map(|checklist| migrate_checklist_v1(checklist, now))
            .collect(),
        active_checklist_id: document.active_checklist_id,
    }
}

fn migrate_checklist_v1(checklist: ChecklistV1, now: Timestamp) -> Checklist {
    let categories = match checklist.categories {
        Some(categories) if !categories.is_empty() => categories,
        _ => vec![fallback_category()],
    };
    let default_category = categories[0].id.clone();
    let created_at = checklist.created_at.unwrap_or(now);

    let tasks = checklist
        .tasks
        .into_iter()
        .map(|task| {
            let category_id = task
                .category_id
                .filter(|id| categories.iter().any(|c| &c.id == id))
                .unwrap_or_else(|| default_category.clone());
            let task_created_at = task.created_at.unwrap_or(created_at);
            Task {
                id: task.id,
                name: task.name,
                scheduled_time: task.scheduled_time.filter(|t| !t.trim().is_empty()),
                category_id,
                priority: task.priority.unwrap_or_default(),
                status: task.status,
                notes: task.notes,
                time_limit: task.time_limit,
                created_at: task_created_at,
                completed_at: task.completed_at,
            }
        })
        .collect();

    Checklist {
        id: checklist.id,
        name: if checklist.name.trim().is_empty() {
            "Untitled".to_string()
        } else {
            checklist.name
        },
        tasks,
        categories,
        color: checklist
            .color
            .unwrap_or_else(|| crate::models::CHECKLIST_COLORS[0].to_string()),
        auto_reset: checklist.auto_reset.unwrap_or(false),
        last_reset_date: checklist.last_reset_date,
        notifications: checklist.notifications.unwrap_or(true),
        created_at,
    }
}

/// Restores the data-model invariants on a loaded document. Returns the
/// number of fixes applied.
pub fn repair_document(document: &mut Document) -> usize {
    let mut fixes = 0;
    for checklist in &mut document.checklists {
        fixes += repair_checklist(checklist);
    }
    if let Some(active) = &document.active_checklist_id {
        if !document.checklists.iter().any(|c| &c.id == active) {
            document.active_checklist_id = None;
            fixes += 1;
        }
    }
    fixes
}

pub fn repair_checklist(checklist: &mut Checklist) -> usize {
    let mut fixes = 0;
    if checklist.categories.is_empty() {
        checklist.categories.push(fallback_category());
        fixes += 1;
    }
    let fallback = checklist.categories[0].id.clone();
    let known: Vec<String> = checklist.categories.iter().map(|c| c.id.clone()).collect();
    for task in &mut checklist.tasks {
        if !known.contains(&task.category_id) {
            task.category_id = fallback.clone();
            fixes += 1;
        }
        match task.status {
            TaskStatus::Pending if task.completed_at.is_some() => {
                task.completed_at = None;
                fixes += 1;
            }
            TaskStatus::Completed if task.completed_at.is_none() => {
                task.completed_at = Some(task.created_at);
                fixes += 1;
            }
            _ => {}
        }
    }
    fixes
}
