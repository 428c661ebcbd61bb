//! Single-checklist JSON export/import.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    default_categories, new_id, random_color, Category, Checklist, Priority, Task, TaskStatus,
    Timestamp,
};
use crate::state::AppState;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub version: u32,
    pub exported_at: Timestamp,
    pub checklist: ExportedChecklist,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedChecklist {
    pub name: String,
    pub color: String,
    pub auto_reset: bool,
    pub notifications: bool,
    pub categories: Vec<Category>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid checklist json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("checklist json has no checklist name")]
    MissingName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportFile {
    #[serde(default)]
    checklist: Option<ImportedChecklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedChecklist {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    auto_reset: Option<bool>,
    #[serde(default)]
    notifications: Option<bool>,
    #[serde(default)]
    categories: Option<Vec<Category>>,
    #[serde(default)]
    tasks: Vec<ImportedTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedTask {
    #[serde(default)]
    name: String,
    #[serde(default)]
    scheduled_time: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    time_limit: Option<u32>,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

pub fn export_checklist(checklist: &Checklist, now: Timestamp) -> ExportFile {
    ExportFile {
        version: EXPORT_VERSION,
        exported_at: now,
        checklist: ExportedChecklist {
            name: checklist.name.clone(),
            color: checklist.color.clone(),
            auto_reset: checklist.auto_reset,
            notifications: checklist.notifications,
            categories: checklist.categories.clone(),
            tasks: checklist.tasks.clone(),
        },
    }
}

pub fn export_checklist_json(checklist: &Checklist, now: Timestamp) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_checklist(checklist, now))
}

/// `Work / Home` -> `Work___Home.json`
pub fn export_file_name(checklist_name: &str) -> String {
    let stem: String = checklist_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.json")
}

/// Builds a new checklist from an export file. Every id is regenerated,
/// task categories are remapped by category position, and all tasks come in
/// pending.
pub fn import_checklist(raw: &str, now: Timestamp) -> Result<Checklist, ImportError> {
    let file: ImportFile = serde_json::from_str(raw)?;
    let imported = file.checklist.ok_or(ImportError::MissingName)?;
    let name = imported
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(ImportError::MissingName)?;

    let old_categories = imported.categories.unwrap_or_default();
    let (categories, category_map) = if old_categories.is_empty() {
        (default_categories(), HashMap::new())
    } else {
        let mut map = HashMap::new();
        let categories: Vec<Category> = old_categories
            .into_iter()
            .map(|old| {
                let new = Category {
                    id: new_id(),
                    name: old.name,
                    color: old.color,
                };
                map.insert(old.id, new.id.clone());
                new
            })
            .collect();
        (categories, map)
    };
    let fallback = categories[0].id.clone();

    let tasks = imported
        .tasks
        .into_iter()
        .map(|task| Task {
            id: new_id(),
            name: task.name,
            scheduled_time: task.scheduled_time.filter(|t| !t.trim().is_empty()),
            category_id: task
                .category_id
                .and_then(|old| category_map.get(&old).cloned())
                .unwrap_or_else(|| fallback.clone()),
            priority: task.priority,
            status: TaskStatus::Pending,
            notes: task.notes,
            time_limit: task.time_limit,
            created_at: task.created_at.unwrap_or(now),
            completed_at: None,
        })
        .collect();

    Ok(Checklist {
        id: new_id(),
        name,
        tasks,
        categories,
        color: imported.color.unwrap_or_else(random_color),
        auto_reset: imported.auto_reset.unwrap_or(false),
        last_reset_date: None,
        notifications: imported.notifications.unwrap_or(true),
        created_at: now,
    })
}

/// Imports into `state` and makes the new checklist active. Returns false,
/// with nothing committed, when the input is invalid.
pub fn import_into(state: &AppState, raw: &str, now: Timestamp) -> bool {
    match import_checklist(raw, now) {
        Ok(checklist) => {
            log::info!(
                "exchange: imported checklist name={:?} tasks={}",
                checklist.name,
                checklist.tasks.len()
            );
            state.insert_checklist(checklist);
            true
        }
        Err(err) => {
            log::warn!("exchange: import rejected: {err}");
            false
        }
    }
}
