use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

pub const SCHEMA_VERSION: u32 = 2;
pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Normal,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Normal => "NORMAL",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn complete(&mut self, at: Timestamp) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }

    pub fn reopen(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub color: String,
    #[serde(default)]
    pub auto_reset: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset_date: Option<String>,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    pub created_at: Timestamp,
}

impl Checklist {
    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.category(category_id).is_some()
    }

    /// Category that tasks fall back to when theirs disappears.
    pub fn fallback_category_id(&self) -> Option<&str> {
        self.categories.first().map(|c| c.id.as_str())
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}

fn default_notifications() -> bool {
    true
}

/// The persisted main document (current schema).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub schema_version: u32,
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub active_checklist_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_dispatch_interval_secs")]
    pub dispatch_interval_secs: u64,
    #[serde(default = "default_rollover_interval_secs")]
    pub rollover_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dispatch_interval_secs: default_dispatch_interval_secs(),
            rollover_interval_secs: default_rollover_interval_secs(),
        }
    }
}

impl Settings {
    /// The one-minute look-back window only covers poll intervals of up to a
    /// minute; anything outside `[1, 60]` is clamped.
    pub fn normalized(mut self) -> Self {
        let clamped = self.dispatch_interval_secs.clamp(1, 60);
        if clamped != self.dispatch_interval_secs {
            log::warn!(
                "settings: dispatch_interval_secs={} out of range, using {}",
                self.dispatch_interval_secs,
                clamped
            );
            self.dispatch_interval_secs = clamped;
        }
        if self.rollover_interval_secs == 0 || self.rollover_interval_secs > 60 {
            log::warn!(
                "settings: rollover_interval_secs={} out of range, using {}",
                self.rollover_interval_secs,
                default_rollover_interval_secs()
            );
            self.rollover_interval_secs = default_rollover_interval_secs();
        }
        self
    }
}

fn default_dispatch_interval_secs() -> u64 {
    10
}

fn default_rollover_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    pub schema_version: u32,
    pub settings: Settings,
}

pub const CHECKLIST_COLORS: [&str; 7] = [
    "#3b82f6", // blue
    "#10b981", // emerald
    "#8b5cf6", // purple
    "#f59e0b", // amber
    "#ef4444", // red
    "#ec4899", // pink
    "#06b6d4", // cyan
];

pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("News", "#3b82f6"),
    ("Solution", "#10b981"),
    ("Image", "#8b5cf6"),
    ("Prompt", "#f59e0b"),
    ("Other", "#6b7280"),
];

pub const FALLBACK_CATEGORY: (&str, &str) = ("General", "#6b7280");

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn random_color() -> String {
    use rand::seq::SliceRandom;
    CHECKLIST_COLORS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CHECKLIST_COLORS[0])
        .to_string()
}

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color)| Category {
            id: new_id(),
            name: (*name).to_string(),
            color: (*color).to_string(),
        })
        .collect()
}

pub fn fallback_category() -> Category {
    Category {
        id: new_id(),
        name: FALLBACK_CATEGORY.0.to_string(),
        color: FALLBACK_CATEGORY.1.to_string(),
    }
}
