use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use crate::models::{
    default_categories, new_id, random_color, Category, Checklist, Document, Priority, Task,
    TaskStatus, Timestamp, SCHEMA_VERSION,
};
use crate::reset::auto_reset_all;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("checklist not found: {0}")]
    ChecklistNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("a checklist must keep at least one category")]
    LastCategory,
}

/// Fields supplied by the user when creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub time_limit: Option<u32>,
}

/// Partial update of a task. Outer `None` leaves a field untouched; for the
/// optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub scheduled_time: Option<Option<String>>,
    pub category_id: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<Option<String>>,
    pub time_limit: Option<Option<u32>>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// The in-memory document. Cloning shares the same underlying data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

#[derive(Debug, Default)]
struct AppData {
    checklists: Vec<Checklist>,
    active_checklist_id: Option<String>,
}

impl AppData {
    fn checklist_mut(&mut self, id: &str) -> Result<&mut Checklist, ModelError> {
        self.checklists
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ModelError::ChecklistNotFound(id.to_string()))
    }
}

fn name_or(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_time(time: Option<String>) -> Option<String> {
    time.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl AppState {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData {
                checklists: document.checklists,
                active_checklist_id: document.active_checklist_id,
            })),
        }
    }

    pub fn empty() -> Self {
        Self::new(Document::default())
    }

    /// Swaps in a document read from storage, keeping every clone in step.
    pub fn replace(&self, document: Document) {
        let mut guard = self.lock();
        guard.checklists = document.checklists;
        guard.active_checklist_id = document.active_checklist_id;
    }

    fn lock(&self) -> MutexGuard<'_, AppData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn document(&self) -> Document {
        let guard = self.lock();
        Document {
            schema_version: SCHEMA_VERSION,
            checklists: guard.checklists.clone(),
            active_checklist_id: guard.active_checklist_id.clone(),
        }
    }

    pub fn checklists(&self) -> Vec<Checklist> {
        self.lock().checklists.clone()
    }

    /// Runs `f` against the checklists without cloning them.
    pub fn with_checklists<R>(&self, f: impl FnOnce(&[Checklist]) -> R) -> R {
        let guard = self.lock();
        f(&guard.checklists)
    }

    pub fn checklist(&self, id: &str) -> Option<Checklist> {
        self.lock().checklists.iter().find(|c| c.id == id).cloned()
    }

    pub fn active_checklist_id(&self) -> Option<String> {
        self.lock().active_checklist_id.clone()
    }

    pub fn active_checklist(&self) -> Option<Checklist> {
        let guard = self.lock();
        let active = guard.active_checklist_id.as_deref()?;
        guard.checklists.iter().find(|c| c.id == active).cloned()
    }

    /// Daily reset across all checklists. Returns how many changed.
    pub fn auto_reset(&self, today: &str) -> usize {
        let mut guard = self.lock();
        auto_reset_all(&mut guard.checklists, today)
    }

    pub fn add_checklist(&self, name: &str, now: Timestamp) -> Checklist {
        let checklist = Checklist {
            id: new_id(),
            name: name_or(name, "Untitled"),
            tasks: Vec::new(),
            categories: default_categories(),
            color: random_color(),
            auto_reset: false,
            last_reset_date: None,
            notifications: true,
            created_at: now,
        };
        self.insert_checklist(checklist.clone());
        checklist
    }

    /// Appends a fully-formed checklist and makes it active.
    pub fn insert_checklist(&self, checklist: Checklist) {
        let mut guard = self.lock();
        guard.active_checklist_id = Some(checklist.id.clone());
        guard.checklists.push(checklist);
    }

    pub fn delete_checklist(&self, id: &str) -> Result<(), ModelError> {
        let mut guard = self.lock();
        let before = guard.checklists.len();
        guard.checklists.retain(|c| c.id != id);
        if guard.checklists.len() == before {
            return Err(ModelError::ChecklistNotFound(id.to_string()));
        }
        if guard.active_checklist_id.as_deref() == Some(id) {
            guard.active_checklist_id = guard.checklists.first().map(|c| c.id.clone());
        }
        Ok(())
    }

    pub fn rename_checklist(&self, id: &str, name: &str) -> Result<(), ModelError> {
        let mut guard = self.lock();
        guard.checklist_mut(id)?.name = name_or(name, "Untitled");
        Ok(())
    }

    /// Copies a checklist with fresh ids and pending tasks. The copy has no
    /// `last_reset_date`, so it gets its own first reset.
    pub fn duplicate_checklist(&self, id: &str, now: Timestamp) -> Result<Checklist, ModelError> {
        let original = self
            .checklist(id)
            .ok_or_else(|| ModelError::ChecklistNotFound(id.to_string()))?;
        let mut copy = original.clone();
        copy.id = new_id();
        copy.name = format!("{} (Copy)", original.name);
        copy.created_at = now;
        copy.last_reset_date = None;
        for task in &mut copy.tasks {
            task.id = new_id();
            task.reopen();
        }
        self.insert_checklist(copy.clone());
        Ok(copy)
    }

    pub fn set_active_checklist(&self, id: Option<&str>) -> Result<(), ModelError> {
        let mut guard = self.lock();
        if let Some(id) = id {
            if !guard.checklists.iter().any(|c| c.id == id) {
                return Err(ModelError::ChecklistNotFound(id.to_string()));
            }
        }
        guard.active_checklist_id = id.map(str::to_string);
        Ok(())
    }

    /// Removes completed tasks. Returns how many were removed.
    pub fn clear_completed_tasks(&self, id: &str) -> Result<usize, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(id)?;
        let before = checklist.tasks.len();
        checklist.tasks.retain(|t| !t.is_completed());
        Ok(before - checklist.tasks.len())
    }

    pub fn toggle_auto_reset(&self, id: &str) -> Result<bool, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(id)?;
        checklist.auto_reset = !checklist.auto_reset;
        Ok(checklist.auto_reset)
    }

    pub fn toggle_notifications(&self, id: &str) -> Result<bool, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(id)?;
        checklist.notifications = !checklist.notifications;
        Ok(checklist.notifications)
    }

    pub fn add_category(
        &self,
        checklist_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Category, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        let category = Category {
            id: new_id(),
            name: name_or(name, "New Category"),
            color: color.to_string(),
        };
        checklist.categories.push(category.clone());
        Ok(category)
    }

    pub fn update_category(
        &self,
        checklist_id: &str,
        category_id: &str,
        patch: CategoryPatch,
    ) -> Result<Category, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        let category = checklist
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| ModelError::CategoryNotFound(category_id.to_string()))?;
        if let Some(name) = patch.name {
            category.name = name_or(&name, "New Category");
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        Ok(category.clone())
    }

    /// Deletes a category and moves its tasks to the first remaining one.
    /// Returns how many tasks were reassigned.
    pub fn delete_category(&self, checklist_id: &str, category_id: &str) -> Result<usize, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        if !checklist.has_category(category_id) {
            return Err(ModelError::CategoryNotFound(category_id.to_string()));
        }
        if checklist.categories.len() == 1 {
            return Err(ModelError::LastCategory);
        }
        checklist.categories.retain(|c| c.id != category_id);
        let fallback = checklist.categories[0].id.clone();
        let mut reassigned = 0;
        for task in checklist
            .tasks
            .iter_mut()
            .filter(|t| t.category_id == category_id)
        {
            task.category_id = fallback.clone();
            reassigned += 1;
        }
        Ok(reassigned)
    }

    /// Creates a pending task. An unknown or missing category falls back to
    /// the checklist's first category.
    pub fn add_task(
        &self,
        checklist_id: &str,
        draft: TaskDraft,
        now: Timestamp,
    ) -> Result<Task, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        let category_id = match draft.category_id {
            Some(id) if checklist.has_category(&id) => id,
            _ => checklist
                .fallback_category_id()
                .map(str::to_string)
                .ok_or(ModelError::LastCategory)?,
        };
        let task = Task {
            id: new_id(),
            name: name_or(&draft.name, "Untitled task"),
            scheduled_time: normalize_time(draft.scheduled_time),
            category_id,
            priority: draft.priority,
            status: TaskStatus::Pending,
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
            time_limit: draft.time_limit.filter(|m| *m > 0),
            created_at: now,
            completed_at: None,
        };
        checklist.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(
        &self,
        checklist_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Task, ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        if let Some(category_id) = &patch.category_id {
            if !checklist.has_category(category_id) {
                return Err(ModelError::CategoryNotFound(category_id.clone()));
            }
        }
        let task = checklist
            .task_mut(task_id)
            .ok_or_else(|| ModelError::TaskNotFound(task_id.to_string()))?;
        if let Some(name) = patch.name {
            task.name = name_or(&name, &task.name);
        }
        if let Some(time) = patch.scheduled_time {
            task.scheduled_time = normalize_time(time);
        }
        if let Some(category_id) = patch.category_id {
            task.category_id = category_id;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(notes) = patch.notes {
            task.notes = notes.filter(|n| !n.trim().is_empty());
        }
        if let Some(time_limit) = patch.time_limit {
            task.time_limit = time_limit.filter(|m| *m > 0);
        }
        Ok(task.clone())
    }

    pub fn delete_task(&self, checklist_id: &str, task_id: &str) -> Result<(), ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        let before = checklist.tasks.len();
        checklist.tasks.retain(|t| t.id != task_id);
        if checklist.tasks.len() == before {
            return Err(ModelError::TaskNotFound(task_id.to_string()));
        }
        Ok(())
    }

    pub fn toggle_task_status(
        &self,
        checklist_id: &str,
        task_id: &str,
        now: Timestamp,
    ) -> Result<Task, ModelError> {
        let mut guard = self.lock();
        let task = guard
            .checklist_mut(checklist_id)?
            .task_mut(task_id)
            .ok_or_else(|| ModelError::TaskNotFound(task_id.to_string()))?;
        if task.is_completed() {
            task.reopen();
        } else {
            task.complete(now);
        }
        Ok(task.clone())
    }

    /// Rebuilds the task list in the order of `task_ids`. Unknown ids are
    /// ignored and tasks not named are dropped.
    pub fn reorder_tasks(&self, checklist_id: &str, task_ids: &[String]) -> Result<(), ModelError> {
        let mut guard = self.lock();
        let checklist = guard.checklist_mut(checklist_id)?;
        let mut remaining = std::mem::take(&mut checklist.tasks);
        let mut reordered = Vec::with_capacity(task_ids.len());
        for id in task_ids {
            if let Some(index) = remaining.iter().position(|t| &t.id == id) {
                reordered.push(remaining.swap_remove(index));
            }
        }
        checklist.tasks = reordered;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        "2024-03-09T08:00:00Z".parse().unwrap()
    }

    fn later() -> Timestamp {
        "2024-03-09T09:30:00Z".parse().unwrap()
    }

    fn draft(name: &str, time: Option<&str>) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            scheduled_time: time.map(str::to_string),
            ..TaskDraft::default()
        }
    }

    fn state_with_checklist() -> (AppState, Checklist) {
        let state = AppState::empty();
        let checklist = state.add_checklist("Work", now());
        (state, checklist)
    }

    #[test]
    fn add_checklist_uses_defaults_and_becomes_active() {
        let (state, checklist) = state_with_checklist();
        assert_eq!(checklist.name, "Work");
        assert_eq!(checklist.categories.len(), 5);
        assert!(!checklist.auto_reset);
        assert!(checklist.notifications);
        assert_eq!(state.active_checklist_id(), Some(checklist.id.clone()));

        let untitled = state.add_checklist("   ", now());
        assert_eq!(untitled.name, "Untitled");
        assert_eq!(state.active_checklist().unwrap().id, untitled.id);
    }

    #[test]
    fn delete_checklist_moves_active_to_first_remaining() {
        let (state, first) = state_with_checklist();
        let second = state.add_checklist("Home", now());
        state.delete_checklist(&second.id).unwrap();
        assert_eq!(state.active_checklist_id(), Some(first.id.clone()));

        state.delete_checklist(&first.id).unwrap();
        assert_eq!(state.active_checklist_id(), None);
        assert_eq!(
            state.delete_checklist("missing"),
            Err(ModelError::ChecklistNotFound("missing".to_string()))
        );
    }

    #[test]
    fn rename_and_toggles() {
        let (state, checklist) = state_with_checklist();
        state.rename_checklist(&checklist.id, "  Office ").unwrap();
        state.rename_checklist(&checklist.id, "").unwrap();
        assert_eq!(state.checklist(&checklist.id).unwrap().name, "Untitled");

        assert!(state.toggle_auto_reset(&checklist.id).unwrap());
        assert!(!state.toggle_notifications(&checklist.id).unwrap());
        let stored = state.checklist(&checklist.id).unwrap();
        assert!(stored.auto_reset);
        assert!(!stored.notifications);
    }

    #[test]
    fn duplicate_gets_fresh_ids_pending_tasks_and_no_reset_date() {
        let (state, checklist) = state_with_checklist();
        let task = state
            .add_task(&checklist.id, draft("Standup", Some("09:00")), now())
            .unwrap();
        state
            .toggle_task_status(&checklist.id, &task.id, later())
            .unwrap();
        state.toggle_auto_reset(&checklist.id).unwrap();
        state.auto_reset("2024-03-08");

        let copy = state.duplicate_checklist(&checklist.id, later()).unwrap();
        assert_ne!(copy.id, checklist.id);
        assert_eq!(copy.name, "Work (Copy)");
        assert_eq!(copy.last_reset_date, None);
        assert_ne!(copy.tasks[0].id, task.id);
        assert_eq!(copy.tasks[0].status, TaskStatus::Pending);
        assert_eq!(copy.tasks[0].completed_at, None);
        assert_eq!(state.active_checklist_id(), Some(copy.id.clone()));

        let original = state.checklist(&checklist.id).unwrap();
        assert_eq!(original.last_reset_date.as_deref(), Some("2024-03-08"));
    }

    #[test]
    fn set_active_rejects_unknown_ids() {
        let (state, checklist) = state_with_checklist();
        state.set_active_checklist(None).unwrap();
        assert_eq!(state.active_checklist_id(), None);
        assert!(state.set_active_checklist(Some("nope")).is_err());
        state.set_active_checklist(Some(&checklist.id)).unwrap();
        assert_eq!(state.active_checklist_id(), Some(checklist.id));
    }

    #[test]
    fn add_task_falls_back_to_first_category_and_normalizes_fields() {
        let (state, checklist) = state_with_checklist();
        let task = state
            .add_task(
                &checklist.id,
                TaskDraft {
                    name: " Review ".to_string(),
                    scheduled_time: Some("  ".to_string()),
                    category_id: Some("missing".to_string()),
                    priority: Priority::High,
                    notes: Some(" ".to_string()),
                    time_limit: Some(0),
                },
                now(),
            )
            .unwrap();
        assert_eq!(task.name, "Review");
        assert_eq!(task.scheduled_time, None);
        assert_eq!(task.category_id, checklist.categories[0].id);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.notes, None);
        assert_eq!(task.time_limit, None);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, now());
    }

    #[test]
    fn update_task_applies_patch_and_validates_category() {
        let (state, checklist) = state_with_checklist();
        let task = state
            .add_task(&checklist.id, draft("Standup", Some("09:00")), now())
            .unwrap();

        let updated = state
            .update_task(
                &checklist.id,
                &task.id,
                TaskPatch {
                    scheduled_time: Some(Some("14:00".to_string())),
                    priority: Some(Priority::Medium),
                    category_id: Some(checklist.categories[2].id.clone()),
                    time_limit: Some(Some(15)),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.scheduled_time.as_deref(), Some("14:00"));
        assert_eq!(updated.priority, Priority::Medium);
        assert_eq!(updated.category_id, checklist.categories[2].id);
        assert_eq!(updated.time_limit, Some(15));

        let cleared = state
            .update_task(
                &checklist.id,
                &task.id,
                TaskPatch {
                    scheduled_time: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.scheduled_time, None);

        let err = state
            .update_task(
                &checklist.id,
                &task.id,
                TaskPatch {
                    category_id: Some("ghost".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, ModelError::CategoryNotFound("ghost".to_string()));
        assert!(state
            .update_task(&checklist.id, "missing", TaskPatch::default())
            .is_err());
    }

    #[test]
    fn toggle_task_status_keeps_completed_at_invariant() {
        let (state, checklist) = state_with_checklist();
        let task = state
            .add_task(&checklist.id, draft("Standup", Some("09:00")), now())
            .unwrap();

        let done = state
            .toggle_task_status(&checklist.id, &task.id, later())
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.completed_at, Some(later()));

        let reopened = state
            .toggle_task_status(&checklist.id, &task.id, later())
            .unwrap();
        assert_eq!(reopened.status, TaskStatus::Pending);
        assert_eq!(reopened.completed_at, None);
    }

    #[test]
    fn delete_and_clear_completed_tasks() {
        let (state, checklist) = state_with_checklist();
        let a = state.add_task(&checklist.id, draft("a", None), now()).unwrap();
        let b = state.add_task(&checklist.id, draft("b", None), now()).unwrap();
        let c = state.add_task(&checklist.id, draft("c", None), now()).unwrap();
        state.toggle_task_status(&checklist.id, &a.id, later()).unwrap();
        state.toggle_task_status(&checklist.id, &c.id, later()).unwrap();

        assert_eq!(state.clear_completed_tasks(&checklist.id).unwrap(), 2);
        let tasks = state.checklist(&checklist.id).unwrap().tasks;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, b.id);

        state.delete_task(&checklist.id, &b.id).unwrap();
        assert!(state.checklist(&checklist.id).unwrap().tasks.is_empty());
        assert_eq!(
            state.delete_task(&checklist.id, &b.id),
            Err(ModelError::TaskNotFound(b.id.clone()))
        );
    }

    #[test]
    fn reorder_follows_given_ids_and_drops_unnamed_tasks() {
        let (state, checklist) = state_with_checklist();
        let a = state.add_task(&checklist.id, draft("a", None), now()).unwrap();
        let b = state.add_task(&checklist.id, draft("b", None), now()).unwrap();
        let c = state.add_task(&checklist.id, draft("c", None), now()).unwrap();

        state
            .reorder_tasks(
                &checklist.id,
                &[c.id.clone(), "ghost".to_string(), a.id.clone()],
            )
            .unwrap();
        let ids: Vec<String> = state
            .checklist(&checklist.id)
            .unwrap()
            .tasks
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![c.id, a.id]);
        assert!(!ids.contains(&b.id));
    }

    #[test]
    fn category_add_update_and_delete_with_reassignment() {
        let (state, checklist) = state_with_checklist();
        let extra = state.add_category(&checklist.id, "", "#123456").unwrap();
        assert_eq!(extra.name, "New Category");

        let renamed = state
            .update_category(
                &checklist.id,
                &extra.id,
                CategoryPatch {
                    name: Some("Deep work".to_string()),
                    color: None,
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Deep work");
        assert_eq!(renamed.color, "#123456");

        let task = state
            .add_task(
                &checklist.id,
                TaskDraft {
                    name: "Focus".to_string(),
                    category_id: Some(extra.id.clone()),
                    ..TaskDraft::default()
                },
                now(),
            )
            .unwrap();
        assert_eq!(task.category_id, extra.id);

        assert_eq!(state.delete_category(&checklist.id, &extra.id).unwrap(), 1);
        let stored = state.checklist(&checklist.id).unwrap();
        assert_eq!(stored.tasks[0].category_id, stored.categories[0].id);
        assert!(stored
            .tasks
            .iter()
            .all(|t| stored.has_category(&t.category_id)));
    }

    #[test]
    fn deleting_the_first_category_reassigns_to_the_new_first() {
        let (state, checklist) = state_with_checklist();
        let first = checklist.categories[0].id.clone();
        let second = checklist.categories[1].id.clone();
        let task = state
            .add_task(&checklist.id, draft("a", None), now())
            .unwrap();
        assert_eq!(task.category_id, first);

        state.delete_category(&checklist.id, &first).unwrap();
        let stored = state.checklist(&checklist.id).unwrap();
        assert_eq!(stored.tasks[0].category_id, second);
    }

    #[test]
    fn deleting_the_only_category_is_rejected() {
        let (state, checklist) = state_with_checklist();
        let ids: Vec<String> = checklist.categories.iter().map(|c| c.id.clone()).collect();
        for id in &ids[1..] {
            state.delete_category(&checklist.id, id).unwrap();
        }
        assert_eq!(
            state.delete_category(&checklist.id, &ids[0]),
            Err(ModelError::LastCategory)
        );
        assert_eq!(state.checklist(&checklist.id).unwrap().categories.len(), 1);
        assert!(matches!(
            state.delete_category(&checklist.id, "ghost"),
            Err(ModelError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn clones_share_state_but_separate_instances_do_not() {
        let (state, checklist) = state_with_checklist();
        let clone = state.clone();
        clone.rename_checklist(&checklist.id, "Shared").unwrap();
        assert_eq!(state.checklist(&checklist.id).unwrap().name, "Shared");

        let other = AppState::empty();
        assert!(other.checklists().is_empty());
        assert_eq!(state.document().checklists.len(), 1);
        assert_eq!(state.document().schema_version, SCHEMA_VERSION);
    }
}
