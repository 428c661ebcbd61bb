use std::fs;
use std::path::PathBuf;

use crate::events::StatePayload;
use crate::exchange::{export_checklist_json, export_file_name, import_into};
use crate::models::{Category, Checklist, Task, Timestamp};
use crate::state::{AppState, CategoryPatch, ModelError, TaskDraft, TaskPatch};
use crate::storage::{save_document, write_atomic_bytes, KeyValueStore, StorageError};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// What a command needs from the surface that hosts it.
pub trait CommandCtx {
    fn store(&self) -> &dyn KeyValueStore;
    fn now(&self) -> Timestamp;
    fn exports_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

pub fn state_payload(state: &AppState) -> StatePayload {
    let document = state.document();
    StatePayload {
        checklists: document.checklists,
        active_checklist_id: document.active_checklist_id,
    }
}

fn persist(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    save_document(ctx.store(), &state.document())?;
    ctx.emit_state_updated(state_payload(state));
    Ok(())
}

/// Persists after a successful mutation and wraps the outcome.
fn commit<T>(
    ctx: &impl CommandCtx,
    state: &AppState,
    result: Result<T, ModelError>,
) -> CommandResult<T> {
    let value = match result {
        Ok(value) => value,
        Err(error) => return err(&error.to_string()),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(value)
}

/// Finds a checklist by id, or by case-insensitive name.
pub fn resolve_checklist(state: &AppState, key: &str) -> Option<String> {
    state.with_checklists(|checklists| {
        checklists
            .iter()
            .find(|c| c.id == key)
            .or_else(|| checklists.iter().find(|c| c.name.eq_ignore_ascii_case(key.trim())))
            .map(|c| c.id.clone())
    })
}

/// Finds a task in a checklist by id, or by case-insensitive name.
pub fn resolve_task(state: &AppState, checklist_id: &str, key: &str) -> Option<String> {
    let checklist = state.checklist(checklist_id)?;
    checklist
        .task(key)
        .or_else(|| {
            checklist
                .tasks
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(key.trim()))
        })
        .map(|t| t.id.clone())
}

pub fn get_state(state: &AppState) -> CommandResult<StatePayload> {
    ok(state_payload(state))
}

pub fn add_checklist(ctx: &impl CommandCtx, state: &AppState, name: &str) -> CommandResult<Checklist> {
    let checklist = state.add_checklist(name, ctx.now());
    commit(ctx, state, Ok(checklist))
}

pub fn rename_checklist(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    name: &str,
) -> CommandResult<bool> {
    let result = state.rename_checklist(checklist_id, name).map(|()| true);
    commit(ctx, state, result)
}

pub fn delete_checklist(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
) -> CommandResult<bool> {
    let result = state.delete_checklist(checklist_id).map(|()| true);
    commit(ctx, state, result)
}

pub fn duplicate_checklist(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
) -> CommandResult<Checklist> {
    let result = state.duplicate_checklist(checklist_id, ctx.now());
    commit(ctx, state, result)
}

pub fn set_active_checklist(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: Option<&str>,
) -> CommandResult<bool> {
    let result = state.set_active_checklist(checklist_id).map(|()| true);
    commit(ctx, state, result)
}

pub fn clear_completed_tasks(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
) -> CommandResult<usize> {
    let result = state.clear_completed_tasks(checklist_id);
    commit(ctx, state, result)
}

pub fn toggle_auto_reset(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
) -> CommandResult<bool> {
    let result = state.toggle_auto_reset(checklist_id);
    commit(ctx, state, result)
}

pub fn toggle_notifications(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
) -> CommandResult<bool> {
    let result = state.toggle_notifications(checklist_id);
    commit(ctx, state, result)
}

pub fn add_category(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    name: &str,
    color: &str,
) -> CommandResult<Category> {
    let result = state.add_category(checklist_id, name, color);
    commit(ctx, state, result)
}

pub fn update_category(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    category_id: &str,
    patch: CategoryPatch,
) -> CommandResult<Category> {
    let result = state.update_category(checklist_id, category_id, patch);
    commit(ctx, state, result)
}

pub fn delete_category(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    category_id: &str,
) -> CommandResult<usize> {
    let result = state.delete_category(checklist_id, category_id);
    commit(ctx, state, result)
}

pub fn add_task(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    draft: TaskDraft,
) -> CommandResult<Task> {
    let result = state.add_task(checklist_id, draft, ctx.now());
    commit(ctx, state, result)
}

pub fn update_task(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    task_id: &str,
    patch: TaskPatch,
) -> CommandResult<Task> {
    let result = state.update_task(checklist_id, task_id, patch);
    commit(ctx, state, result)
}

pub fn delete_task(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    task_id: &str,
) -> CommandResult<bool> {
    let result = state.delete_task(checklist_id, task_id).map(|()| true);
    commit(ctx, state, result)
}

pub fn toggle_task_status(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    task_id: &str,
) -> CommandResult<Task> {
    let result = state.toggle_task_status(checklist_id, task_id, ctx.now());
    commit(ctx, state, result)
}

pub fn reorder_tasks(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    task_ids: &[String],
) -> CommandResult<bool> {
    let result = state.reorder_tasks(checklist_id, task_ids).map(|()| true);
    commit(ctx, state, result)
}

/// Writes the checklist export to `path`, or to the exports directory under
/// a name derived from the checklist. Returns the written path.
pub fn export_checklist(
    ctx: &impl CommandCtx,
    state: &AppState,
    checklist_id: &str,
    path: Option<PathBuf>,
) -> CommandResult<String> {
    let Some(checklist) = state.checklist(checklist_id) else {
        return err(&ModelError::ChecklistNotFound(checklist_id.to_string()).to_string());
    };
    let path = match path {
        Some(path) => path,
        None => match ctx.exports_dir() {
            Ok(dir) => dir.join(export_file_name(&checklist.name)),
            Err(e) => return err(&format!("exports_dir error: {e}")),
        },
    };
    let json = match export_checklist_json(&checklist, ctx.now()) {
        Ok(json) => json,
        Err(e) => return err(&format!("json error: {e}")),
    };
    if let Err(error) = write_atomic_bytes(&path, json.as_bytes()) {
        return err(&format!("export error: {error:?}"));
    }
    log::info!(
        "commands: exported checklist id={} path={}",
        checklist.id,
        path.display()
    );
    ok(path.to_string_lossy().to_string())
}

/// Imports an export file's contents as a new active checklist.
pub fn import_checklist(ctx: &impl CommandCtx, state: &AppState, raw: &str) -> CommandResult<bool> {
    if !import_into(state, raw, ctx.now()) {
        return err("invalid checklist file");
    }
    commit(ctx, state, Ok(true))
}

pub fn import_checklist_file(
    ctx: &impl CommandCtx,
    state: &AppState,
    path: PathBuf,
) -> CommandResult<bool> {
    match fs::read_to_string(&path) {
        Ok(raw) => import_checklist(ctx, state, &raw),
        Err(e) => err(&format!("read error: {e}")),
    }
}
