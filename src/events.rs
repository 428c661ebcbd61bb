use crate::models::Checklist;

pub const EVENT_STATE_UPDATED: &str = "state_updated";

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    pub checklists: Vec<Checklist>,
    pub active_checklist_id: Option<String>,
}
