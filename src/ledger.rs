use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError, LEDGER_KEY};

/// Identity of one reminder: a task at a given scheduled time and offset.
///
/// The scheduled time is part of the key so that rescheduling a task re-arms
/// reminders that already fired for the old time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub task_id: String,
    pub scheduled_time: String,
    pub offset: u32,
}

impl ReminderKey {
    pub fn new(task_id: &str, scheduled_time: &str, offset: u32) -> Self {
        Self {
            task_id: task_id.to_string(),
            scheduled_time: scheduled_time.to_string(),
            offset,
        }
    }
}

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.task_id, self.scheduled_time, self.offset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFile {
    pub date: String,
    pub fired_keys: Vec<String>,
}

/// Per-day set of reminders that already fired, persisted in its own slot.
pub struct ReminderLedger {
    store: Arc<dyn KeyValueStore>,
    date: String,
    fired: HashSet<String>,
}

impl ReminderLedger {
    /// Loads the persisted ledger, discarding it when it belongs to another day.
    pub fn load(store: Arc<dyn KeyValueStore>, today: &str) -> Self {
        let fired = match store.get(LEDGER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<LedgerFile>(&raw) {
                Ok(file) if file.date == today => file.fired_keys.into_iter().collect(),
                Ok(file) => {
                    log::info!(
                        "ledger: discarding {} entries from {}",
                        file.fired_keys.len(),
                        file.date
                    );
                    HashSet::new()
                }
                Err(err) => {
                    log::warn!("ledger: failed to parse persisted ledger: {err}");
                    HashSet::new()
                }
            },
            Ok(None) => HashSet::new(),
            Err(err) => {
                log::warn!("ledger: failed to read persisted ledger: {err}");
                HashSet::new()
            }
        };
        Self {
            store,
            date: today.to_string(),
            fired,
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    pub fn contains(&self, key: &ReminderKey) -> bool {
        self.fired.contains(&key.to_string())
    }

    /// Marks `key` fired and persists the whole ledger. The in-memory mark
    /// stays even when the write fails.
    pub fn record(&mut self, key: &ReminderKey) -> Result<(), StorageError> {
        self.fired.insert(key.to_string());
        self.persist()
    }

    /// Empties the ledger and stamps it with `today`.
    pub fn clear(&mut self, today: &str) -> Result<(), StorageError> {
        let dropped = self.fired.len();
        self.fired.clear();
        self.date = today.to_string();
        log::info!("ledger: cleared {dropped} entries for {today}");
        self.persist()
    }

    /// Clears the ledger if it still belongs to an earlier day. Returns true
    /// when a rollover happened.
    pub fn roll_over(&mut self, today: &str) -> Result<bool, StorageError> {
        if self.date == today {
            return Ok(false);
        }
        self.clear(today)?;
        Ok(true)
    }

    pub fn to_file(&self) -> LedgerFile {
        let mut fired_keys: Vec<String> = self.fired.iter().cloned().collect();
        fired_keys.sort();
        LedgerFile {
            date: self.date.clone(),
            fired_keys,
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.to_file())?;
        self.store.set(LEDGER_KEY, &json)
    }
}
