use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::Clock;
use crate::ledger::ReminderLedger;
use crate::notify::{ensure_ready, Notifier};
use crate::reminder::{collect_due_reminders, Reminder};
use crate::state::AppState;
use crate::storage::{self, KeyValueStore, StorageError};
use crate::time::{clock_string, is_midnight_minute, now_minutes, today};

/// Ties the data model, the dedup ledger and the notifier together and runs
/// the per-tick reminder and rollover work. Cloning shares everything.
///
/// The store is the source of truth: every tick first picks up a document
/// written by another process, so reminders follow edits made elsewhere and
/// a midnight reset never writes back an outdated copy.
#[derive(Clone)]
pub struct ReminderEngine {
    state: AppState,
    ledger: Arc<Mutex<ReminderLedger>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
    /// Raw document text last read or written by this engine.
    synced: Arc<Mutex<Option<String>>>,
}

impl ReminderEngine {
    /// Loads the document and the ledger, and runs the load-time auto-reset
    /// so a day missed while the process was down is caught up.
    pub fn bootstrap(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let today = today(clock.now());
        let ledger = ReminderLedger::load(store.clone(), &today);
        let engine = Self {
            state: AppState::empty(),
            ledger: Arc::new(Mutex::new(ledger)),
            notifier,
            clock,
            store,
            synced: Arc::new(Mutex::new(None)),
        };
        engine.sync_from_store();
        log::info!(
            "engine: loaded checklists={} date={}",
            engine.state.checklists().len(),
            today
        );
        if engine.state.auto_reset(&today) > 0 {
            engine.persist_document_logged();
        }
        engine
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    fn lock_ledger(&self) -> MutexGuard<'_, ReminderLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_synced(&self) -> MutexGuard<'_, Option<String>> {
        self.synced.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of reminders recorded for the current ledger day.
    pub fn fired_count(&self) -> usize {
        self.lock_ledger().len()
    }

    /// Replaces the in-memory document when the stored one changed since this
    /// engine last read or wrote it. Returns true when a new copy was taken.
    pub fn sync_from_store(&self) -> bool {
        let Some(raw) = storage::read_document(self.store.as_ref()) else {
            return false;
        };
        let mut synced = self.lock_synced();
        if synced.as_deref() == Some(raw.as_str()) {
            return false;
        }
        let changed = match storage::parse_document(&raw, self.clock.now_utc()) {
            Some(document) => {
                log::info!(
                    "engine: picked up stored document checklists={}",
                    document.checklists.len()
                );
                self.state.replace(document);
                true
            }
            None => false,
        };
        *synced = Some(raw);
        changed
    }

    pub fn persist_document(&self) -> Result<(), StorageError> {
        let mut synced = self.lock_synced();
        let written = storage::save_document(self.store.as_ref(), &self.state.document())?;
        *synced = Some(written);
        Ok(())
    }

    fn persist_document_logged(&self) {
        if let Err(err) = self.persist_document() {
            log::error!("engine: failed to save document: {err}");
        }
    }

    /// One dispatch poll: fires every due reminder not yet in the ledger and
    /// returns the ones that were displayed.
    ///
    /// A reminder is recorded only after the notifier accepted it, so a failed
    /// display is retried on the next poll inside the matching window.
    pub fn dispatch_tick(&self) -> Vec<Reminder> {
        if let Err(reason) = ensure_ready(self.notifier.as_ref()) {
            log::trace!("engine: dispatch skipped: {reason}");
            return Vec::new();
        }

        self.sync_from_store();
        let now = self.clock.now();
        let today = today(now);
        let mut ledger = self.lock_ledger();
        if ledger.date() != today {
            self.roll_day(&mut ledger, &today);
        }

        let due = self
            .state
            .with_checklists(|checklists| collect_due_reminders(checklists, now_minutes(now), &ledger));

        let mut fired = Vec::with_capacity(due.len());
        for reminder in due {
            match self
                .notifier
                .display(&reminder.title, &reminder.body, &reminder.tag)
            {
                Ok(()) => {
                    if let Err(err) = ledger.record(&reminder.key) {
                        log::warn!(
                            "engine: failed to persist ledger key={}: {err}",
                            reminder.key
                        );
                    }
                    log::info!(
                        "engine: reminder fired at={} task_id={} offset={} title={:?}",
                        clock_string(now),
                        reminder.task_id,
                        reminder.offset,
                        reminder.title
                    );
                    fired.push(reminder);
                }
                Err(err) => {
                    log::warn!(
                        "engine: reminder display failed task_id={} offset={}: {err}",
                        reminder.task_id,
                        reminder.offset
                    );
                }
            }
        }
        fired
    }

    /// One rollover poll. During the midnight minute, or whenever the ledger
    /// still belongs to an earlier day, runs the daily auto-reset and clears
    /// the ledger. Returns true when the rollover work ran.
    pub fn rollover_tick(&self) -> bool {
        self.sync_from_store();
        let now = self.clock.now();
        let today = today(now);
        let mut ledger = self.lock_ledger();
        if !is_midnight_minute(now) && ledger.date() == today {
            return false;
        }
        self.roll_day(&mut ledger, &today);
        true
    }

    fn roll_day(&self, ledger: &mut ReminderLedger, today: &str) {
        if self.state.auto_reset(today) > 0 {
            self.persist_document_logged();
        }
        if let Err(err) = ledger.roll_over(today) {
            log::warn!("engine: failed to persist cleared ledger: {err}");
        }
    }
}
