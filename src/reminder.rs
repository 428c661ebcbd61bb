use serde::Serialize;

use crate::ledger::{ReminderKey, ReminderLedger};
use crate::models::{Checklist, Priority, Task};
use crate::time::clock_minutes;

const HIGH_OFFSETS: [u32; 3] = [5, 2, 0];
const MEDIUM_OFFSETS: [u32; 2] = [2, 0];
const NORMAL_OFFSETS: [u32; 1] = [0];

/// Minutes before the scheduled time at which reminders fire (0 = on time).
pub fn offsets_for(priority: Priority) -> &'static [u32] {
    match priority {
        Priority::High => &HIGH_OFFSETS,
        Priority::Medium => &MEDIUM_OFFSETS,
        Priority::Normal => &NORMAL_OFFSETS,
    }
}

/// An offset matches in the minute it names and the minute after, so one
/// missed poll does not lose the reminder. Nothing matches more than a minute
/// past the scheduled time.
pub fn is_due(minutes_until: i64, offset: u32) -> bool {
    let offset = i64::from(offset);
    (minutes_until == offset || minutes_until == offset - 1) && minutes_until >= -1
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub checklist_id: String,
    pub task_id: String,
    pub offset: u32,
    pub title: String,
    pub body: String,
    pub tag: String,
    #[serde(skip)]
    pub key: ReminderKey,
}

pub fn reminder_title(offset: u32, task_name: &str) -> String {
    match offset {
        0 => format!("Now: {task_name}"),
        minutes => format!("{minutes} min: {task_name}"),
    }
}

pub fn reminder_body(scheduled_time: &str, checklist_name: &str, priority: Priority) -> String {
    match priority {
        Priority::Normal => format!("{scheduled_time} • {checklist_name}"),
        other => format!(
            "{scheduled_time} • {checklist_name} • {} priority",
            other.label()
        ),
    }
}

pub fn reminder_tag(task_id: &str, offset: u32) -> String {
    format!("{task_id}-{offset}")
}

fn build_reminder(checklist: &Checklist, task: &Task, scheduled_time: &str, offset: u32) -> Reminder {
    Reminder {
        checklist_id: checklist.id.clone(),
        task_id: task.id.clone(),
        offset,
        title: reminder_title(offset, &task.name),
        body: reminder_body(scheduled_time, &checklist.name, task.priority),
        tag: reminder_tag(&task.id, offset),
        key: ReminderKey::new(&task.id, scheduled_time, offset),
    }
}

/// Every reminder due at `now_minutes` that the ledger has not seen yet.
///
/// Skips checklists with notifications off, completed tasks, and tasks whose
/// scheduled time is missing or malformed.
pub fn collect_due_reminders(
    checklists: &[Checklist],
    now_minutes: u32,
    ledger: &ReminderLedger,
) -> Vec<Reminder> {
    let mut due = Vec::new();
    for checklist in checklists {
        if !checklist.notifications {
            continue;
        }
        for task in &checklist.tasks {
            if task.is_completed() {
                continue;
            }
            let Some(scheduled_time) = task.scheduled_time.as_deref() else {
                continue;
            };
            let Some(task_minutes) = clock_minutes(scheduled_time) else {
                log::debug!(
                    "reminder: skipping task_id={} with malformed time {:?}",
                    task.id,
                    scheduled_time
                );
                continue;
            };
            let minutes_until = i64::from(task_minutes) - i64::from(now_minutes);
            for &offset in offsets_for(task.priority) {
                if !is_due(minutes_until, offset) {
                    continue;
                }
                let reminder = build_reminder(checklist, task, scheduled_time, offset);
                if ledger.contains(&reminder.key) {
                    continue;
                }
                due.push(reminder);
            }
        }
    }
    due
}
