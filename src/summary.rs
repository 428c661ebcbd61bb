//! Read-only views over a checklist for listing surfaces.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{Checklist, Task};
use crate::time::{clock_minutes, now_minutes, sorted_by_scheduled_time, time_period, TimePeriod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub percent: u32,
}

pub fn progress(checklist: &Checklist) -> Progress {
    let total = checklist.tasks.len();
    let completed = checklist.tasks.iter().filter(|t| t.is_completed()).count();
    let percent = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };
    Progress {
        total,
        completed,
        pending: total - completed,
        percent,
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub category_id: Option<String>,
    pub hide_completed: bool,
}

impl TaskFilter {
    fn accepts(&self, task: &Task) -> bool {
        if self.hide_completed && task.is_completed() {
            return false;
        }
        self.category_id
            .as_deref()
            .is_none_or(|category| task.category_id == category)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodGroup {
    pub period: TimePeriod,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodView {
    /// Non-empty periods, morning first.
    pub groups: Vec<PeriodGroup>,
    pub untimed: Vec<Task>,
}

impl PeriodView {
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.tasks.len()).sum::<usize>() + self.untimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group_by_period(tasks: &[Task], filter: &TaskFilter) -> PeriodView {
    let mut untimed = Vec::new();
    let mut buckets: Vec<PeriodGroup> = TimePeriod::ALL
        .iter()
        .map(|&period| PeriodGroup {
            period,
            tasks: Vec::new(),
        })
        .collect();

    for task in sorted_by_scheduled_time(tasks) {
        if !filter.accepts(&task) {
            continue;
        }
        match task.scheduled_time.as_deref() {
            Some(time) => {
                let period = time_period(time);
                if let Some(group) = buckets.iter_mut().find(|g| g.period == period) {
                    group.tasks.push(task);
                }
            }
            None => untimed.push(task),
        }
    }

    buckets.retain(|g| !g.tasks.is_empty());
    PeriodView {
        groups: buckets,
        untimed,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Focus {
    pub current: Option<String>,
    pub upcoming: Vec<String>,
}

/// Picks the task to work on now and the two after it. Once every pending
/// timed task is behind `now`, the earliest pending tasks are shown instead.
pub fn focus(tasks: &[Task], now: NaiveDateTime) -> Focus {
    let minute = now_minutes(now);
    let pending: Vec<Task> = sorted_by_scheduled_time(tasks)
        .into_iter()
        .filter(|t| !t.is_completed())
        .collect();
    let ahead: Vec<&Task> = pending
        .iter()
        .filter(|t| {
            t.scheduled_time
                .as_deref()
                .and_then(clock_minutes)
                .is_some_and(|m| m >= minute)
        })
        .collect();
    let highlighted: Vec<&Task> = if ahead.is_empty() {
        pending.iter().collect()
    } else {
        ahead
    };

    let mut ids = highlighted.into_iter().map(|t| t.id.clone());
    Focus {
        current: ids.next(),
        upcoming: ids.take(2).collect(),
    }
}
