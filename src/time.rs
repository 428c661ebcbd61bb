use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::Task;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    /// Display order of the day buckets.
    pub const ALL: [TimePeriod; 4] = [
        TimePeriod::Morning,
        TimePeriod::Afternoon,
        TimePeriod::Evening,
        TimePeriod::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimePeriod::Morning => "Morning",
            TimePeriod::Afternoon => "Afternoon",
            TimePeriod::Evening => "Evening",
            TimePeriod::Night => "Night",
        }
    }

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimePeriod::Morning,
            12..=16 => TimePeriod::Afternoon,
            17..=20 => TimePeriod::Evening,
            _ => TimePeriod::Night,
        }
    }
}

/// Splits an `HH:mm` clock string. Returns `None` for anything that is not a
/// valid 24-hour time so callers can treat it as non-matching.
pub fn parse_clock(time: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = time.trim().split_once(':')?;
    if hours.is_empty() || minutes.len() != 2 {
        return None;
    }
    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

pub fn minutes_since_midnight(hour: u32, minute: u32) -> u32 {
    (hour * 60 + minute).min(MINUTES_PER_DAY - 1)
}

pub fn clock_minutes(time: &str) -> Option<u32> {
    parse_clock(time).map(|(hour, minute)| minutes_since_midnight(hour, minute))
}

pub fn now_minutes(now: NaiveDateTime) -> u32 {
    minutes_since_midnight(now.hour(), now.minute())
}

/// Malformed times land in `Night`, the bucket that catches every hour outside
/// the daytime ranges.
pub fn time_period(time: &str) -> TimePeriod {
    match parse_clock(time) {
        Some((hour, _)) => TimePeriod::from_hour(hour),
        None => TimePeriod::Night,
    }
}

/// 12-hour rendering, e.g. `"13:05"` -> `"1:05 PM"`. Malformed input is
/// returned unchanged.
pub fn format_display(time: &str) -> String {
    let Some((hour, minute)) = parse_clock(time) else {
        return time.to_string();
    };
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02} {suffix}")
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Local calendar date of `now` as `YYYY-MM-DD`.
pub fn today(now: NaiveDateTime) -> String {
    format_date(now.date())
}

/// `HH:mm` rendering of a wall-clock instant.
pub fn clock_string(now: NaiveDateTime) -> String {
    format!("{:02}:{:02}", now.hour(), now.minute())
}

pub fn is_midnight_minute(now: NaiveDateTime) -> bool {
    now.hour() == 0 && now.minute() == 0
}

fn sort_key(task: &Task) -> Option<u32> {
    task.scheduled_time.as_deref().and_then(clock_minutes)
}

/// Ascending by scheduled time. Tasks without a (valid) time go last, keeping
/// their relative order.
pub fn sort_by_scheduled_time(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| match sort_key(task) {
        Some(minutes) => (0, minutes),
        None => (1, 0),
    });
}

pub fn sorted_by_scheduled_time(tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    sort_by_scheduled_time(&mut out);
    out
}
