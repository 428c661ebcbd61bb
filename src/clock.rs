use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};

/// Source of local wall-clock time for the engine.
pub trait Clock: Send + Sync {
    /// Local wall-clock time (no offset attached).
    fn now(&self) -> NaiveDateTime;

    /// Instant used for `createdAt` / `completedAt` stamps.
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Virtual clock shared between a test driver and the code under test.
///
/// The local time and UTC are treated as the same timeline, which is enough
/// for stamps that only need to be ordered.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(at(8, 0));
        let other = clock.clone();
        clock.advance(Duration::minutes(90));
        assert_eq!(other.now(), at(9, 30));

        other.set(at(23, 59));
        assert_eq!(clock.now(), at(23, 59));
        assert_eq!(clock.now_utc().naive_utc(), at(23, 59));
    }
}
