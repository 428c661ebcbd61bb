use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};

use crate::notify::{Notifier, NotifyError, Permission};

pub fn local(date: (i32, u32, u32), h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .expect("valid test datetime")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shown {
    pub title: String,
    pub body: String,
    pub tag: String,
}

/// Notifier double that records every display call.
pub struct RecordingNotifier {
    supported: bool,
    permission: Mutex<Permission>,
    fail_display: AtomicBool,
    shown: Mutex<Vec<Shown>>,
    attempts: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn granted() -> Self {
        Self::with(true, Permission::Granted)
    }

    pub fn with(supported: bool, permission: Permission) -> Self {
        Self {
            supported,
            permission: Mutex::new(permission),
            fail_display: AtomicBool::new(false),
            shown: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
        }
    }

    pub fn set_permission(&self, permission: Permission) {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner) = permission;
    }

    pub fn set_fail_display(&self, fail: bool) {
        self.fail_display.store(fail, Ordering::SeqCst);
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.shown().into_iter().map(|s| s.title).collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for RecordingNotifier {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_permission(&self) -> bool {
        let mut guard = self.permission.lock().unwrap_or_else(PoisonError::into_inner);
        if self.supported && *guard == Permission::Default {
            *guard = Permission::Granted;
        }
        *guard == Permission::Granted
    }

    fn display(&self, title: &str, body: &str, tag: &str) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if self.fail_display.load(Ordering::SeqCst) {
            return Err(NotifyError::Display("notification server unavailable".to_string()));
        }
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Shown {
                title: title.to_string(),
                body: body.to_string(),
                tag: tag.to_string(),
            });
        Ok(())
    }
}
