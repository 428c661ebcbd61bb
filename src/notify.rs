use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifications are not supported on this platform")]
    Unsupported,
    #[error("notification permission is not granted")]
    PermissionDenied,
    #[error("failed to display notification: {0}")]
    Display(String),
}

/// Platform notification permission and display primitive.
pub trait Notifier: Send + Sync {
    fn is_supported(&self) -> bool;

    fn permission(&self) -> Permission;

    /// Returns true iff the resulting permission is `Granted`.
    fn request_permission(&self) -> bool;

    fn display(&self, title: &str, body: &str, tag: &str) -> Result<(), NotifyError>;
}

/// Dispatch only has an effect when the platform supports notifications and
/// permission is currently granted.
pub fn ensure_ready(notifier: &dyn Notifier) -> Result<(), NotifyError> {
    if !notifier.is_supported() {
        return Err(NotifyError::Unsupported);
    }
    if notifier.permission() != Permission::Granted {
        return Err(NotifyError::PermissionDenied);
    }
    Ok(())
}

/// Desktop notifications through the session notification server.
///
/// Desktop servers have no permission prompt, so permission is always
/// granted.
#[cfg(feature = "app")]
pub struct DesktopNotifier {
    app_name: String,
}

#[cfg(feature = "app")]
impl DesktopNotifier {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }
}

#[cfg(feature = "app")]
impl Notifier for DesktopNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> bool {
        true
    }

    fn display(&self, title: &str, body: &str, tag: &str) -> Result<(), NotifyError> {
        log::debug!("notify: showing desktop notification tag={tag}");
        notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(title)
            .body(body)
            .timeout(notify_rust::Timeout::Milliseconds(5000))
            .show()
            .map(|_| ())
            .map_err(|err| NotifyError::Display(err.to_string()))
    }
}

/// Writes reminders to the log instead of the desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> bool {
        true
    }

    fn display(&self, title: &str, body: &str, tag: &str) -> Result<(), NotifyError> {
        log::info!("notify: title={title:?} body={body:?} tag={tag}");
        Ok(())
    }
}
