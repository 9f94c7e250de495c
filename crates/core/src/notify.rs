//! Non-blocking user notifications (the dashboard's toasts)

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info, warn};

/// How long a toast stays up unless told otherwise
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Sink for user-facing notifications
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!("[{}] {}", notification.level, notification.message),
            NotificationLevel::Warning => warn!("[{}] {}", notification.level, notification.message),
            NotificationLevel::Error => error!("[{}] {}", notification.level, notification.message),
        }
    }
}

/// Notifier that keeps every notification; clones share the log
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Rc<RefCell<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        self.entries.borrow_mut().push(notification);
    }
}
