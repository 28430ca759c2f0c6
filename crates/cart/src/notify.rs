//! One-shot user-facing notifications.
//!
//! Each mutating cart operation reports its outcome exactly once through a
//! [`Notifier`]. UI layers plug in their toast system; the default writes
//! tracing events.

use tracing::{info, warn};

/// Outcome severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives notices from the cart client.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Emits notices as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(notice = %notice.message, "Cart notice"),
            NoticeLevel::Error => warn!(notice = %notice.message, "Cart notice"),
        }
    }
}

/// Collects notices in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: parking_lot::Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Everything received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
