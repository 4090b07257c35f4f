//! User-facing notifications and host events.
//!
//! Workflows never return remote failures unreported: every outcome is turned
//! into a [`Notification`] handed to a [`NotificationSink`].

use std::sync::Mutex;

use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    /// Qualified success: the operation completed with per-item failures.
    Warning,
    Error,
}

/// A toast-style message for the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Receiver of user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Event token signalled to the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HostEvent {
    /// A document was created; the host refreshes and closes the active view.
    #[serde(rename = "document created")]
    DocumentCreated,
    /// A document was released to its signers.
    #[serde(rename = "document sent")]
    DocumentSent,
}

impl HostEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostEvent::DocumentCreated => "document created",
            HostEvent::DocumentSent => "document sent",
        }
    }
}

fn log_notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::Success => {
            info!(title = %notification.title, "{}", notification.message)
        }
        NotificationKind::Warning => {
            warn!(title = %notification.title, "{}", notification.message)
        }
        NotificationKind::Error => {
            error!(title = %notification.title, "{}", notification.message)
        }
    }
}

/// Sink that logs and keeps notifications for the caller to return.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl NotificationSink for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        log_notification(&notification);
        match self.notifications.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
