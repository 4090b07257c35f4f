//! Notification sink that records what it receives.

use std::sync::Mutex;

use crate::notify::{Notification, NotificationKind, NotificationSink};

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications().iter().map(|n| n.kind).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
