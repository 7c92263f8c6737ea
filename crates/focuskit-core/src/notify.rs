//! Fire-and-forget notification delivery.
//!
//! The focus timer announces every work/break switch. Delivery is the
//! front end's concern; a failed delivery is never reported back.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

pub trait NotificationSink {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: &Notification) {
        info!(title = %notification.title, body = %notification.body, "notification");
    }
}

/// Drops everything. Used when notifications are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: &Notification) {}
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut guard) = self.received.lock() {
            guard.push(notification.clone());
        }
    }
}
