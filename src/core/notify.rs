//! Notifications (toast) untuk umpan balik aksi pengguna
//!
//! Kegagalan tidak pernah dilempar melewati batas halaman: semuanya
//! diubah jadi state tampilan atau notifikasi sementara.

use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            description: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Sink for transient user notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Collects notifications (view responses and tests)
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    items: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.items.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());
        if let Ok(mut items) = self.items.lock() {
            items.push(notification);
        }
    }
}

/// Writes notifications to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        let description = n.description.as_deref().unwrap_or("");
        match n.level {
            NotificationLevel::Error => error!(title = %n.title, description, "notification"),
            _ => info!(title = %n.title, description, "notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_take_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::success("ok").with_description("detail"));
        notifier.notify(Notification::error("gagal"));

        let taken = notifier.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].description.as_deref(), Some("detail"));
        assert_eq!(taken[1].level, NotificationLevel::Error);
        assert!(notifier.snapshot().is_empty());
    }
}
