use download_jobs::Notification;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::info;

const NOTIFICATION_LOG_CAPACITY: usize = 50;

/// Keeps the most recent user-facing notifications.
pub(crate) struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationLog {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(NOTIFICATION_LOG_CAPACITY)),
        }
    }

    pub(crate) fn push(&self, notification: Notification) {
        info!(title = %notification.title, description = %notification.description, "Notification");

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if entries.len() == NOTIFICATION_LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(notification);
    }

    pub(crate) fn recent(&self) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        entries.iter().cloned().collect()
    }
}
