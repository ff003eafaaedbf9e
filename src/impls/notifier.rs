use crate::services::NotificationLog;
use download_jobs::{Notification, Notifier};

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.push(notification);
    }
}
