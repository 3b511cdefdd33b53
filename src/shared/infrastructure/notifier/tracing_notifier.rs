use crate::shared::infrastructure::notifier::{Notification, NotificationLevel, Notifier};
use tracing::{error, info, warn};

/// Writes notifications to the log; the binary's notifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let detail = notification.detail.as_deref().unwrap_or("");
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(title = %notification.title, detail, "notification");
            }
            NotificationLevel::Warning => {
                warn!(title = %notification.title, detail, "notification");
            }
            NotificationLevel::Error => {
                error!(title = %notification.title, detail, "notification");
            }
        }
    }
}
