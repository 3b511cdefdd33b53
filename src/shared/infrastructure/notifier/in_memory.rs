use crate::shared::infrastructure::notifier::{Notification, NotificationLevel, Notifier};
use std::sync::{Mutex, PoisonError};

/// Keeps every notification; tests assert on what the operator would have seen.
#[derive(Default)]
pub struct InMemoryNotifier {
    received: Mutex<Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.received()
            .iter()
            .filter(|notification| notification.level == level)
            .count()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received().pop()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod in_memory_notifier_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_record_notifications_in_order() {
        let notifier = InMemoryNotifier::new();
        notifier.notify(Notification::success("Saved"));
        notifier.notify(Notification::error("Could not load orders", "network error"));

        assert_eq!(notifier.received().len(), 2);
        assert_eq!(notifier.count(NotificationLevel::Error), 1);
        assert_eq!(
            notifier.last().unwrap().detail.as_deref(),
            Some("network error")
        );
    }
}
