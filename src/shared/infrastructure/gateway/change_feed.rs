// Fan-out of change events to the subscriptions registered for a table.
//
// Responsibilities
// - Register and release subscriptions.
// - Deliver an event to every subscriber of the table whose predicate matches one of the
//   affected rows; drop subscribers whose receiving side is gone.
// - Close a table's channels so their streams end, the way a dropped socket does.

use crate::shared::core::predicate::Predicate;
use crate::shared::core::row::Row;
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::{ChangeEvent, ChangeKind, Subscription};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

struct Subscriber {
    table: Table,
    predicate: Option<Predicate>,
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

#[derive(Default)]
struct FeedInner {
    next_id: u64,
    subscribers: HashMap<u64, Subscriber>,
}

#[derive(Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table: Table, predicate: Option<Predicate>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.next_id += 1;
            let id = inner.next_id;
            inner.subscribers.insert(
                id,
                Subscriber {
                    table,
                    predicate,
                    sender,
                },
            );
            id
        };
        debug!(%table, subscription = id, "subscribed to changes");

        let inner = Arc::clone(&self.inner);
        Subscription::new(table, receiver, move || {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .subscribers
                .remove(&id);
            debug!(%table, subscription = id, "released subscription");
        })
    }

    pub fn publish(&self, table: Table, kind: ChangeKind, rows: &[&Row]) {
        self.fan_out(table, kind, |predicate| {
            rows.iter().any(|row| predicate.matches(row))
        });
    }

    /// Delivers to every subscriber of the table whatever its predicate.
    /// Used when the affected rows are unknown, so a row leaving a filter is not missed.
    pub fn publish_to_all(&self, table: Table, kind: ChangeKind) {
        self.fan_out(table, kind, |_| true);
    }

    /// Ends every subscription on `table`; their `next()` returns `None` from now on.
    pub fn close(&self, table: Table) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .subscribers
            .retain(|_, subscriber| subscriber.table != table);
        debug!(%table, "closed change channels");
    }

    fn fan_out(&self, table: Table, kind: ChangeKind, matches: impl Fn(&Predicate) -> bool) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.retain(|_, subscriber| {
            if subscriber.table != table {
                return true;
            }
            let interested = subscriber.predicate.as_ref().is_none_or(&matches);
            !interested || subscriber.sender.send(ChangeEvent { table, kind }).is_ok()
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .len()
    }
}
