// Entity List Loader.
//
// Purpose
// - Own the collection behind one view and keep it equal to the last applied fetch.
//
// Responsibilities
// - Fetch with the view's query and replace the collection atomically.
// - Last request wins: every load and every local reconcile takes a sequence number at
//   issue time; a response older than what is already applied is dropped.
// - Keep the last-known-good collection when a load fails.
// - Stop applying anything once the view is unmounted.

use crate::modules::sync::core::collection::EntityCollection;
use crate::shared::context::AppContext;
use crate::shared::core::entity::Entity;
use crate::shared::core::predicate::QuerySpec;
use crate::shared::core::row::{RecordId, Row};
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::policy::{CallPolicy, run_with_policy};
use crate::shared::infrastructure::gateway::{RemoteError, RemoteGateway};
use crate::shared::infrastructure::notifier::{Notification, Notifier};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("row {index} of {table} could not be decoded: {message}")]
    Decode {
        table: Table,
        index: usize,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    /// A newer load or local change was applied first; this response was dropped.
    Stale,
    Unmounted,
}

/// A committed mutation mirrored into the collection without a round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalChange<E> {
    Upserted(E),
    Removed(RecordId),
}

struct LoaderState<E> {
    collection: EntityCollection<E>,
    applied_seq: u64,
    last_error: Option<LoadError>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct EntityListLoader<E: Entity> {
    gateway: Arc<dyn RemoteGateway>,
    notifier: Arc<dyn Notifier>,
    query: QuerySpec,
    policy: CallPolicy,
    state: RwLock<LoaderState<E>>,
    issued: AtomicU64,
    in_flight: AtomicUsize,
    unmounted: watch::Sender<bool>,
}

pub fn decode_rows<E: Entity>(rows: Vec<Row>) -> Result<Vec<E>, LoadError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            E::from_row(row).map_err(|error| LoadError::Decode {
                table: E::TABLE,
                index,
                message: error.to_string(),
            })
        })
        .collect()
}

impl<E: Entity> EntityListLoader<E> {
    /// Queries without an explicit limit are capped at the configured page size.
    pub fn new(ctx: &AppContext, mut query: QuerySpec) -> Self {
        if query.limit.is_none() {
            query.limit = Some(ctx.config.page_limit);
        }
        Self {
            gateway: ctx.gateway.clone(),
            notifier: ctx.notifier.clone(),
            query,
            policy: ctx.config.query_policy(),
            state: RwLock::new(LoaderState {
                collection: EntityCollection::new(),
                applied_seq: 0,
                last_error: None,
            }),
            issued: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            unmounted: watch::Sender::new(false),
        }
    }

    pub fn table(&self) -> Table {
        E::TABLE
    }

    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        if self.is_unmounted() {
            return Ok(LoadOutcome::Unmounted);
        }
        let seq = self.next_seq();
        let _loading = InFlight::enter(&self.in_flight);
        let mut unmounted = self.unmounted.subscribe();

        let fetch = run_with_policy(&self.policy, || self.gateway.query(E::TABLE, &self.query));
        let fetched = tokio::select! {
            result = fetch => result,
            _ = unmounted.wait_for(|unmounted| *unmounted) => {
                debug!(table = %E::TABLE, seq, "load cancelled by unmount");
                return Ok(LoadOutcome::Unmounted);
            }
        };
        let decoded = fetched
            .map_err(LoadError::from)
            .and_then(decode_rows::<E>);

        let mut state = self.state.write().await;
        if self.is_unmounted() {
            return Ok(LoadOutcome::Unmounted);
        }
        if seq <= state.applied_seq {
            debug!(table = %E::TABLE, seq, applied = state.applied_seq, "dropping stale load");
            return Ok(LoadOutcome::Stale);
        }
        state.applied_seq = seq;

        match decoded {
            Ok(items) => {
                state.collection.replace_all(items);
                state.last_error = None;
                let count = state.collection.len();
                info!(table = %E::TABLE, seq, count, "collection loaded");
                Ok(LoadOutcome::Applied { count })
            }
            Err(error) => {
                warn!(table = %E::TABLE, seq, %error, "load failed, keeping last known collection");
                state.last_error = Some(error.clone());
                drop(state);
                self.notifier.notify(Notification::error(
                    format!("Could not load {}", E::TABLE),
                    error.to_string(),
                ));
                Err(error)
            }
        }
    }

    /// Mirrors a committed mutation. Records that no longer match the view's filter leave it.
    pub async fn reconcile(&self, change: LocalChange<E>) {
        if self.is_unmounted() {
            return;
        }
        let seq = self.next_seq();
        let mut state = self.state.write().await;
        state.applied_seq = state.applied_seq.max(seq);
        match change {
            LocalChange::Upserted(entity) => {
                if self.belongs_to_view(&entity) {
                    state.collection.upsert(entity);
                    if let Some(order_by) = &self.query.order_by {
                        state.collection.sort_by(order_by);
                    }
                } else {
                    state.collection.remove(entity.id());
                }
            }
            LocalChange::Removed(id) => {
                state.collection.remove(&id);
            }
        }
        debug!(table = %E::TABLE, seq, "local change reconciled");
    }

    pub async fn apply_filter(&self, predicate: impl Fn(&E) -> bool) -> Vec<E> {
        let state = self.state.read().await;
        state
            .collection
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    pub async fn compute_stats<R>(&self, init: R, step: impl FnMut(R, &E) -> R) -> R {
        let state = self.state.read().await;
        state.collection.iter().fold(init, step)
    }

    pub async fn snapshot(&self) -> Vec<E> {
        self.state.read().await.collection.items().to_vec()
    }

    pub async fn get(&self, id: &RecordId) -> Option<E> {
        self.state.read().await.collection.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.collection.len()
    }

    pub async fn last_error(&self) -> Option<LoadError> {
        self.state.read().await.last_error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// In-flight loads resolve as `Unmounted`; nothing is applied afterwards.
    pub fn unmount(&self) {
        self.unmounted.send_replace(true);
    }

    pub fn is_unmounted(&self) -> bool {
        *self.unmounted.borrow()
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn belongs_to_view(&self, entity: &E) -> bool {
        match (&self.query.predicate, entity.to_row()) {
            (Some(predicate), Ok(row)) => predicate.matches(&row),
            _ => true,
        }
    }
}

#[cfg(test)]
mod entity_list_loader_tests {
    use super::*;
    use crate::modules::orders::core::order::{Order, OrderStatus};
    use crate::shared::core::predicate::{OrderBy, Predicate};
    use crate::shared::infrastructure::gateway::in_memory::InMemoryGateway;
    use crate::shared::infrastructure::notifier::NotificationLevel;
    use crate::shared::infrastructure::notifier::in_memory::InMemoryNotifier;
    use crate::tests::fixtures::context::make_context;
    use crate::tests::fixtures::orders::OrderBuilder;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    type BeforeEachReturn = (Arc<InMemoryGateway>, Arc<InMemoryNotifier>, AppContext);

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        make_context()
    }

    async fn seed_two(gateway: &InMemoryGateway) {
        gateway
            .seed(
                Table::Orders,
                vec![
                    OrderBuilder::new().id("1").total_price(100.0).build_row(),
                    OrderBuilder::new()
                        .id("2")
                        .status(OrderStatus::Completed)
                        .total_price(50.0)
                        .build_row(),
                ],
            )
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_replace_the_collection_on_load(before_each: BeforeEachReturn) {
        let (gateway, _, ctx) = before_each;
        seed_two(&gateway).await;
        let loader = EntityListLoader::<Order>::new(&ctx, QuerySpec::new().order_by(OrderBy::asc("id")));

        assert_eq!(loader.load().await, Ok(LoadOutcome::Applied { count: 2 }));
        assert_eq!(loader.len().await, 2);
        assert!(!loader.is_loading());
        let total = loader.compute_stats(0.0, |sum, order| sum + order.total_price).await;
        assert_eq!(total, 150.0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_last_known_collection_when_a_load_fails(
        before_each: BeforeEachReturn,
    ) {
        let (gateway, notifier, ctx) = before_each;
        seed_two(&gateway).await;
        let loader = EntityListLoader::<Order>::new(&ctx, QuerySpec::new());
        loader.load().await.unwrap();

        gateway.toggle_offline();
        let result = loader.load().await;

        assert!(matches!(result, Err(LoadError::Remote(RemoteError::Network(_)))));
        assert_eq!(loader.len().await, 2);
        assert!(loader.last_error().await.is_some());
        assert!(!loader.is_loading());
        assert_eq!(notifier.count(NotificationLevel::Error), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_undecodable_rows(before_each: BeforeEachReturn) {
        let (gateway, _, ctx) = before_each;
        let bad = serde_json::json!({ "id": "1", "status": "lost" });
        gateway
            .seed(Table::Orders, vec![bad.as_object().unwrap().clone()])
            .await;
        let loader = EntityListLoader::<Order>::new(&ctx, QuerySpec::new());

        let result = loader.load().await;

        assert!(matches!(result, Err(LoadError::Decode { index: 0, .. })));
        assert_eq!(loader.len().await, 0);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_let_the_last_issued_load_win(before_each: BeforeEachReturn) {
        let (gateway, _, ctx) = before_each;
        seed_two(&gateway).await;
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));
        gateway.push_query_delay_ms(100);
        gateway.push_query_delay_ms(50);

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        gateway
            .seed(Table::Orders, vec![OrderBuilder::new().id("3").build_row()])
            .await;
        let second = loader.load().await;
        let first = first.await.unwrap();

        assert_eq!(second, Ok(LoadOutcome::Applied { count: 3 }));
        assert_eq!(first, Ok(LoadOutcome::Stale));
        assert_eq!(loader.len().await, 3);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_ignore_results_after_unmount(before_each: BeforeEachReturn) {
        let (gateway, _, ctx) = before_each;
        seed_two(&gateway).await;
        gateway.set_delay_ms(100);
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));

        let pending = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        loader.unmount();

        assert_eq!(pending.await.unwrap(), Ok(LoadOutcome::Unmounted));
        assert_eq!(loader.load().await, Ok(LoadOutcome::Unmounted));
        assert_eq!(loader.len().await, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_drop_reconciled_records_that_leave_the_view(before_each: BeforeEachReturn) {
        let (gateway, _, ctx) = before_each;
        seed_two(&gateway).await;
        let loader = EntityListLoader::<Order>::new(
            &ctx,
            QuerySpec::new().filter(Predicate::eq("status", "pending")),
        );
        loader.load().await.unwrap();
        assert_eq!(loader.len().await, 1);

        let shipped = OrderBuilder::new()
            .id("1")
            .status(OrderStatus::Shipped)
            .total_price(100.0)
            .build();
        loader.reconcile(LocalChange::Upserted(shipped)).await;

        assert_eq!(loader.len().await, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_filter_without_a_remote_call(before_each: BeforeEachReturn) {
        let (gateway, _, ctx) = before_each;
        seed_two(&gateway).await;
        let loader = EntityListLoader::<Order>::new(&ctx, QuerySpec::new());
        loader.load().await.unwrap();
        let calls = gateway.calls().len();

        let completed = loader
            .apply_filter(|order| order.status == OrderStatus::Completed)
            .await;

        assert_eq!(completed.len(), 1);
        assert_eq!(gateway.calls().len(), calls);
    }
}
