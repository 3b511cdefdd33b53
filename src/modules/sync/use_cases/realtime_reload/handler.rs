// Realtime Reconciler.
//
// Purpose
// - Reload a view whenever another client changes one of the tables it shows.
//
// Boundaries
// - Events are coarse ("table changed"); the answer to every event is a full load,
//   which the loader orders against local mutations by sequence number.
// - A failed subscription degrades the view to manual refresh. It never fails the mount.
// - A stream that ends while the view is still mounted degrades it the same way, and the
//   operator is told.

use crate::modules::sync::use_cases::load_collection::handler::EntityListLoader;
use crate::shared::context::AppContext;
use crate::shared::core::entity::Entity;
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::Subscription;
use crate::shared::infrastructure::notifier::{Notification, Notifier};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Tables whose live updates are gone, shared between the followers and the view.
#[derive(Debug, Clone, Default)]
pub struct LiveStatus {
    lost: Arc<Mutex<Vec<Table>>>,
}

impl LiveStatus {
    fn mark_lost(&self, table: Table) {
        let mut lost = self.lost.lock().unwrap_or_else(PoisonError::into_inner);
        if !lost.contains(&table) {
            lost.push(table);
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self
            .lost
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn lost_tables(&self) -> Vec<Table> {
        self.lost
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub struct RealtimeReconciler {
    tasks: Vec<JoinHandle<()>>,
    status: LiveStatus,
}

impl RealtimeReconciler {
    /// Subscribes once per table. The view's own table is subscribed with the view's filter.
    pub fn mount<E: Entity>(
        ctx: &AppContext,
        tables: &[Table],
        loader: Arc<EntityListLoader<E>>,
    ) -> Self {
        let mut tasks = Vec::with_capacity(tables.len());
        let status = LiveStatus::default();
        for &table in tables {
            let predicate = if table == E::TABLE {
                loader.query().predicate.clone()
            } else {
                None
            };
            match ctx.gateway.subscribe(table, predicate) {
                Ok(subscription) => {
                    info!(%table, view = %E::TABLE, "following remote changes");
                    tasks.push(tokio::spawn(follow(
                        subscription,
                        loader.clone(),
                        ctx.notifier.clone(),
                        status.clone(),
                    )));
                }
                Err(error) => {
                    warn!(%table, view = %E::TABLE, %error, "live updates unavailable");
                    ctx.notifier.notify(Notification::warning(
                        format!("Live updates unavailable for {table}"),
                        format!("Use refresh to see changes made elsewhere ({error})"),
                    ));
                    status.mark_lost(table);
                }
            }
        }
        Self { tasks, status }
    }

    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
    }

    pub fn degraded_tables(&self) -> Vec<Table> {
        self.status.lost_tables()
    }

    /// A handle that keeps reporting after the reconciler is unmounted.
    pub fn status(&self) -> LiveStatus {
        self.status.clone()
    }

    /// Stops every follower and waits until its subscription is released.
    pub async fn unmount(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
            if let Err(error) = task.await {
                if !error.is_cancelled() {
                    warn!(%error, "realtime follower ended abnormally");
                }
            }
        }
    }
}

impl Drop for RealtimeReconciler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn follow<E: Entity>(
    mut subscription: Subscription,
    loader: Arc<EntityListLoader<E>>,
    notifier: Arc<dyn Notifier>,
    status: LiveStatus,
) {
    let table = subscription.table();
    while let Some(event) = subscription.next().await {
        if loader.is_unmounted() {
            break;
        }
        // A burst of events needs only one reload.
        let mut coalesced = 0usize;
        while subscription.try_next().is_some() {
            coalesced += 1;
        }
        debug!(table = %event.table, kind = ?event.kind, coalesced, view = %E::TABLE, "remote change");
        if let Err(error) = loader.load().await {
            debug!(view = %E::TABLE, %error, "reload after remote change failed");
        }
    }
    if !loader.is_unmounted() {
        warn!(%table, view = %E::TABLE, "change stream ended while mounted");
        notifier.notify(Notification::warning(
            format!("Live updates lost for {table}"),
            "Use refresh to see changes made elsewhere",
        ));
        status.mark_lost(table);
    }
    subscription.unsubscribe();
}

#[cfg(test)]
mod realtime_reconciler_tests {
    use super::*;
    use crate::modules::orders::core::order::Order;
    use crate::shared::core::predicate::QuerySpec;
    use crate::shared::infrastructure::gateway::RemoteGateway;
    use crate::shared::infrastructure::notifier::NotificationLevel;
    use crate::tests::fixtures::context::make_context;
    use crate::tests::fixtures::orders::OrderBuilder;
    use rstest::rstest;
    use std::time::Duration;

    async fn eventually(mut check: impl AsyncFnMut() -> bool) -> bool {
        for _ in 0..100 {
            if check().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reload_when_another_client_inserts() {
        let (gateway, _, ctx) = make_context();
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));
        let reconciler = RealtimeReconciler::mount(&ctx, &[Table::Orders], loader.clone());
        loader.load().await.unwrap();

        gateway
            .insert(Table::Orders, OrderBuilder::new().id("9").build_row())
            .await
            .unwrap();

        assert!(eventually(async || loader.len().await == 1).await);
        assert!(!reconciler.is_degraded());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_release_subscriptions_on_unmount() {
        let (gateway, _, ctx) = make_context();
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));
        let mut reconciler =
            RealtimeReconciler::mount(&ctx, &[Table::Orders, Table::Products], loader.clone());
        assert_eq!(gateway.subscriber_count(), 2);

        reconciler.unmount().await;

        assert_eq!(gateway.subscriber_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_release_subscriptions_when_dropped() {
        let (gateway, _, ctx) = make_context();
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));
        let reconciler = RealtimeReconciler::mount(&ctx, &[Table::Orders], loader.clone());
        drop(reconciler);

        assert!(eventually(async || gateway.subscriber_count() == 0).await);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_degrade_to_manual_refresh_when_subscribing_fails() {
        let (gateway, notifier, ctx) = make_context();
        gateway.toggle_offline();
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));

        let reconciler = RealtimeReconciler::mount(&ctx, &[Table::Orders], loader.clone());

        assert!(reconciler.is_degraded());
        assert_eq!(reconciler.degraded_tables(), vec![Table::Orders]);
        assert_eq!(notifier.count(NotificationLevel::Warning), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_degrade_when_the_change_stream_ends_while_mounted() {
        let (gateway, notifier, ctx) = make_context();
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));
        let reconciler =
            RealtimeReconciler::mount(&ctx, &[Table::Orders, Table::Products], loader.clone());
        assert!(!reconciler.is_degraded());

        gateway.drop_subscriptions(Table::Orders);

        assert!(eventually(async || reconciler.is_degraded()).await);
        assert_eq!(reconciler.degraded_tables(), vec![Table::Orders]);
        let last = notifier.last().unwrap();
        assert_eq!(last.level, NotificationLevel::Warning);
        assert!(last.title.contains("orders"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_stay_quiet_when_the_stream_ends_after_unmount() {
        let (gateway, notifier, ctx) = make_context();
        let loader = Arc::new(EntityListLoader::<Order>::new(&ctx, QuerySpec::new()));
        let reconciler = RealtimeReconciler::mount(&ctx, &[Table::Orders], loader.clone());

        loader.unmount();
        gateway.drop_subscriptions(Table::Orders);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!reconciler.is_degraded());
        assert_eq!(notifier.count(NotificationLevel::Warning), 0);
    }
}
