// One mounted admin view: loader, coordinator and (optionally) a realtime reconciler
// sharing one collection. Nothing is shared between views.

use crate::modules::sync::core::mutation::ReconcileStrategy;
use crate::modules::sync::use_cases::load_collection::handler::{
    EntityListLoader, LoadError, LoadOutcome,
};
use crate::modules::sync::use_cases::mutate_entity::handler::MutationCoordinator;
use crate::modules::sync::use_cases::realtime_reload::handler::{LiveStatus, RealtimeReconciler};
use crate::shared::context::AppContext;
use crate::shared::core::entity::Entity;
use crate::shared::core::predicate::QuerySpec;
use crate::shared::core::table::Table;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

pub struct EntityView<E: Entity> {
    loader: Arc<EntityListLoader<E>>,
    coordinator: Arc<MutationCoordinator<E>>,
    reconciler: Mutex<Option<RealtimeReconciler>>,
    live: Option<LiveStatus>,
}

impl<E: Entity> EntityView<E> {
    pub async fn mount(ctx: &AppContext, query: QuerySpec, realtime_tables: &[Table]) -> Self {
        Self::mount_with(ctx, query, realtime_tables, ReconcileStrategy::InPlace).await
    }

    /// Subscribes first so a change committed during the initial load still triggers a reload.
    pub async fn mount_with(
        ctx: &AppContext,
        query: QuerySpec,
        realtime_tables: &[Table],
        strategy: ReconcileStrategy,
    ) -> Self {
        let loader = Arc::new(EntityListLoader::new(ctx, query));
        let coordinator = Arc::new(MutationCoordinator::new(ctx, loader.clone(), strategy));
        let reconciler = (!realtime_tables.is_empty())
            .then(|| RealtimeReconciler::mount(ctx, realtime_tables, loader.clone()));
        let live = reconciler.as_ref().map(RealtimeReconciler::status);
        let degraded = live.as_ref().is_none_or(LiveStatus::is_degraded);

        if let Err(error) = loader.load().await {
            warn!(table = %E::TABLE, %error, "initial load failed, view mounted empty");
        }
        info!(table = %E::TABLE, live = !degraded, "view mounted");
        Self {
            loader,
            coordinator,
            reconciler: Mutex::new(reconciler),
            live,
        }
    }

    pub fn loader(&self) -> &Arc<EntityListLoader<E>> {
        &self.loader
    }

    pub fn coordinator(&self) -> &Arc<MutationCoordinator<E>> {
        &self.coordinator
    }

    /// True when the view only changes on manual refresh, either from the start or since
    /// its change stream ended.
    pub fn is_degraded(&self) -> bool {
        self.live.as_ref().is_none_or(LiveStatus::is_degraded)
    }

    /// The operator's retry action.
    pub async fn refresh(&self) -> Result<LoadOutcome, LoadError> {
        self.loader.load().await
    }

    pub async fn unmount(&self) {
        self.loader.unmount();
        let reconciler = self
            .reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut reconciler) = reconciler {
            reconciler.unmount().await;
        }
        info!(table = %E::TABLE, "view unmounted");
    }
}
