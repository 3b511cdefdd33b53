use crate::shared::config::SyncConfig;
use crate::shared::context::AppContext;
use crate::shared::infrastructure::gateway::in_memory::InMemoryGateway;
use crate::shared::infrastructure::notifier::in_memory::InMemoryNotifier;
use std::sync::Arc;

/// In-memory gateway and notifier, plus the context that hands them to views.
pub fn make_context() -> (Arc<InMemoryGateway>, Arc<InMemoryNotifier>, AppContext) {
    let gateway = Arc::new(InMemoryGateway::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let ctx = AppContext::new(gateway.clone(), notifier.clone(), SyncConfig::default());
    (gateway, notifier, ctx)
}
