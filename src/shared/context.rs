use crate::shared::config::SyncConfig;
use crate::shared::infrastructure::gateway::RemoteGateway;
use crate::shared::infrastructure::notifier::Notifier;
use std::sync::Arc;

/// Dependencies every view is built from. Constructed once at start-up.
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<dyn RemoteGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub config: SyncConfig,
}

impl AppContext {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        notifier: Arc<dyn Notifier>,
        config: SyncConfig,
    ) -> Self {
        Self {
            gateway,
            notifier,
            config,
        }
    }
}
