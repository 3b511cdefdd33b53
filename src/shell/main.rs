use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{EnvFilter, fmt};

use ice_sos_admin::shared::config::SyncConfig;
use ice_sos_admin::shared::context::AppContext;
use ice_sos_admin::shared::infrastructure::gateway::RemoteGateway;
use ice_sos_admin::shared::infrastructure::gateway::http::HttpGateway;
use ice_sos_admin::shared::infrastructure::gateway::in_memory::InMemoryGateway;
use ice_sos_admin::shared::infrastructure::notifier::tracing_notifier::TracingNotifier;
use ice_sos_admin::shell::http::router;
use ice_sos_admin::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = SyncConfig::from_env()?;
    let gateway: Arc<dyn RemoteGateway> = match &config.backend {
        Some(backend) => {
            tracing::info!(url = %backend.url, "using hosted backend");
            Arc::new(HttpGateway::new(
                &backend.url,
                &backend.api_key,
                config.call_timeout,
            )?)
        }
        None => {
            tracing::warn!("no backend configured, serving an empty in-memory store");
            Arc::new(InMemoryGateway::new())
        }
    };

    let addr = config.http_addr;
    let ctx = AppContext::new(gateway, Arc::new(TracingNotifier), config);
    let state = AppState::mount(ctx).await;
    // The console front end is served from its own origin.
    let app = router(state.clone()).layer(CorsLayer::permissive());

    tracing::info!("admin console: http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    state.unmount().await;
    Ok(())
}
