use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use leaseguard::clock::SystemClock;
use leaseguard::config::AppConfig;
use leaseguard::storage::InMemoryStore;
use leaseguard::telemetry;
use leaseguard::Engine;

use crate::cli::ServeArgs;
use crate::error::ApiError;
use crate::infra::{seed_demo_portfolio, AppState, TracingSink};
use crate::routes::with_engine_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), ApiError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::new());
    if let Err(error) = seed_demo_portfolio(&store) {
        info!(%error, "demo portfolio already present; continuing");
    }
    let engine = Arc::new(Engine::new(
        store,
        Arc::new(TracingSink),
        Arc::new(SystemClock),
    ));

    let app = with_engine_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "authorization and workflow engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
