use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use leaseguard::auth::{resolve_principal, IdentityResolver};
use leaseguard::router::engine_router;
use leaseguard::EngineError;

use crate::infra::{ApiEngine, AppState, HeaderIdentity};

pub(crate) fn with_engine_routes(engine: Arc<ApiEngine>) -> axum::Router {
    engine_router(Arc::clone(&engine))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/whoami", axum::routing::get(whoami_endpoint))
        .layer(Extension(engine))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Echo the resolved principal so callers can verify the identity the
/// fronting proxy forwarded.
pub(crate) async fn whoami_endpoint(
    Extension(engine): Extension<Arc<ApiEngine>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, EngineError> {
    let credential = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| EngineError::Unauthorized("missing x-user-id header".to_string()))?;

    let user_id = HeaderIdentity.resolve(credential)?;
    let principal = resolve_principal(engine.store(), &user_id)?;

    Ok(Json(json!({
        "user_id": principal.user_id,
        "role": principal.role.label(),
        "organization": principal.organization,
    })))
}
