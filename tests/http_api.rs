//! HTTP-level checks of the engine router: header-based identity, error
//! payload shape, and a transition driven end to end through JSON.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use leaseguard::router::engine_router;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).expect("request builds")
}

fn post_json(uri: &str, user: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", user)
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let (engine, _, _) = engine();
    let router = engine_router(Arc::new(engine));

    let response = router
        .oneshot(get("/api/v1/properties", None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn landlord_lists_their_properties() {
    let (engine, _, _) = engine();
    let router = engine_router(Arc::new(engine));

    let response = router
        .oneshot(get("/api/v1/properties", Some(LANDLORD)))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let listed = body.as_array().expect("array body");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], PROPERTY);
}

#[tokio::test]
async fn tenant_lease_writes_are_forbidden_over_http() {
    let (engine, _, _) = engine();
    let router = engine_router(Arc::new(engine));

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/tenancies/{TENANCY}/lease"))
        .header("content-type", "application/json")
        .header("x-user-id", TENANT)
        .body(Body::from(
            json!({"lease_end": "2027-12-31", "rent_cents": 1}).to_string(),
        ))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn a_transition_round_trips_through_json() {
    let (engine, _, _) = engine();
    let router = engine_router(Arc::new(engine));

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/tenancies/{TENANCY}/transition"),
            LANDLORD,
            json!({"action": "terminate"}),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "terminated");

    // The tenancy is now terminal; the same edge fails as unprocessable.
    let response = router
        .oneshot(post_json(
            &format!("/api/v1/tenancies/{TENANCY}/transition"),
            LANDLORD,
            json!({"action": "activate"}),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["kind"], "illegal_transition");
}

#[tokio::test]
async fn gateway_confirmation_needs_no_identity_header() {
    let (engine, _, _) = engine();
    let router = engine_router(Arc::new(engine.clone()));

    let payment = engine
        .create_payment(
            &uid(LANDLORD),
            leaseguard::engine::NewPayment {
                tenancy: leaseguard::domain::TenancyId::from(TENANCY),
                amount_cents: 120_000,
                due_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 1).expect("valid"),
            },
        )
        .expect("payment raised");

    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "/api/v1/payments/{}/gateway-confirmation",
            payment.id
        ))
        .body(Body::empty())
        .expect("request builds");
    let response = router.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "paid");
}
