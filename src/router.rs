//! HTTP surface for the engine. Every handler resolves the acting principal
//! from the `x-user-id` header; authorization itself happens inside the
//! engine, so the router stays a thin JSON adapter.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::clock::Clock;
use crate::domain::{
    DisputeId, DocumentId, HouseholdMemberId, MaintenanceRequestId, NotificationId, PaymentId,
    PropertyId, SupportTicketId, TenancyId, UserId,
};
use crate::engine::{
    Engine, LeaseTermsUpdate, NewDispute, NewDocument, NewHouseholdMember, NewMaintenanceRequest,
    NewPayment, NewProperty, NewSplitPayment, NewSupportTicket, NewTenancy, PropertyUpdate,
};
use crate::error::EngineError;
use crate::notify::NotificationSink;
use crate::storage::EngineStore;
use crate::workflows::{
    DisputeAction, MaintenanceAction, PaymentAction, SupportAction, TenancyAction,
};

/// Router builder exposing the engine's operations under `/api/v1`.
pub fn engine_router<S, N, C>(engine: Arc<Engine<S, N, C>>) -> Router
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            post(create_property::<S, N, C>).get(list_properties::<S, N, C>),
        )
        .route(
            "/api/v1/properties/:property_id",
            get(get_property::<S, N, C>)
                .put(update_property::<S, N, C>)
                .delete(delete_property::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies",
            post(create_tenancy::<S, N, C>).get(list_tenancies::<S, N, C>),
        )
        .route("/api/v1/tenancies/:tenancy_id", get(get_tenancy::<S, N, C>))
        .route(
            "/api/v1/tenancies/:tenancy_id/lease",
            put(update_lease_terms::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/transition",
            post(transition_tenancy::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/household-members",
            get(list_household_members::<S, N, C>),
        )
        .route(
            "/api/v1/household-members",
            post(add_household_member::<S, N, C>),
        )
        .route(
            "/api/v1/household-members/:member_id",
            delete(remove_household_member::<S, N, C>),
        )
        .route("/api/v1/disputes", post(create_dispute::<S, N, C>))
        .route("/api/v1/disputes/:dispute_id", get(get_dispute::<S, N, C>))
        .route(
            "/api/v1/disputes/:dispute_id/transition",
            post(transition_dispute::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/disputes",
            get(list_disputes::<S, N, C>),
        )
        .route(
            "/api/v1/maintenance-requests",
            post(create_maintenance_request::<S, N, C>),
        )
        .route(
            "/api/v1/maintenance-requests/:request_id",
            get(get_maintenance_request::<S, N, C>),
        )
        .route(
            "/api/v1/maintenance-requests/:request_id/transition",
            post(transition_maintenance_request::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/maintenance-requests",
            get(list_maintenance_requests::<S, N, C>),
        )
        .route("/api/v1/payments", post(create_payment::<S, N, C>))
        .route("/api/v1/payments/:payment_id", get(get_payment::<S, N, C>))
        .route(
            "/api/v1/payments/:payment_id/transition",
            post(transition_payment::<S, N, C>),
        )
        .route(
            "/api/v1/payments/:payment_id/gateway-confirmation",
            post(confirm_payment_gateway::<S, N, C>),
        )
        .route(
            "/api/v1/payments/:payment_id/splits",
            post(create_split_payments::<S, N, C>).get(list_split_payments::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/payments",
            get(list_payments::<S, N, C>),
        )
        .route(
            "/api/v1/support-tickets",
            post(create_support_ticket::<S, N, C>).get(list_support_tickets::<S, N, C>),
        )
        .route(
            "/api/v1/support-tickets/:ticket_id",
            get(get_support_ticket::<S, N, C>),
        )
        .route(
            "/api/v1/support-tickets/:ticket_id/subject",
            put(update_support_ticket_subject::<S, N, C>),
        )
        .route(
            "/api/v1/support-tickets/:ticket_id/transition",
            post(transition_support_ticket::<S, N, C>),
        )
        .route("/api/v1/documents", post(upload_document::<S, N, C>))
        .route(
            "/api/v1/documents/:document_id",
            get(get_document::<S, N, C>).delete(delete_document::<S, N, C>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/documents",
            get(list_documents::<S, N, C>),
        )
        .route(
            "/api/v1/notifications",
            get(list_notifications::<S, N, C>),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_notification_read::<S, N, C>),
        )
        .with_state(engine)
}

fn acting_user(headers: &HeaderMap) -> Result<UserId, EngineError> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(UserId::from)
        .ok_or_else(|| EngineError::Unauthorized("missing x-user-id header".to_string()))
}

async fn create_property<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewProperty>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let property = engine.create_property(&actor, input)?;
    Ok((StatusCode::CREATED, Json(property)).into_response())
}

async fn list_properties<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    Ok(Json(engine.list_properties(&actor)?).into_response())
}

async fn get_property<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let property = engine.get_property(&actor, &PropertyId(property_id))?;
    Ok(Json(property).into_response())
}

async fn update_property<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    Json(update): Json<PropertyUpdate>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let property = engine.update_property(&actor, &PropertyId(property_id), update)?;
    Ok(Json(property).into_response())
}

async fn delete_property<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    engine.delete_property(&actor, &PropertyId(property_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn create_tenancy<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewTenancy>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let tenancy = engine.create_tenancy(&actor, input)?;
    Ok((StatusCode::CREATED, Json(tenancy)).into_response())
}

async fn list_tenancies<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    Ok(Json(engine.list_tenancies(&actor)?).into_response())
}

async fn get_tenancy<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let tenancy = engine.get_tenancy(&actor, &TenancyId(tenancy_id))?;
    Ok(Json(tenancy).into_response())
}

async fn update_lease_terms<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
    Json(update): Json<LeaseTermsUpdate>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let tenancy = engine.update_lease_terms(&actor, &TenancyId(tenancy_id), update)?;
    Ok(Json(tenancy).into_response())
}

async fn transition_tenancy<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
    Json(action): Json<TenancyAction>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let tenancy = engine.transition_tenancy(&actor, &TenancyId(tenancy_id), action)?;
    Ok(Json(tenancy).into_response())
}

async fn add_household_member<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewHouseholdMember>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let member = engine.add_household_member(&actor, input)?;
    Ok((StatusCode::CREATED, Json(member)).into_response())
}

async fn remove_household_member<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    engine.remove_household_member(&actor, &HouseholdMemberId(member_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_household_members<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let members = engine.list_household_members(&actor, &TenancyId(tenancy_id))?;
    Ok(Json(members).into_response())
}

async fn create_dispute<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewDispute>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let dispute = engine.create_dispute(&actor, input)?;
    Ok((StatusCode::CREATED, Json(dispute)).into_response())
}

async fn get_dispute<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(dispute_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let dispute = engine.get_dispute(&actor, &DisputeId(dispute_id))?;
    Ok(Json(dispute).into_response())
}

async fn list_disputes<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let disputes = engine.list_disputes(&actor, &TenancyId(tenancy_id))?;
    Ok(Json(disputes).into_response())
}

async fn transition_dispute<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(dispute_id): Path<String>,
    Json(action): Json<DisputeAction>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let dispute = engine.transition_dispute(&actor, &DisputeId(dispute_id), action)?;
    Ok(Json(dispute).into_response())
}

async fn create_maintenance_request<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewMaintenanceRequest>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let request = engine.create_maintenance_request(&actor, input)?;
    Ok((StatusCode::CREATED, Json(request)).into_response())
}

async fn get_maintenance_request<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let request = engine.get_maintenance_request(&actor, &MaintenanceRequestId(request_id))?;
    Ok(Json(request).into_response())
}

async fn list_maintenance_requests<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let requests = engine.list_maintenance_requests(&actor, &TenancyId(tenancy_id))?;
    Ok(Json(requests).into_response())
}

async fn transition_maintenance_request<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    Json(action): Json<MaintenanceAction>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let request =
        engine.transition_maintenance_request(&actor, &MaintenanceRequestId(request_id), action)?;
    Ok(Json(request).into_response())
}

async fn create_payment<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewPayment>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let payment = engine.create_payment(&actor, input)?;
    Ok((StatusCode::CREATED, Json(payment)).into_response())
}

async fn get_payment<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(payment_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let payment = engine.get_payment(&actor, &PaymentId(payment_id))?;
    Ok(Json(payment).into_response())
}

async fn list_payments<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let payments = engine.list_payments(&actor, &TenancyId(tenancy_id))?;
    Ok(Json(payments).into_response())
}

async fn transition_payment<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(payment_id): Path<String>,
    Json(action): Json<PaymentAction>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let payment = engine.transition_payment(&actor, &PaymentId(payment_id), action)?;
    Ok(Json(payment).into_response())
}

/// Webhook-style entry for the payment provider; no principal header.
async fn confirm_payment_gateway<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    Path(payment_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let payment = engine.confirm_payment_gateway(&PaymentId(payment_id))?;
    Ok(Json(payment).into_response())
}

async fn create_split_payments<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(payment_id): Path<String>,
    Json(inputs): Json<Vec<NewSplitPayment>>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let splits = engine.create_split_payments(&actor, &PaymentId(payment_id), inputs)?;
    Ok((StatusCode::CREATED, Json(splits)).into_response())
}

async fn list_split_payments<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(payment_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let splits = engine.list_split_payments(&actor, &PaymentId(payment_id))?;
    Ok(Json(splits).into_response())
}

async fn create_support_ticket<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewSupportTicket>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let ticket = engine.create_support_ticket(&actor, input)?;
    Ok((StatusCode::CREATED, Json(ticket)).into_response())
}

async fn list_support_tickets<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    Ok(Json(engine.list_support_tickets(&actor)?).into_response())
}

async fn get_support_ticket<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(ticket_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let ticket = engine.get_support_ticket(&actor, &SupportTicketId(ticket_id))?;
    Ok(Json(ticket).into_response())
}

#[derive(Debug, Deserialize)]
struct SubjectUpdate {
    subject: String,
}

async fn update_support_ticket_subject<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(ticket_id): Path<String>,
    Json(update): Json<SubjectUpdate>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let ticket = engine.update_support_ticket_subject(
        &actor,
        &SupportTicketId(ticket_id),
        update.subject,
    )?;
    Ok(Json(ticket).into_response())
}

async fn transition_support_ticket<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(ticket_id): Path<String>,
    Json(action): Json<SupportAction>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let ticket = engine.transition_support_ticket(&actor, &SupportTicketId(ticket_id), action)?;
    Ok(Json(ticket).into_response())
}

async fn upload_document<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Json(input): Json<NewDocument>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let document = engine.upload_document(&actor, input)?;
    Ok((StatusCode::CREATED, Json(document)).into_response())
}

async fn get_document<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(document_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let document = engine.get_document(&actor, &DocumentId(document_id))?;
    Ok(Json(document).into_response())
}

async fn list_documents<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(tenancy_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let documents = engine.list_documents(&actor, &TenancyId(tenancy_id))?;
    Ok(Json(documents).into_response())
}

async fn delete_document<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(document_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    engine.delete_document(&actor, &DocumentId(document_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_notifications<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    Ok(Json(engine.list_notifications(&actor)?).into_response())
}

async fn mark_notification_read<S, N, C>(
    State(engine): State<Arc<Engine<S, N, C>>>,
    headers: HeaderMap,
    Path(notification_id): Path<String>,
) -> Result<Response, EngineError>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    let actor = acting_user(&headers)?;
    let notification =
        engine.mark_notification_read(&actor, &NotificationId(notification_id))?;
    Ok(Json(notification).into_response())
}
