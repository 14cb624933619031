//! The request orchestrator. Every public operation follows the same shape:
//! resolve the principal, evaluate relationship facts, consult the policy
//! table, apply the mutation through the storage collaborator (status
//! transitions as compare-and-swap), then fan notifications out best-effort.

mod dispute;
mod document;
mod household;
mod maintenance;
mod payment;
mod property;
mod support;
mod tenancy;

pub use dispute::NewDispute;
pub use document::NewDocument;
pub use household::NewHouseholdMember;
pub use maintenance::NewMaintenanceRequest;
pub use payment::{NewPayment, NewSplitPayment};
pub use property::{NewProperty, PropertyUpdate};
pub use support::NewSupportTicket;
pub use tenancy::{LeaseTermsUpdate, NewTenancy};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::{
    authorize, ActionKind, Decision, Principal, RelationshipEvaluator, RelationshipFacts,
    ResourceType,
};
use crate::clock::Clock;
use crate::domain::{Notification, NotificationId, Tenancy, UserId};
use crate::error::EngineError;
use crate::notify::{fanout, EventParties, NotificationSink, TransitionEvent};
use crate::storage::EngineStore;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_id(prefix: &str) -> String {
    let id = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Orchestrating service composing the storage, notification, and clock
/// collaborators.
pub struct Engine<S, N, C> {
    store: Arc<S>,
    sink: Arc<N>,
    clock: Arc<C>,
}

impl<S, N, C> Clone for Engine<S, N, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    pub fn new(store: Arc<S>, sink: Arc<N>, clock: Arc<C>) -> Self {
        Self { store, sink, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn evaluator(&self) -> RelationshipEvaluator<'_, S> {
        RelationshipEvaluator::new(self.store.as_ref())
    }

    pub(crate) fn principal(&self, user_id: &UserId) -> Result<Principal, EngineError> {
        crate::auth::resolve_principal(self.store.as_ref(), user_id)
    }

    /// Facts carried by the principal alone, for actions with no resource
    /// instance yet (creates, lists).
    pub(crate) fn principal_facts(&self, principal: &Principal) -> RelationshipFacts {
        RelationshipFacts {
            is_admin: principal.is_admin(),
            ..RelationshipFacts::default()
        }
    }

    pub(crate) fn require(
        &self,
        principal: &Principal,
        action: ActionKind,
        resource: ResourceType,
        facts: &RelationshipFacts,
    ) -> Result<(), EngineError> {
        match authorize(principal, action, resource, facts) {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => Err(EngineError::Unauthorized(reason)),
        }
    }

    /// Assemble the notification parties reachable from a tenancy.
    pub(crate) fn tenancy_parties(&self, tenancy: &Tenancy) -> Result<EventParties, EngineError> {
        let landlord = self
            .store
            .property(&tenancy.property)
            .map_err(|error| error.into_engine("property"))?
            .map(|property| property.landlord);
        let household = self
            .store
            .household_members(&tenancy.id)
            .map_err(|error| error.into_engine("household members"))?
            .into_iter()
            .map(|member| member.user)
            .collect();

        Ok(EventParties {
            landlord,
            tenant: Some(tenancy.tenant.clone()),
            household,
            ..EventParties::default()
        })
    }

    /// Best-effort fan-out: persist and push each target, logging failures
    /// without touching the already-committed mutation. Returns the number of
    /// delivery warnings recorded.
    pub(crate) fn dispatch(&self, event: TransitionEvent) -> usize {
        let targets = fanout(&event);
        let mut warnings = 0usize;

        for target in targets {
            let record = Notification {
                id: NotificationId(next_id("ntf")),
                recipient: target.recipient.clone(),
                title: target.title.clone(),
                body: target.body.clone(),
                priority: target.priority,
                read: false,
                action_ref: target.action_ref.clone(),
                created_at: self.clock.now(),
            };
            if let Err(error) = self.store.insert_notification(record) {
                warnings += 1;
                warn!(%error, recipient = %target.recipient, "failed to persist notification");
            }
            if let Err(error) = self.sink.send(target.clone()) {
                warnings += 1;
                warn!(%error, recipient = %target.recipient, "notification delivery failed");
            }
        }

        debug!(
            resource = event.resource.label(),
            action = event.action.label(),
            warnings,
            "transition fan-out complete"
        );
        warnings
    }

    pub fn list_notifications(
        &self,
        principal_id: &UserId,
    ) -> Result<Vec<Notification>, EngineError> {
        let principal = self.principal(principal_id)?;
        let facts = self.principal_facts(&principal);
        self.require(&principal, ActionKind::List, ResourceType::Notification, &facts)?;

        self.store
            .notifications_for_recipient(&principal.user_id)
            .map_err(|error| error.into_engine("notifications"))
    }

    pub fn mark_notification_read(
        &self,
        principal_id: &UserId,
        id: &NotificationId,
    ) -> Result<Notification, EngineError> {
        let principal = self.principal(principal_id)?;
        let own = self
            .store
            .notifications_for_recipient(&principal.user_id)
            .map_err(|error| error.into_engine("notifications"))?;
        let notification = own
            .into_iter()
            .find(|notification| &notification.id == id)
            .ok_or_else(|| EngineError::NotFound("notification does not exist".to_string()))?;

        let facts = self
            .evaluator()
            .for_notification(&principal, &notification)?;
        self.require(&principal, ActionKind::Update, ResourceType::Notification, &facts)?;

        self.store
            .mark_notification_read(id)
            .map_err(|error| error.into_engine("notification"))
    }
}

/// Run a transition closure, retrying exactly once when a compare-and-swap
/// loses a race. The closure re-loads and re-evaluates everything, so the
/// retry sees fresh state.
pub(crate) fn with_conflict_retry<T>(
    op: impl Fn() -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    match op() {
        Err(EngineError::Conflict(reason)) => {
            debug!(%reason, "transition lost a race; retrying against fresh state");
            op()
        }
        other => other,
    }
}
