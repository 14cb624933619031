use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{
    Dispute, DisputeCategory, DisputeId, DisputePriority, DisputeStatus, TenancyId, UserId,
};
use crate::error::EngineError;
use crate::notify::{NotificationSink, TransitionEvent};
use crate::storage::EngineStore;
use crate::workflows::DisputeAction;

use super::{next_id, with_conflict_retry, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDispute {
    pub tenancy: TenancyId,
    pub category: DisputeCategory,
    pub priority: DisputePriority,
    pub subject: String,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    /// Open a dispute. The creating principal becomes the reporter; the other
    /// side of the tenancy is notified at a priority derived from the
    /// dispute's own.
    pub fn create_dispute(
        &self,
        principal_id: &UserId,
        input: NewDispute,
    ) -> Result<Dispute, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(&input.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::Create, ResourceType::Dispute, &facts)?;

        if input.subject.trim().is_empty() {
            return Err(EngineError::InvariantViolation(
                "a dispute requires a subject".to_string(),
            ));
        }

        let dispute = Dispute {
            id: DisputeId(next_id("dsp")),
            tenancy: input.tenancy,
            reporter: principal.user_id.clone(),
            category: input.category,
            priority: input.priority,
            status: DisputeStatus::Open,
            subject: input.subject.trim().to_string(),
            resolution_notes: None,
            resolver: None,
            resolved_at: None,
            opened_at: self.clock().now(),
        };
        let dispute = self
            .store()
            .insert_dispute(dispute)
            .map_err(|error| error.into_engine("dispute"))?;

        let mut parties = self.tenancy_parties(&tenancy)?;
        parties.owner = Some(dispute.reporter.clone());
        self.dispatch(TransitionEvent {
            resource: ResourceType::Dispute,
            resource_id: dispute.id.0.clone(),
            action: ActionKind::Create,
            actor: principal.user_id,
            before: None,
            after: Some(dispute.status.label()),
            priority: dispute.priority.notification_priority(),
            summary: format!("Dispute opened: {}", dispute.subject),
            parties,
        });
        Ok(dispute)
    }

    pub fn get_dispute(
        &self,
        principal_id: &UserId,
        id: &DisputeId,
    ) -> Result<Dispute, EngineError> {
        let principal = self.principal(principal_id)?;
        let dispute = self
            .store()
            .dispute(id)
            .map_err(|error| error.into_engine("dispute"))?
            .ok_or_else(|| EngineError::NotFound("dispute does not exist".to_string()))?;

        let facts = self.evaluator().for_dispute(&principal, &dispute)?;
        self.require(&principal, ActionKind::Read, ResourceType::Dispute, &facts)?;
        Ok(dispute)
    }

    pub fn list_disputes(
        &self,
        principal_id: &UserId,
        tenancy_id: &TenancyId,
    ) -> Result<Vec<Dispute>, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(tenancy_id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::List, ResourceType::Dispute, &facts)?;

        self.store()
            .disputes_for_tenancy(tenancy_id)
            .map_err(|error| error.into_engine("disputes"))
    }

    pub fn transition_dispute(
        &self,
        principal_id: &UserId,
        id: &DisputeId,
        action: DisputeAction,
    ) -> Result<Dispute, EngineError> {
        with_conflict_retry(|| {
            let principal = self.principal(principal_id)?;
            let dispute = self
                .store()
                .dispute(id)
                .map_err(|error| error.into_engine("dispute"))?
                .ok_or_else(|| EngineError::NotFound("dispute does not exist".to_string()))?;

            let facts = self.evaluator().for_dispute(&principal, &dispute)?;
            self.require(&principal, action.action_kind(), ResourceType::Dispute, &facts)?;

            let updated = crate::workflows::dispute::apply(
                &dispute,
                &action,
                &principal.user_id,
                self.clock().now(),
            )?;
            let updated = self
                .store()
                .cas_update_dispute(updated, dispute.status)
                .map_err(|error| error.into_engine("dispute"))?;

            let tenancy = self
                .store()
                .tenancy(&updated.tenancy)
                .map_err(|error| error.into_engine("tenancy"))?
                .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;
            let mut parties = self.tenancy_parties(&tenancy)?;
            parties.owner = Some(updated.reporter.clone());
            self.dispatch(TransitionEvent {
                resource: ResourceType::Dispute,
                resource_id: updated.id.0.clone(),
                action: action.action_kind(),
                actor: principal.user_id,
                before: Some(dispute.status.label()),
                after: Some(updated.status.label()),
                priority: updated.priority.notification_priority(),
                summary: format!("Dispute {}: {}", updated.status.label(), updated.subject),
                parties,
            });
            Ok(updated)
        })
    }
}
