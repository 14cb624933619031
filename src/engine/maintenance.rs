use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{
    MaintenanceRequest, MaintenanceRequestId, MaintenanceStatus, NotificationPriority, TenancyId,
    UserId,
};
use crate::error::EngineError;
use crate::notify::{NotificationSink, TransitionEvent};
use crate::storage::EngineStore;
use crate::workflows::MaintenanceAction;

use super::{next_id, with_conflict_retry, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaintenanceRequest {
    pub tenancy: TenancyId,
    pub title: String,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    pub fn create_maintenance_request(
        &self,
        principal_id: &UserId,
        input: NewMaintenanceRequest,
    ) -> Result<MaintenanceRequest, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(&input.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(
            &principal,
            ActionKind::Create,
            ResourceType::MaintenanceRequest,
            &facts,
        )?;

        if input.title.trim().is_empty() {
            return Err(EngineError::InvariantViolation(
                "a maintenance request requires a title".to_string(),
            ));
        }

        let request = MaintenanceRequest {
            id: MaintenanceRequestId(next_id("mnt")),
            tenancy: input.tenancy,
            requester: principal.user_id.clone(),
            assignee: None,
            status: MaintenanceStatus::Pending,
            title: input.title.trim().to_string(),
            estimated_cost_cents: None,
            scheduled_date: None,
            completion_notes: None,
            completed_at: None,
        };
        let request = self
            .store()
            .insert_maintenance_request(request)
            .map_err(|error| error.into_engine("maintenance request"))?;

        let parties = self.tenancy_parties(&tenancy)?;
        self.dispatch(TransitionEvent {
            resource: ResourceType::MaintenanceRequest,
            resource_id: request.id.0.clone(),
            action: ActionKind::Create,
            actor: principal.user_id,
            before: None,
            after: Some(request.status.label()),
            priority: NotificationPriority::Normal,
            summary: format!("Maintenance requested: {}", request.title),
            parties,
        });
        Ok(request)
    }

    pub fn get_maintenance_request(
        &self,
        principal_id: &UserId,
        id: &MaintenanceRequestId,
    ) -> Result<MaintenanceRequest, EngineError> {
        let principal = self.principal(principal_id)?;
        let request = self
            .store()
            .maintenance_request(id)
            .map_err(|error| error.into_engine("maintenance request"))?
            .ok_or_else(|| {
                EngineError::NotFound("maintenance request does not exist".to_string())
            })?;

        let facts = self.evaluator().for_maintenance(&principal, &request)?;
        self.require(
            &principal,
            ActionKind::Read,
            ResourceType::MaintenanceRequest,
            &facts,
        )?;
        Ok(request)
    }

    pub fn list_maintenance_requests(
        &self,
        principal_id: &UserId,
        tenancy_id: &TenancyId,
    ) -> Result<Vec<MaintenanceRequest>, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(tenancy_id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(
            &principal,
            ActionKind::List,
            ResourceType::MaintenanceRequest,
            &facts,
        )?;

        self.store()
            .maintenance_for_tenancy(tenancy_id)
            .map_err(|error| error.into_engine("maintenance requests"))
    }

    /// Drive one maintenance transition. Assignment additionally checks that
    /// the assignee is a known user before the swap.
    pub fn transition_maintenance_request(
        &self,
        principal_id: &UserId,
        id: &MaintenanceRequestId,
        action: MaintenanceAction,
    ) -> Result<MaintenanceRequest, EngineError> {
        with_conflict_retry(|| {
            let principal = self.principal(principal_id)?;
            let request = self
                .store()
                .maintenance_request(id)
                .map_err(|error| error.into_engine("maintenance request"))?
                .ok_or_else(|| {
                    EngineError::NotFound("maintenance request does not exist".to_string())
                })?;

            let facts = self.evaluator().for_maintenance(&principal, &request)?;
            self.require(
                &principal,
                action.action_kind(),
                ResourceType::MaintenanceRequest,
                &facts,
            )?;

            if let MaintenanceAction::Assign { assignee, .. } = &action {
                if self
                    .store()
                    .user(assignee)
                    .map_err(|error| error.into_engine("assignee"))?
                    .is_none()
                {
                    return Err(EngineError::NotFound("assignee does not exist".to_string()));
                }
            }

            let updated =
                crate::workflows::maintenance::apply(&request, &action, self.clock().now())?;
            let updated = self
                .store()
                .cas_update_maintenance_request(updated, request.status)
                .map_err(|error| error.into_engine("maintenance request"))?;

            let tenancy = self
                .store()
                .tenancy(&updated.tenancy)
                .map_err(|error| error.into_engine("tenancy"))?
                .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;
            let mut parties = self.tenancy_parties(&tenancy)?;
            parties.owner = Some(updated.requester.clone());
            parties.assignee = updated.assignee.clone();
            self.dispatch(TransitionEvent {
                resource: ResourceType::MaintenanceRequest,
                resource_id: updated.id.0.clone(),
                action: action.action_kind(),
                actor: principal.user_id,
                before: Some(request.status.label()),
                after: Some(updated.status.label()),
                priority: NotificationPriority::Normal,
                summary: format!("Maintenance {}: {}", updated.status.label(), updated.title),
                parties,
            });
            Ok(updated)
        })
    }
}
