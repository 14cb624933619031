use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{Cents, NotificationPriority, PropertyId, Tenancy, TenancyId, TenancyStatus, UserId};
use crate::error::EngineError;
use crate::notify::{NotificationSink, TransitionEvent};
use crate::storage::EngineStore;
use crate::workflows::TenancyAction;

use super::{next_id, with_conflict_retry, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTenancy {
    pub property: PropertyId,
    pub tenant: UserId,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub rent_cents: Cents,
}

/// Lease-field changes. Only the landlord who owns the property (or an admin)
/// may apply these; the tenant side never writes lease terms directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseTermsUpdate {
    pub lease_end: NaiveDate,
    pub rent_cents: Cents,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    /// Create a tenancy in `pending`; it holds no occupancy until activated.
    pub fn create_tenancy(
        &self,
        principal_id: &UserId,
        input: NewTenancy,
    ) -> Result<Tenancy, EngineError> {
        let principal = self.principal(principal_id)?;
        let property = self
            .store()
            .property(&input.property)
            .map_err(|error| error.into_engine("property"))?
            .ok_or_else(|| EngineError::NotFound("property does not exist".to_string()))?;

        let facts = self.evaluator().for_property(&principal, &property)?;
        self.require(&principal, ActionKind::Create, ResourceType::Tenancy, &facts)?;

        if self
            .store()
            .user(&input.tenant)
            .map_err(|error| error.into_engine("tenant"))?
            .is_none()
        {
            return Err(EngineError::NotFound("tenant does not exist".to_string()));
        }
        if input.lease_end < input.lease_start {
            return Err(EngineError::InvariantViolation(
                "lease end precedes lease start".to_string(),
            ));
        }
        if input.rent_cents <= 0 {
            return Err(EngineError::InvariantViolation(
                "rent must be a positive amount".to_string(),
            ));
        }

        let tenancy = Tenancy {
            id: TenancyId(next_id("ten")),
            property: input.property,
            tenant: input.tenant,
            status: TenancyStatus::Pending,
            lease_start: input.lease_start,
            lease_end: input.lease_end,
            rent_cents: input.rent_cents,
        };
        let tenancy = self
            .store()
            .insert_tenancy(tenancy)
            .map_err(|error| error.into_engine("tenancy"))?;

        let parties = self.tenancy_parties(&tenancy)?;
        self.dispatch(TransitionEvent {
            resource: ResourceType::Tenancy,
            resource_id: tenancy.id.0.clone(),
            action: ActionKind::Create,
            actor: principal.user_id,
            before: None,
            after: Some(tenancy.status.label()),
            priority: NotificationPriority::Normal,
            summary: "Lease offer created".to_string(),
            parties,
        });
        Ok(tenancy)
    }

    pub fn get_tenancy(
        &self,
        principal_id: &UserId,
        id: &TenancyId,
    ) -> Result<Tenancy, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::Read, ResourceType::Tenancy, &facts)?;
        Ok(tenancy)
    }

    /// Tenancies visible to the principal: their own leases plus leases on
    /// properties they own.
    pub fn list_tenancies(&self, principal_id: &UserId) -> Result<Vec<Tenancy>, EngineError> {
        let principal = self.principal(principal_id)?;
        let facts = self.principal_facts(&principal);
        self.require(&principal, ActionKind::List, ResourceType::Tenancy, &facts)?;

        let mut tenancies = self
            .store()
            .tenancies_for_tenant(&principal.user_id)
            .map_err(|error| error.into_engine("tenancies"))?;
        for property in self
            .store()
            .properties_for_landlord(&principal.user_id)
            .map_err(|error| error.into_engine("properties"))?
        {
            for tenancy in self
                .store()
                .tenancies_for_property(&property.id)
                .map_err(|error| error.into_engine("tenancies"))?
            {
                if !tenancies.iter().any(|existing| existing.id == tenancy.id) {
                    tenancies.push(tenancy);
                }
            }
        }
        Ok(tenancies)
    }

    pub fn update_lease_terms(
        &self,
        principal_id: &UserId,
        id: &TenancyId,
        update: LeaseTermsUpdate,
    ) -> Result<Tenancy, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::Update, ResourceType::Tenancy, &facts)?;

        if tenancy.status.is_terminal() {
            return Err(EngineError::IllegalTransition(format!(
                "lease terms of a {} tenancy are frozen",
                tenancy.status.label()
            )));
        }
        if update.lease_end < tenancy.lease_start {
            return Err(EngineError::InvariantViolation(
                "lease end precedes lease start".to_string(),
            ));
        }
        if update.rent_cents <= 0 {
            return Err(EngineError::InvariantViolation(
                "rent must be a positive amount".to_string(),
            ));
        }

        let expected = tenancy.status;
        let mut updated = tenancy;
        updated.lease_end = update.lease_end;
        updated.rent_cents = update.rent_cents;
        let updated = self
            .store()
            .cas_update_tenancy(updated, expected)
            .map_err(|error| error.into_engine("tenancy"))?;

        let parties = self.tenancy_parties(&updated)?;
        self.dispatch(TransitionEvent {
            resource: ResourceType::Tenancy,
            resource_id: updated.id.0.clone(),
            action: ActionKind::Update,
            actor: principal.user_id,
            before: None,
            after: None,
            priority: NotificationPriority::Normal,
            summary: "Lease terms updated".to_string(),
            parties,
        });
        Ok(updated)
    }

    /// Drive one lifecycle transition. The store rejects an activation racing
    /// another active tenancy on the same property, and keeps the property's
    /// occupancy in step within the same write.
    pub fn transition_tenancy(
        &self,
        principal_id: &UserId,
        id: &TenancyId,
        action: TenancyAction,
    ) -> Result<Tenancy, EngineError> {
        with_conflict_retry(|| {
            let principal = self.principal(principal_id)?;
            let tenancy = self
                .store()
                .tenancy(id)
                .map_err(|error| error.into_engine("tenancy"))?
                .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

            let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
            self.require(&principal, action.action_kind(), ResourceType::Tenancy, &facts)?;

            let updated = crate::workflows::tenancy::apply(&tenancy, &action, self.clock().today())?;
            let updated = self
                .store()
                .cas_update_tenancy(updated, tenancy.status)
                .map_err(|error| error.into_engine("tenancy"))?;

            let parties = self.tenancy_parties(&updated)?;
            self.dispatch(TransitionEvent {
                resource: ResourceType::Tenancy,
                resource_id: updated.id.0.clone(),
                action: action.action_kind(),
                actor: principal.user_id,
                before: Some(tenancy.status.label()),
                after: Some(updated.status.label()),
                priority: NotificationPriority::Normal,
                summary: format!("Tenancy {}", updated.status.label()),
                parties,
            });
            Ok(updated)
        })
    }
}
