use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{
    HouseholdMember, HouseholdMemberId, NotificationPriority, TenancyId, UserId,
};
use crate::error::EngineError;
use crate::notify::{NotificationSink, TransitionEvent};
use crate::storage::EngineStore;

use super::{next_id, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHouseholdMember {
    pub tenancy: TenancyId,
    pub user: UserId,
    pub role_in_household: String,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    pub fn add_household_member(
        &self,
        principal_id: &UserId,
        input: NewHouseholdMember,
    ) -> Result<HouseholdMember, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(&input.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(
            &principal,
            ActionKind::AddMember,
            ResourceType::HouseholdMember,
            &facts,
        )?;

        if self
            .store()
            .user(&input.user)
            .map_err(|error| error.into_engine("user"))?
            .is_none()
        {
            return Err(EngineError::NotFound("user does not exist".to_string()));
        }

        let is_primary_tenant = tenancy.tenant == input.user;
        let member = HouseholdMember {
            id: HouseholdMemberId(next_id("hm")),
            tenancy: input.tenancy,
            user: input.user,
            is_primary_tenant,
            role_in_household: input.role_in_household,
        };
        let member = self
            .store()
            .insert_household_member(member)
            .map_err(|error| error.into_engine("household member"))?;

        let mut parties = self.tenancy_parties(&tenancy)?;
        parties.owner = parties.landlord.clone();
        self.dispatch(TransitionEvent {
            resource: ResourceType::HouseholdMember,
            resource_id: member.id.0.clone(),
            action: ActionKind::AddMember,
            actor: principal.user_id,
            before: None,
            after: None,
            priority: NotificationPriority::Normal,
            summary: "Household member added".to_string(),
            parties,
        });
        Ok(member)
    }

    /// Remove an occupant. Removing the row flagged as the primary tenant is
    /// reserved for the owning landlord or an admin even when a primary
    /// tenant would otherwise be allowed to manage the household.
    pub fn remove_household_member(
        &self,
        principal_id: &UserId,
        id: &HouseholdMemberId,
    ) -> Result<(), EngineError> {
        let principal = self.principal(principal_id)?;
        let member = self
            .store()
            .household_member(id)
            .map_err(|error| error.into_engine("household member"))?
            .ok_or_else(|| {
                EngineError::NotFound("household member does not exist".to_string())
            })?;

        let facts = self.evaluator().for_household_member(&principal, &member)?;
        self.require(
            &principal,
            ActionKind::RemoveMember,
            ResourceType::HouseholdMember,
            &facts,
        )?;

        if member.is_primary_tenant && !facts.is_admin && !facts.is_owner {
            return Err(EngineError::Unauthorized(
                "only the landlord or an admin may remove the primary tenant".to_string(),
            ));
        }

        self.store()
            .delete_household_member(id)
            .map_err(|error| error.into_engine("household member"))?;

        if let Some(tenancy) = self
            .store()
            .tenancy(&member.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
        {
            let mut parties = self.tenancy_parties(&tenancy)?;
            parties.owner = parties.landlord.clone();
            self.dispatch(TransitionEvent {
                resource: ResourceType::HouseholdMember,
                resource_id: member.id.0.clone(),
                action: ActionKind::RemoveMember,
                actor: principal.user_id,
                before: None,
                after: None,
                priority: NotificationPriority::Normal,
                summary: "Household member removed".to_string(),
                parties,
            });
        }
        Ok(())
    }

    pub fn list_household_members(
        &self,
        principal_id: &UserId,
        tenancy_id: &TenancyId,
    ) -> Result<Vec<HouseholdMember>, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(tenancy_id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(
            &principal,
            ActionKind::Read,
            ResourceType::HouseholdMember,
            &facts,
        )?;

        self.store()
            .household_members(tenancy_id)
            .map_err(|error| error.into_engine("household members"))
    }
}
