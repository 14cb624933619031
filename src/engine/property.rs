use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{OrgId, Property, PropertyId, PropertyStatus, TenancyStatus, UserId};
use crate::error::EngineError;
use crate::notify::NotificationSink;
use crate::storage::EngineStore;

use super::{next_id, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub address: String,
    #[serde(default)]
    pub organization: Option<OrgId>,
}

/// Field updates a landlord may make directly. Status is deliberately absent:
/// occupancy follows the tenancy lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyUpdate {
    pub address: String,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    pub fn create_property(
        &self,
        principal_id: &UserId,
        input: NewProperty,
    ) -> Result<Property, EngineError> {
        let principal = self.principal(principal_id)?;
        let facts = self.principal_facts(&principal);
        self.require(&principal, ActionKind::Create, ResourceType::Property, &facts)?;

        let property = Property {
            id: PropertyId(next_id("prop")),
            landlord: principal.user_id.clone(),
            organization: input.organization.or(principal.organization),
            address: input.address,
            status: PropertyStatus::Available,
        };

        self.store()
            .insert_property(property)
            .map_err(|error| error.into_engine("property"))
    }

    pub fn get_property(
        &self,
        principal_id: &UserId,
        id: &PropertyId,
    ) -> Result<Property, EngineError> {
        let principal = self.principal(principal_id)?;
        let property = self
            .store()
            .property(id)
            .map_err(|error| error.into_engine("property"))?
            .ok_or_else(|| EngineError::NotFound("property does not exist".to_string()))?;

        let facts = self.evaluator().for_property(&principal, &property)?;
        self.require(&principal, ActionKind::Read, ResourceType::Property, &facts)?;
        Ok(property)
    }

    pub fn list_properties(&self, principal_id: &UserId) -> Result<Vec<Property>, EngineError> {
        let principal = self.principal(principal_id)?;
        let facts = self.principal_facts(&principal);
        self.require(&principal, ActionKind::List, ResourceType::Property, &facts)?;

        self.store()
            .properties_for_landlord(&principal.user_id)
            .map_err(|error| error.into_engine("properties"))
    }

    pub fn update_property(
        &self,
        principal_id: &UserId,
        id: &PropertyId,
        update: PropertyUpdate,
    ) -> Result<Property, EngineError> {
        let principal = self.principal(principal_id)?;
        let property = self
            .store()
            .property(id)
            .map_err(|error| error.into_engine("property"))?
            .ok_or_else(|| EngineError::NotFound("property does not exist".to_string()))?;

        let facts = self.evaluator().for_property(&principal, &property)?;
        self.require(&principal, ActionKind::Update, ResourceType::Property, &facts)?;

        // Occupancy never changes here; only the editable fields move.
        let mut updated = property;
        updated.address = update.address;
        self.store()
            .update_property(updated)
            .map_err(|error| error.into_engine("property"))
    }

    pub fn delete_property(
        &self,
        principal_id: &UserId,
        id: &PropertyId,
    ) -> Result<(), EngineError> {
        let principal = self.principal(principal_id)?;
        let property = self
            .store()
            .property(id)
            .map_err(|error| error.into_engine("property"))?
            .ok_or_else(|| EngineError::NotFound("property does not exist".to_string()))?;

        let facts = self.evaluator().for_property(&principal, &property)?;
        self.require(&principal, ActionKind::Delete, ResourceType::Property, &facts)?;

        let has_active_tenancy = self
            .store()
            .tenancies_for_property(id)
            .map_err(|error| error.into_engine("tenancies"))?
            .iter()
            .any(|tenancy| tenancy.status == TenancyStatus::Active);
        if has_active_tenancy {
            return Err(EngineError::InvariantViolation(
                "a property with an active tenancy cannot be removed".to_string(),
            ));
        }

        self.store()
            .delete_property(id)
            .map_err(|error| error.into_engine("property"))
    }
}
