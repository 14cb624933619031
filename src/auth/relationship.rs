use crate::domain::{
    Dispute, Document, HouseholdMember, MaintenanceRequest, Notification, Payment, Property, Role,
    SupportTicket, Tenancy,
};
use crate::error::EngineError;
use crate::storage::EngineStore;

use super::principal::Principal;

/// Boolean facts linking a principal to one resource instance. `is_owner` is
/// resource-specific: the landlord behind a tenancy-scoped resource, the
/// uploader of a document, the owner of a support ticket, the recipient of a
/// notification. `is_counterparty` marks the tenant side of a tenancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationshipFacts {
    pub is_admin: bool,
    pub is_owner: bool,
    pub is_counterparty: bool,
    pub is_household_member: bool,
    pub is_primary_tenant: bool,
    pub is_assignee: bool,
    pub same_organization: bool,
}

impl RelationshipFacts {
    /// Fail-closed fact set: only the role-derived admin flag survives a
    /// broken reference chain.
    fn closed(principal: &Principal) -> Self {
        Self {
            is_admin: principal.role == Role::Admin,
            ..Self::default()
        }
    }
}

/// Computes relationship facts by following the minimal reference chain for
/// each resource type. Pure with respect to the persisted state: reads only,
/// never eagerly loading unrelated rows.
pub struct RelationshipEvaluator<'a, S: EngineStore> {
    store: &'a S,
}

impl<'a, S: EngineStore> RelationshipEvaluator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn for_tenancy(
        &self,
        principal: &Principal,
        tenancy: &Tenancy,
    ) -> Result<RelationshipFacts, EngineError> {
        let mut facts = RelationshipFacts::closed(principal);

        let Some(property) = self
            .store
            .property(&tenancy.property)
            .map_err(|error| error.into_engine("property"))?
        else {
            // Parent chain broken: deny everything relationship-derived.
            return Ok(facts);
        };

        facts.is_owner = property.landlord == principal.user_id;
        facts.is_counterparty = tenancy.tenant == principal.user_id;
        facts.same_organization = match (&property.organization, &principal.organization) {
            (Some(property_org), Some(principal_org)) => property_org == principal_org,
            _ => false,
        };

        for member in self
            .store
            .household_members(&tenancy.id)
            .map_err(|error| error.into_engine("household members"))?
        {
            if member.user == principal.user_id {
                facts.is_household_member = true;
                facts.is_primary_tenant = member.is_primary_tenant;
            }
        }
        // The primary tenant counts as a household member even without a row.
        if facts.is_counterparty {
            facts.is_household_member = true;
            facts.is_primary_tenant = true;
        }

        Ok(facts)
    }

    fn for_tenancy_scoped(
        &self,
        principal: &Principal,
        tenancy_id: &crate::domain::TenancyId,
    ) -> Result<RelationshipFacts, EngineError> {
        match self
            .store
            .tenancy(tenancy_id)
            .map_err(|error| error.into_engine("tenancy"))?
        {
            Some(tenancy) => self.for_tenancy(principal, &tenancy),
            None => Ok(RelationshipFacts::closed(principal)),
        }
    }

    pub fn for_property(
        &self,
        principal: &Principal,
        property: &Property,
    ) -> Result<RelationshipFacts, EngineError> {
        let mut facts = RelationshipFacts::closed(principal);
        facts.is_owner = property.landlord == principal.user_id;
        facts.same_organization = match (&property.organization, &principal.organization) {
            (Some(property_org), Some(principal_org)) => property_org == principal_org,
            _ => false,
        };

        for tenancy in self
            .store
            .tenancies_for_property(&property.id)
            .map_err(|error| error.into_engine("tenancies"))?
        {
            if tenancy.status != crate::domain::TenancyStatus::Active {
                continue;
            }
            let tenancy_facts = self.for_tenancy(principal, &tenancy)?;
            facts.is_counterparty |= tenancy_facts.is_counterparty;
            facts.is_household_member |= tenancy_facts.is_household_member;
            facts.is_primary_tenant |= tenancy_facts.is_primary_tenant;
        }

        Ok(facts)
    }

    pub fn for_dispute(
        &self,
        principal: &Principal,
        dispute: &Dispute,
    ) -> Result<RelationshipFacts, EngineError> {
        self.for_tenancy_scoped(principal, &dispute.tenancy)
    }

    pub fn for_maintenance(
        &self,
        principal: &Principal,
        request: &MaintenanceRequest,
    ) -> Result<RelationshipFacts, EngineError> {
        let mut facts = self.for_tenancy_scoped(principal, &request.tenancy)?;
        facts.is_assignee = request.assignee.as_ref() == Some(&principal.user_id);
        Ok(facts)
    }

    pub fn for_payment(
        &self,
        principal: &Principal,
        payment: &Payment,
    ) -> Result<RelationshipFacts, EngineError> {
        self.for_tenancy_scoped(principal, &payment.tenancy)
    }

    pub fn for_household_member(
        &self,
        principal: &Principal,
        member: &HouseholdMember,
    ) -> Result<RelationshipFacts, EngineError> {
        self.for_tenancy_scoped(principal, &member.tenancy)
    }

    pub fn for_support_ticket(
        &self,
        principal: &Principal,
        ticket: &SupportTicket,
    ) -> Result<RelationshipFacts, EngineError> {
        let mut facts = RelationshipFacts::closed(principal);
        facts.is_owner = ticket.owner == principal.user_id;
        facts.is_assignee = ticket.assignee.as_ref() == Some(&principal.user_id);

        if let Some(principal_org) = &principal.organization {
            let owner = self
                .store
                .user(&ticket.owner)
                .map_err(|error| error.into_engine("ticket owner"))?;
            facts.same_organization = owner
                .and_then(|user| user.organization)
                .map(|org| &org == principal_org)
                .unwrap_or(false);
        }

        Ok(facts)
    }

    pub fn for_document(
        &self,
        principal: &Principal,
        document: &Document,
    ) -> Result<RelationshipFacts, EngineError> {
        let mut facts = self.for_tenancy_scoped(principal, &document.tenancy)?;
        // The uploader owns the document alongside the backing property's
        // landlord.
        facts.is_owner |= document.uploader == principal.user_id;
        Ok(facts)
    }

    pub fn for_notification(
        &self,
        principal: &Principal,
        notification: &Notification,
    ) -> Result<RelationshipFacts, EngineError> {
        let mut facts = RelationshipFacts::closed(principal);
        facts.is_owner = notification.recipient == principal.user_id;
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::{
        HouseholdMemberId, Property, PropertyId, PropertyStatus, Tenancy, TenancyId, TenancyStatus,
        UserId,
    };
    use crate::storage::InMemoryStore;

    use super::*;

    fn principal(id: &str, role: Role) -> Principal {
        Principal {
            user_id: UserId::from(id),
            role,
            organization: None,
        }
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_property(Property {
                id: PropertyId::from("p-1"),
                landlord: UserId::from("landlord-1"),
                organization: None,
                address: "4 Birch Ln".to_string(),
                status: PropertyStatus::Occupied,
            })
            .expect("property inserted");
        store
            .insert_tenancy(Tenancy {
                id: TenancyId::from("t-1"),
                property: PropertyId::from("p-1"),
                tenant: UserId::from("tenant-1"),
                status: TenancyStatus::Active,
                lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
                lease_end: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid"),
                rent_cents: 100_000,
            })
            .expect("tenancy inserted");
        store
            .insert_household_member(HouseholdMember {
                id: HouseholdMemberId::from("hm-1"),
                tenancy: TenancyId::from("t-1"),
                user: UserId::from("member-1"),
                is_primary_tenant: false,
                role_in_household: "partner".to_string(),
            })
            .expect("member inserted");
        store
    }

    #[test]
    fn landlord_is_owner_but_not_household_member() {
        let store = seeded_store();
        let tenancy = store
            .tenancy(&TenancyId::from("t-1"))
            .expect("read")
            .expect("exists");
        let facts = RelationshipEvaluator::new(&store)
            .for_tenancy(&principal("landlord-1", Role::Landlord), &tenancy)
            .expect("facts evaluate");

        assert!(facts.is_owner);
        assert!(!facts.is_counterparty);
        assert!(!facts.is_household_member);
    }

    #[test]
    fn tenant_is_counterparty_and_primary() {
        let store = seeded_store();
        let tenancy = store
            .tenancy(&TenancyId::from("t-1"))
            .expect("read")
            .expect("exists");
        let facts = RelationshipEvaluator::new(&store)
            .for_tenancy(&principal("tenant-1", Role::Tenant), &tenancy)
            .expect("facts evaluate");

        assert!(facts.is_counterparty);
        assert!(facts.is_household_member);
        assert!(facts.is_primary_tenant);
        assert!(!facts.is_owner);
    }

    #[test]
    fn household_member_is_not_primary() {
        let store = seeded_store();
        let tenancy = store
            .tenancy(&TenancyId::from("t-1"))
            .expect("read")
            .expect("exists");
        let facts = RelationshipEvaluator::new(&store)
            .for_tenancy(&principal("member-1", Role::Tenant), &tenancy)
            .expect("facts evaluate");

        assert!(facts.is_household_member);
        assert!(!facts.is_primary_tenant);
        assert!(!facts.is_counterparty);
    }

    #[test]
    fn broken_property_chain_fails_closed() {
        let store = InMemoryStore::new();
        store
            .insert_tenancy(Tenancy {
                id: TenancyId::from("t-orphan"),
                property: PropertyId::from("p-missing"),
                tenant: UserId::from("tenant-1"),
                status: TenancyStatus::Pending,
                lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
                lease_end: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid"),
                rent_cents: 100_000,
            })
            .expect("tenancy inserted");

        let tenancy = store
            .tenancy(&TenancyId::from("t-orphan"))
            .expect("read")
            .expect("exists");
        let facts = RelationshipEvaluator::new(&store)
            .for_tenancy(&principal("tenant-1", Role::Tenant), &tenancy)
            .expect("facts evaluate");

        assert_eq!(facts, RelationshipFacts::default());
    }

    #[test]
    fn admin_fact_survives_broken_chain() {
        let store = InMemoryStore::new();
        let dispute_tenancy = TenancyId::from("t-missing");
        let facts = RelationshipEvaluator::new(&store)
            .for_tenancy_scoped(&principal("admin-1", Role::Admin), &dispute_tenancy)
            .expect("facts evaluate");

        assert!(facts.is_admin);
        assert!(!facts.is_owner);
    }
}
