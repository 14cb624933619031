use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::{
    Dispute, DisputeId, DisputeStatus, Document, DocumentId, HouseholdMember, HouseholdMemberId,
    MaintenanceRequest, MaintenanceRequestId, MaintenanceStatus, Notification, NotificationId,
    Organization, OrgId, Payment, PaymentId, PaymentStatus, Property, PropertyId, PropertyStatus,
    SplitPayment, SupportTicket, SupportTicketId, SupportTicketStatus, Tenancy, TenancyId,
    TenancyStatus, User, UserId, SPLIT_SUM_EPSILON_CENTS,
};

use super::{EngineStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    organizations: BTreeMap<OrgId, Organization>,
    properties: BTreeMap<PropertyId, Property>,
    tenancies: BTreeMap<TenancyId, Tenancy>,
    household_members: BTreeMap<HouseholdMemberId, HouseholdMember>,
    payments: BTreeMap<PaymentId, Payment>,
    split_payments: BTreeMap<PaymentId, Vec<SplitPayment>>,
    disputes: BTreeMap<DisputeId, Dispute>,
    maintenance: BTreeMap<MaintenanceRequestId, MaintenanceRequest>,
    support_tickets: BTreeMap<SupportTicketId, SupportTicket>,
    documents: BTreeMap<DocumentId, Document>,
    notifications: BTreeMap<NotificationId, Notification>,
}

/// Store backed by in-process maps behind a single mutex, so compare-and-swap
/// updates and same-write invariant checks are naturally atomic. Used by the
/// api service and the test suites.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        f(&mut guard)
    }
}

fn insert_unique<K: Ord + Clone, V: Clone>(
    map: &mut BTreeMap<K, V>,
    key: K,
    value: V,
) -> Result<V, StoreError> {
    if map.contains_key(&key) {
        return Err(StoreError::AlreadyExists);
    }
    map.insert(key, value.clone());
    Ok(value)
}

impl Tables {
    fn active_tenancy_elsewhere(&self, tenancy: &Tenancy) -> bool {
        self.tenancies.values().any(|existing| {
            existing.id != tenancy.id
                && existing.property == tenancy.property
                && existing.status == TenancyStatus::Active
        })
    }

    /// Keep the property's occupancy in step with its tenancy, within the
    /// same lock scope as the tenancy write.
    fn sync_property_status(&mut self, tenancy: &Tenancy) {
        let Some(property) = self.properties.get_mut(&tenancy.property) else {
            return;
        };
        match tenancy.status {
            TenancyStatus::Active => property.status = PropertyStatus::Occupied,
            TenancyStatus::Expired | TenancyStatus::Terminated => {
                property.status = PropertyStatus::Available;
            }
            TenancyStatus::Pending => {}
        }
    }
}

impl EngineStore for InMemoryStore {
    fn user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.with_tables(|t| Ok(t.users.get(id).cloned()))
    }

    fn insert_user(&self, user: User) -> Result<User, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.users, user.id.clone(), user))
    }

    fn organization(&self, id: &OrgId) -> Result<Option<Organization>, StoreError> {
        self.with_tables(|t| Ok(t.organizations.get(id).cloned()))
    }

    fn insert_organization(&self, org: Organization) -> Result<Organization, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.organizations, org.id.clone(), org))
    }

    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError> {
        self.with_tables(|t| Ok(t.properties.get(id).cloned()))
    }

    fn insert_property(&self, property: Property) -> Result<Property, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.properties, property.id.clone(), property))
    }

    fn properties_for_landlord(&self, landlord: &UserId) -> Result<Vec<Property>, StoreError> {
        self.with_tables(|t| {
            Ok(t.properties
                .values()
                .filter(|property| &property.landlord == landlord)
                .cloned()
                .collect())
        })
    }

    fn update_property(&self, property: Property) -> Result<Property, StoreError> {
        self.with_tables(|t| {
            if !t.properties.contains_key(&property.id) {
                return Err(StoreError::NotFound);
            }
            t.properties.insert(property.id.clone(), property.clone());
            Ok(property)
        })
    }

    fn delete_property(&self, id: &PropertyId) -> Result<(), StoreError> {
        self.with_tables(|t| {
            t.properties.remove(id).ok_or(StoreError::NotFound)?;
            Ok(())
        })
    }

    fn tenancy(&self, id: &TenancyId) -> Result<Option<Tenancy>, StoreError> {
        self.with_tables(|t| Ok(t.tenancies.get(id).cloned()))
    }

    fn insert_tenancy(&self, tenancy: Tenancy) -> Result<Tenancy, StoreError> {
        self.with_tables(|t| {
            if tenancy.status == TenancyStatus::Active && t.active_tenancy_elsewhere(&tenancy) {
                return Err(StoreError::Invariant(
                    "property already has an active tenancy".to_string(),
                ));
            }
            let stored = insert_unique(&mut t.tenancies, tenancy.id.clone(), tenancy)?;
            t.sync_property_status(&stored);
            Ok(stored)
        })
    }

    fn cas_update_tenancy(
        &self,
        tenancy: Tenancy,
        expected: TenancyStatus,
    ) -> Result<Tenancy, StoreError> {
        self.with_tables(|t| {
            let current = t.tenancies.get(&tenancy.id).ok_or(StoreError::NotFound)?;
            if current.status != expected {
                return Err(StoreError::StaleState);
            }
            if tenancy.status == TenancyStatus::Active && t.active_tenancy_elsewhere(&tenancy) {
                return Err(StoreError::Invariant(
                    "property already has an active tenancy".to_string(),
                ));
            }
            t.tenancies.insert(tenancy.id.clone(), tenancy.clone());
            t.sync_property_status(&tenancy);
            Ok(tenancy)
        })
    }

    fn tenancies_for_property(&self, property: &PropertyId) -> Result<Vec<Tenancy>, StoreError> {
        self.with_tables(|t| {
            Ok(t.tenancies
                .values()
                .filter(|tenancy| &tenancy.property == property)
                .cloned()
                .collect())
        })
    }

    fn tenancies_for_tenant(&self, tenant: &UserId) -> Result<Vec<Tenancy>, StoreError> {
        self.with_tables(|t| {
            Ok(t.tenancies
                .values()
                .filter(|tenancy| &tenancy.tenant == tenant)
                .cloned()
                .collect())
        })
    }

    fn household_member(
        &self,
        id: &HouseholdMemberId,
    ) -> Result<Option<HouseholdMember>, StoreError> {
        self.with_tables(|t| Ok(t.household_members.get(id).cloned()))
    }

    fn insert_household_member(
        &self,
        member: HouseholdMember,
    ) -> Result<HouseholdMember, StoreError> {
        self.with_tables(|t| {
            let duplicate = t
                .household_members
                .values()
                .any(|existing| existing.tenancy == member.tenancy && existing.user == member.user);
            if duplicate {
                return Err(StoreError::Invariant(
                    "user is already a household member of this tenancy".to_string(),
                ));
            }
            insert_unique(&mut t.household_members, member.id.clone(), member)
        })
    }

    fn household_members(&self, tenancy: &TenancyId) -> Result<Vec<HouseholdMember>, StoreError> {
        self.with_tables(|t| {
            Ok(t.household_members
                .values()
                .filter(|member| &member.tenancy == tenancy)
                .cloned()
                .collect())
        })
    }

    fn household_memberships_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<HouseholdMember>, StoreError> {
        self.with_tables(|t| {
            Ok(t.household_members
                .values()
                .filter(|member| &member.user == user)
                .cloned()
                .collect())
        })
    }

    fn delete_household_member(&self, id: &HouseholdMemberId) -> Result<(), StoreError> {
        self.with_tables(|t| {
            t.household_members.remove(id).ok_or(StoreError::NotFound)?;
            Ok(())
        })
    }

    fn payment(&self, id: &PaymentId) -> Result<Option<Payment>, StoreError> {
        self.with_tables(|t| Ok(t.payments.get(id).cloned()))
    }

    fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.payments, payment.id.clone(), payment))
    }

    fn cas_update_payment(
        &self,
        payment: Payment,
        expected: PaymentStatus,
    ) -> Result<Payment, StoreError> {
        self.with_tables(|t| {
            let current = t.payments.get(&payment.id).ok_or(StoreError::NotFound)?;
            if current.status != expected {
                return Err(StoreError::StaleState);
            }
            t.payments.insert(payment.id.clone(), payment.clone());
            Ok(payment)
        })
    }

    fn payments_for_tenancy(&self, tenancy: &TenancyId) -> Result<Vec<Payment>, StoreError> {
        self.with_tables(|t| {
            Ok(t.payments
                .values()
                .filter(|payment| &payment.tenancy == tenancy)
                .cloned()
                .collect())
        })
    }

    fn split_payments(&self, payment: &PaymentId) -> Result<Vec<SplitPayment>, StoreError> {
        self.with_tables(|t| Ok(t.split_payments.get(payment).cloned().unwrap_or_default()))
    }

    fn insert_split_payments(
        &self,
        payment: &PaymentId,
        splits: Vec<SplitPayment>,
    ) -> Result<Vec<SplitPayment>, StoreError> {
        self.with_tables(|t| {
            let parent = t.payments.get(payment).ok_or(StoreError::NotFound)?;
            let existing: i64 = t
                .split_payments
                .get(payment)
                .map(|rows| rows.iter().map(|row| row.amount_cents).sum())
                .unwrap_or(0);
            let batch: i64 = splits.iter().map(|row| row.amount_cents).sum();
            let difference = (existing + batch - parent.amount_cents).abs();
            if difference > SPLIT_SUM_EPSILON_CENTS {
                return Err(StoreError::Invariant(format!(
                    "split amounts sum to {} cents but the payment is {} cents",
                    existing + batch,
                    parent.amount_cents
                )));
            }
            let rows = t.split_payments.entry(payment.clone()).or_default();
            rows.extend(splits.iter().cloned());
            Ok(splits)
        })
    }

    fn dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, StoreError> {
        self.with_tables(|t| Ok(t.disputes.get(id).cloned()))
    }

    fn insert_dispute(&self, dispute: Dispute) -> Result<Dispute, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.disputes, dispute.id.clone(), dispute))
    }

    fn cas_update_dispute(
        &self,
        dispute: Dispute,
        expected: DisputeStatus,
    ) -> Result<Dispute, StoreError> {
        self.with_tables(|t| {
            let current = t.disputes.get(&dispute.id).ok_or(StoreError::NotFound)?;
            if current.status != expected {
                return Err(StoreError::StaleState);
            }
            t.disputes.insert(dispute.id.clone(), dispute.clone());
            Ok(dispute)
        })
    }

    fn disputes_for_tenancy(&self, tenancy: &TenancyId) -> Result<Vec<Dispute>, StoreError> {
        self.with_tables(|t| {
            Ok(t.disputes
                .values()
                .filter(|dispute| &dispute.tenancy == tenancy)
                .cloned()
                .collect())
        })
    }

    fn maintenance_request(
        &self,
        id: &MaintenanceRequestId,
    ) -> Result<Option<MaintenanceRequest>, StoreError> {
        self.with_tables(|t| Ok(t.maintenance.get(id).cloned()))
    }

    fn insert_maintenance_request(
        &self,
        request: MaintenanceRequest,
    ) -> Result<MaintenanceRequest, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.maintenance, request.id.clone(), request))
    }

    fn cas_update_maintenance_request(
        &self,
        request: MaintenanceRequest,
        expected: MaintenanceStatus,
    ) -> Result<MaintenanceRequest, StoreError> {
        self.with_tables(|t| {
            let current = t.maintenance.get(&request.id).ok_or(StoreError::NotFound)?;
            if current.status != expected {
                return Err(StoreError::StaleState);
            }
            t.maintenance.insert(request.id.clone(), request.clone());
            Ok(request)
        })
    }

    fn maintenance_for_tenancy(
        &self,
        tenancy: &TenancyId,
    ) -> Result<Vec<MaintenanceRequest>, StoreError> {
        self.with_tables(|t| {
            Ok(t.maintenance
                .values()
                .filter(|request| &request.tenancy == tenancy)
                .cloned()
                .collect())
        })
    }

    fn support_ticket(&self, id: &SupportTicketId) -> Result<Option<SupportTicket>, StoreError> {
        self.with_tables(|t| Ok(t.support_tickets.get(id).cloned()))
    }

    fn insert_support_ticket(&self, ticket: SupportTicket) -> Result<SupportTicket, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.support_tickets, ticket.id.clone(), ticket))
    }

    fn cas_update_support_ticket(
        &self,
        ticket: SupportTicket,
        expected: SupportTicketStatus,
    ) -> Result<SupportTicket, StoreError> {
        self.with_tables(|t| {
            let current = t.support_tickets.get(&ticket.id).ok_or(StoreError::NotFound)?;
            if current.status != expected {
                return Err(StoreError::StaleState);
            }
            t.support_tickets.insert(ticket.id.clone(), ticket.clone());
            Ok(ticket)
        })
    }

    fn support_tickets_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SupportTicket>, StoreError> {
        self.with_tables(|t| {
            Ok(t.support_tickets
                .values()
                .filter(|ticket| &ticket.owner == owner)
                .cloned()
                .collect())
        })
    }

    fn document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        self.with_tables(|t| Ok(t.documents.get(id).cloned()))
    }

    fn insert_document(&self, document: Document) -> Result<Document, StoreError> {
        self.with_tables(|t| insert_unique(&mut t.documents, document.id.clone(), document))
    }

    fn documents_for_tenancy(&self, tenancy: &TenancyId) -> Result<Vec<Document>, StoreError> {
        self.with_tables(|t| {
            Ok(t.documents
                .values()
                .filter(|document| &document.tenancy == tenancy)
                .cloned()
                .collect())
        })
    }

    fn delete_document(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.with_tables(|t| {
            t.documents.remove(id).ok_or(StoreError::NotFound)?;
            Ok(())
        })
    }

    fn insert_notification(&self, notification: Notification) -> Result<Notification, StoreError> {
        self.with_tables(|t| {
            insert_unique(&mut t.notifications, notification.id.clone(), notification)
        })
    }

    fn notifications_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, StoreError> {
        self.with_tables(|t| {
            Ok(t.notifications
                .values()
                .filter(|notification| &notification.recipient == recipient)
                .cloned()
                .collect())
        })
    }

    fn mark_notification_read(&self, id: &NotificationId) -> Result<Notification, StoreError> {
        self.with_tables(|t| {
            let notification = t.notifications.get_mut(id).ok_or(StoreError::NotFound)?;
            notification.read = true;
            Ok(notification.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::SplitPaymentId;

    use super::*;

    fn property(id: &str, landlord: &str) -> Property {
        Property {
            id: PropertyId::from(id),
            landlord: UserId::from(landlord),
            organization: None,
            address: "12 Elm St".to_string(),
            status: PropertyStatus::Available,
        }
    }

    fn tenancy(id: &str, property: &str, tenant: &str, status: TenancyStatus) -> Tenancy {
        Tenancy {
            id: TenancyId::from(id),
            property: PropertyId::from(property),
            tenant: UserId::from(tenant),
            status,
            lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
            lease_end: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid"),
            rent_cents: 120_000,
        }
    }

    fn payment(id: &str, tenancy: &str, amount_cents: i64) -> Payment {
        Payment {
            id: PaymentId::from(id),
            tenancy: TenancyId::from(tenancy),
            amount_cents,
            due_date: NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid"),
            status: PaymentStatus::Pending,
            audit_notes: Vec::new(),
        }
    }

    fn split(id: &str, payment: &str, member: &str, amount_cents: i64) -> SplitPayment {
        SplitPayment {
            id: SplitPaymentId::from(id),
            payment: PaymentId::from(payment),
            member: HouseholdMemberId::from(member),
            amount_cents,
            status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn cas_rejects_stale_status() {
        let store = InMemoryStore::new();
        store
            .insert_property(property("p-1", "landlord-1"))
            .expect("property inserted");
        store
            .insert_tenancy(tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Pending))
            .expect("tenancy inserted");

        let mut updated = tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Active);
        updated.rent_cents = 130_000;
        store
            .cas_update_tenancy(updated.clone(), TenancyStatus::Pending)
            .expect("first swap succeeds");

        let error = store
            .cas_update_tenancy(updated, TenancyStatus::Pending)
            .expect_err("stale expectation rejected");
        assert_eq!(error, StoreError::StaleState);
    }

    #[test]
    fn activation_rejects_second_active_tenancy_for_property() {
        let store = InMemoryStore::new();
        store
            .insert_property(property("p-1", "landlord-1"))
            .expect("property inserted");
        store
            .insert_tenancy(tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Active))
            .expect("first tenancy active");
        store
            .insert_tenancy(tenancy("t-2", "p-1", "tenant-2", TenancyStatus::Pending))
            .expect("second tenancy pending");

        let error = store
            .cas_update_tenancy(
                tenancy("t-2", "p-1", "tenant-2", TenancyStatus::Active),
                TenancyStatus::Pending,
            )
            .expect_err("double activation rejected");
        assert!(matches!(error, StoreError::Invariant(_)));
    }

    #[test]
    fn tenancy_lifecycle_updates_property_occupancy() {
        let store = InMemoryStore::new();
        store
            .insert_property(property("p-1", "landlord-1"))
            .expect("property inserted");
        store
            .insert_tenancy(tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Pending))
            .expect("tenancy inserted");

        store
            .cas_update_tenancy(
                tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Active),
                TenancyStatus::Pending,
            )
            .expect("activated");
        let occupied = store
            .property(&PropertyId::from("p-1"))
            .expect("read")
            .expect("exists");
        assert_eq!(occupied.status, PropertyStatus::Occupied);

        store
            .cas_update_tenancy(
                tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Terminated),
                TenancyStatus::Active,
            )
            .expect("terminated");
        let freed = store
            .property(&PropertyId::from("p-1"))
            .expect("read")
            .expect("exists");
        assert_eq!(freed.status, PropertyStatus::Available);
    }

    #[test]
    fn split_insert_checks_sum_and_persists_nothing_on_mismatch() {
        let store = InMemoryStore::new();
        store
            .insert_property(property("p-1", "landlord-1"))
            .expect("property inserted");
        store
            .insert_tenancy(tenancy("t-1", "p-1", "tenant-1", TenancyStatus::Active))
            .expect("tenancy inserted");
        store
            .insert_payment(payment("pay-1", "t-1", 30_000))
            .expect("payment inserted");

        let error = store
            .insert_split_payments(
                &PaymentId::from("pay-1"),
                vec![
                    split("sp-1", "pay-1", "hm-1", 10_000),
                    split("sp-2", "pay-1", "hm-2", 10_000),
                    split("sp-3", "pay-1", "hm-3", 5_000),
                ],
            )
            .expect_err("short batch rejected");
        assert!(matches!(error, StoreError::Invariant(_)));
        assert!(store
            .split_payments(&PaymentId::from("pay-1"))
            .expect("read")
            .is_empty());

        let stored = store
            .insert_split_payments(
                &PaymentId::from("pay-1"),
                vec![
                    split("sp-1", "pay-1", "hm-1", 10_000),
                    split("sp-2", "pay-1", "hm-2", 10_000),
                    split("sp-3", "pay-1", "hm-3", 10_000),
                ],
            )
            .expect("balanced batch accepted");
        assert_eq!(stored.len(), 3);
    }

    #[test]
    fn household_membership_is_unique_per_tenancy_and_user() {
        let store = InMemoryStore::new();
        let member = HouseholdMember {
            id: HouseholdMemberId::from("hm-1"),
            tenancy: TenancyId::from("t-1"),
            user: UserId::from("user-1"),
            is_primary_tenant: false,
            role_in_household: "partner".to_string(),
        };
        store
            .insert_household_member(member.clone())
            .expect("first row accepted");

        let mut duplicate = member;
        duplicate.id = HouseholdMemberId::from("hm-2");
        let error = store
            .insert_household_member(duplicate)
            .expect_err("duplicate pair rejected");
        assert!(matches!(error, StoreError::Invariant(_)));
    }
}
