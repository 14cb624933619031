//! Storage collaborator interface. The engine only ever talks to persistence
//! through [`EngineStore`]; adapters must honor the compare-and-swap and
//! same-write invariant checks documented on the individual methods.

mod memory;

pub use memory::InMemoryStore;

use crate::domain::{
    Dispute, DisputeId, DisputeStatus, Document, DocumentId, HouseholdMember, HouseholdMemberId,
    MaintenanceRequest, MaintenanceRequestId, MaintenanceStatus, Notification, NotificationId,
    Organization, OrgId, Payment, PaymentId, PaymentStatus, Property, PropertyId, SplitPayment,
    SupportTicket, SupportTicketId, SupportTicketStatus, Tenancy, TenancyId, TenancyStatus, User,
    UserId,
};
use crate::error::EngineError;

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    AlreadyExists,
    #[error("stale state: record changed since it was read")]
    StaleState,
    #[error("store invariant violated: {0}")]
    Invariant(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Translate into the engine taxonomy, naming the resource involved.
    pub fn into_engine(self, what: &str) -> EngineError {
        match self {
            StoreError::NotFound => EngineError::NotFound(format!("{what} does not exist")),
            StoreError::AlreadyExists => {
                EngineError::Conflict(format!("{what} already exists"))
            }
            StoreError::StaleState => {
                EngineError::Conflict(format!("{what} changed since it was read"))
            }
            StoreError::Invariant(reason) => EngineError::InvariantViolation(reason),
            StoreError::Unavailable(reason) => EngineError::Unavailable(reason),
        }
    }
}

/// Typed read/write operations per entity.
///
/// Every `cas_update_*` replaces the stored record only if the currently
/// persisted status equals `expected`; otherwise it fails with
/// [`StoreError::StaleState`] so the caller can re-evaluate against fresh
/// state. Methods that carry a documented invariant must run the check within
/// the same atomic scope as the write.
pub trait EngineStore: Send + Sync {
    // Users and organizations.
    fn user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn insert_user(&self, user: User) -> Result<User, StoreError>;
    fn organization(&self, id: &OrgId) -> Result<Option<Organization>, StoreError>;
    fn insert_organization(&self, org: Organization) -> Result<Organization, StoreError>;

    // Properties.
    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError>;
    fn insert_property(&self, property: Property) -> Result<Property, StoreError>;
    fn properties_for_landlord(&self, landlord: &UserId) -> Result<Vec<Property>, StoreError>;
    fn update_property(&self, property: Property) -> Result<Property, StoreError>;
    fn delete_property(&self, id: &PropertyId) -> Result<(), StoreError>;

    // Tenancies. Activation (new status `active`) must verify, within the
    // same write, that no other active tenancy exists for the property, and
    // must flip the property to occupied; a terminal new status frees the
    // property back to available.
    fn tenancy(&self, id: &TenancyId) -> Result<Option<Tenancy>, StoreError>;
    fn insert_tenancy(&self, tenancy: Tenancy) -> Result<Tenancy, StoreError>;
    fn cas_update_tenancy(
        &self,
        tenancy: Tenancy,
        expected: TenancyStatus,
    ) -> Result<Tenancy, StoreError>;
    fn tenancies_for_property(&self, property: &PropertyId) -> Result<Vec<Tenancy>, StoreError>;
    fn tenancies_for_tenant(&self, tenant: &UserId) -> Result<Vec<Tenancy>, StoreError>;

    // Household members. At most one row per (tenancy, user) pair.
    fn household_member(
        &self,
        id: &HouseholdMemberId,
    ) -> Result<Option<HouseholdMember>, StoreError>;
    fn insert_household_member(
        &self,
        member: HouseholdMember,
    ) -> Result<HouseholdMember, StoreError>;
    fn household_members(&self, tenancy: &TenancyId) -> Result<Vec<HouseholdMember>, StoreError>;
    fn household_memberships_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<HouseholdMember>, StoreError>;
    fn delete_household_member(&self, id: &HouseholdMemberId) -> Result<(), StoreError>;

    // Payments. `insert_split_payments` is all-or-nothing and must verify,
    // within the same write, that existing plus new split amounts sum to the
    // parent payment amount within the documented epsilon.
    fn payment(&self, id: &PaymentId) -> Result<Option<Payment>, StoreError>;
    fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError>;
    fn cas_update_payment(
        &self,
        payment: Payment,
        expected: PaymentStatus,
    ) -> Result<Payment, StoreError>;
    fn payments_for_tenancy(&self, tenancy: &TenancyId) -> Result<Vec<Payment>, StoreError>;
    fn split_payments(&self, payment: &PaymentId) -> Result<Vec<SplitPayment>, StoreError>;
    fn insert_split_payments(
        &self,
        payment: &PaymentId,
        splits: Vec<SplitPayment>,
    ) -> Result<Vec<SplitPayment>, StoreError>;

    // Disputes.
    fn dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, StoreError>;
    fn insert_dispute(&self, dispute: Dispute) -> Result<Dispute, StoreError>;
    fn cas_update_dispute(
        &self,
        dispute: Dispute,
        expected: DisputeStatus,
    ) -> Result<Dispute, StoreError>;
    fn disputes_for_tenancy(&self, tenancy: &TenancyId) -> Result<Vec<Dispute>, StoreError>;

    // Maintenance requests.
    fn maintenance_request(
        &self,
        id: &MaintenanceRequestId,
    ) -> Result<Option<MaintenanceRequest>, StoreError>;
    fn insert_maintenance_request(
        &self,
        request: MaintenanceRequest,
    ) -> Result<MaintenanceRequest, StoreError>;
    fn cas_update_maintenance_request(
        &self,
        request: MaintenanceRequest,
        expected: MaintenanceStatus,
    ) -> Result<MaintenanceRequest, StoreError>;
    fn maintenance_for_tenancy(
        &self,
        tenancy: &TenancyId,
    ) -> Result<Vec<MaintenanceRequest>, StoreError>;

    // Support tickets.
    fn support_ticket(&self, id: &SupportTicketId) -> Result<Option<SupportTicket>, StoreError>;
    fn insert_support_ticket(&self, ticket: SupportTicket) -> Result<SupportTicket, StoreError>;
    fn cas_update_support_ticket(
        &self,
        ticket: SupportTicket,
        expected: SupportTicketStatus,
    ) -> Result<SupportTicket, StoreError>;
    fn support_tickets_for_owner(&self, owner: &UserId)
        -> Result<Vec<SupportTicket>, StoreError>;

    // Documents.
    fn document(&self, id: &DocumentId) -> Result<Option<Document>, StoreError>;
    fn insert_document(&self, document: Document) -> Result<Document, StoreError>;
    fn documents_for_tenancy(&self, tenancy: &TenancyId) -> Result<Vec<Document>, StoreError>;
    fn delete_document(&self, id: &DocumentId) -> Result<(), StoreError>;

    // Notifications.
    fn insert_notification(&self, notification: Notification) -> Result<Notification, StoreError>;
    fn notifications_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, StoreError>;
    fn mark_notification_read(&self, id: &NotificationId) -> Result<Notification, StoreError>;
}
