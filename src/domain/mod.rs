//! Core entities shared by the authorization, workflow, and notification
//! layers. Attributes mirror what the engine needs to state invariants, not a
//! storage schema.

mod document;
mod dispute;
mod ids;
mod maintenance;
mod notification;
mod payment;
mod property;
mod support;
mod tenancy;
mod user;

pub use dispute::{Dispute, DisputeCategory, DisputePriority, DisputeStatus};
pub use document::Document;
pub use ids::{
    DisputeId, DocumentId, HouseholdMemberId, MaintenanceRequestId, NotificationId, OrgId,
    PaymentId, PropertyId, SplitPaymentId, SupportTicketId, TenancyId, UserId,
};
pub use maintenance::{MaintenanceRequest, MaintenanceStatus};
pub use notification::{Notification, NotificationPriority};
pub use payment::{Cents, Payment, PaymentStatus, SplitPayment, SPLIT_SUM_EPSILON_CENTS};
pub use property::{Property, PropertyStatus};
pub use support::{SupportCategory, SupportPriority, SupportTicket, SupportTicketStatus};
pub use tenancy::{HouseholdMember, Tenancy, TenancyStatus};
pub use user::{Organization, Role, SubscriptionTier, User};
