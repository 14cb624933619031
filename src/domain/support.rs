use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{SupportTicketId, UserId};
use super::notification::NotificationPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportTicketStatus {
    Open,
    Pending,
    InProgress,
    WaitingForCustomer,
    Resolved,
    Closed,
}

impl SupportTicketStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SupportTicketStatus::Open => "open",
            SupportTicketStatus::Pending => "pending",
            SupportTicketStatus::InProgress => "in_progress",
            SupportTicketStatus::WaitingForCustomer => "waiting_for_customer",
            SupportTicketStatus::Resolved => "resolved",
            SupportTicketStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportCategory {
    Billing,
    Account,
    Technical,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl SupportPriority {
    pub const fn notification_priority(self) -> NotificationPriority {
        match self {
            SupportPriority::Low | SupportPriority::Medium => NotificationPriority::Normal,
            SupportPriority::High | SupportPriority::Urgent => NotificationPriority::High,
        }
    }
}

/// A help-desk ticket owned by the user who raised it. The owner may edit the
/// ticket body only while it is still `open`; triage locks it to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: SupportTicketId,
    pub owner: UserId,
    pub assignee: Option<UserId>,
    pub status: SupportTicketStatus,
    pub category: SupportCategory,
    pub priority: SupportPriority,
    pub subject: String,
    pub opened_at: DateTime<Utc>,
}
