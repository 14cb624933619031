use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DisputeId, TenancyId, UserId};
use super::notification::NotificationPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl DisputeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::InProgress => "in_progress",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeCategory {
    Rent,
    Deposit,
    Damage,
    Noise,
    LeaseTerms,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl DisputePriority {
    /// Notification urgency derived from the dispute's own priority.
    pub const fn notification_priority(self) -> NotificationPriority {
        match self {
            DisputePriority::Low | DisputePriority::Medium => NotificationPriority::Normal,
            DisputePriority::High | DisputePriority::Urgent => NotificationPriority::High,
        }
    }
}

/// A disagreement raised within a tenancy's scope. Resolution stamps the
/// resolver and timestamp and requires non-empty notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub tenancy: TenancyId,
    pub reporter: UserId,
    pub category: DisputeCategory,
    pub priority: DisputePriority,
    pub status: DisputeStatus,
    pub subject: String,
    pub resolution_notes: Option<String>,
    pub resolver: Option<UserId>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub opened_at: DateTime<Utc>,
}
