use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{MaintenanceRequestId, TenancyId, UserId};
use super::payment::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }
}

/// A repair request raised against a tenancy. `assignee` is set only by the
/// assign transition, which also schedules the work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: MaintenanceRequestId,
    pub tenancy: TenancyId,
    pub requester: UserId,
    pub assignee: Option<UserId>,
    pub status: MaintenanceStatus,
    pub title: String,
    pub estimated_cost_cents: Option<Cents>,
    pub scheduled_date: Option<NaiveDate>,
    pub completion_notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}
