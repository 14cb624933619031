use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::ActionKind;
use crate::domain::{Cents, MaintenanceRequest, MaintenanceStatus, UserId};
use crate::error::EngineError;

/// Maintenance request transitions. `Assign` is the only action allowed to
/// set the assignee, and doing so schedules the work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MaintenanceAction {
    Assign {
        assignee: UserId,
        estimated_cost_cents: Option<Cents>,
        scheduled_date: NaiveDate,
    },
    StartWork,
    Complete {
        notes: String,
    },
    Cancel,
}

impl MaintenanceAction {
    pub const fn action_kind(&self) -> ActionKind {
        match self {
            MaintenanceAction::Assign { .. } => ActionKind::Assign,
            MaintenanceAction::StartWork => ActionKind::StartWork,
            MaintenanceAction::Complete { .. } => ActionKind::Complete,
            MaintenanceAction::Cancel => ActionKind::Cancel,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.action_kind().label()
    }
}

pub fn apply(
    request: &MaintenanceRequest,
    action: &MaintenanceAction,
    now: DateTime<Utc>,
) -> Result<MaintenanceRequest, EngineError> {
    let mut updated = request.clone();

    match (request.status, action) {
        (
            MaintenanceStatus::Pending,
            MaintenanceAction::Assign {
                assignee,
                estimated_cost_cents,
                scheduled_date,
            },
        ) => {
            updated.status = MaintenanceStatus::Scheduled;
            updated.assignee = Some(assignee.clone());
            updated.estimated_cost_cents = *estimated_cost_cents;
            updated.scheduled_date = Some(*scheduled_date);
        }
        (MaintenanceStatus::Scheduled, MaintenanceAction::StartWork) => {
            updated.status = MaintenanceStatus::InProgress;
        }
        (
            MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress,
            MaintenanceAction::Complete { notes },
        ) => {
            updated.status = MaintenanceStatus::Completed;
            updated.completion_notes = Some(notes.clone());
            updated.completed_at = Some(now);
        }
        (
            MaintenanceStatus::Pending | MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress,
            MaintenanceAction::Cancel,
        ) => {
            updated.status = MaintenanceStatus::Cancelled;
        }
        (current, action) => {
            return Err(EngineError::IllegalTransition(format!(
                "cannot {} a {} maintenance request",
                action.label(),
                current.label()
            )))
        }
    }

    Ok(updated)
}
