use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::ActionKind;
use crate::domain::{Dispute, DisputeStatus, UserId};
use crate::error::EngineError;

/// Dispute transitions. `Close` covers both withdrawal of an open dispute and
/// archiving a resolved one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DisputeAction {
    StartProgress,
    Resolve { notes: String },
    Close,
}

impl DisputeAction {
    pub const fn action_kind(&self) -> ActionKind {
        match self {
            DisputeAction::StartProgress => ActionKind::StartProgress,
            DisputeAction::Resolve { .. } => ActionKind::Resolve,
            DisputeAction::Close => ActionKind::Close,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.action_kind().label()
    }
}

pub fn apply(
    dispute: &Dispute,
    action: &DisputeAction,
    actor: &UserId,
    now: DateTime<Utc>,
) -> Result<Dispute, EngineError> {
    let mut updated = dispute.clone();

    match (dispute.status, action) {
        (DisputeStatus::Open, DisputeAction::StartProgress) => {
            updated.status = DisputeStatus::InProgress;
        }
        (DisputeStatus::InProgress, DisputeAction::Resolve { notes }) => {
            if notes.trim().is_empty() {
                return Err(EngineError::InvariantViolation(
                    "resolution requires non-empty resolution notes".to_string(),
                ));
            }
            updated.status = DisputeStatus::Resolved;
            updated.resolution_notes = Some(notes.trim().to_string());
            updated.resolver = Some(actor.clone());
            updated.resolved_at = Some(now);
        }
        (DisputeStatus::Open | DisputeStatus::Resolved, DisputeAction::Close) => {
            updated.status = DisputeStatus::Closed;
        }
        (current, action) => {
            return Err(EngineError::IllegalTransition(format!(
                "cannot {} a {} dispute",
                action.label(),
                current.label()
            )))
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::domain::{DisputeCategory, DisputeId, DisputePriority, TenancyId};

    use super::*;

    fn dispute(status: DisputeStatus) -> Dispute {
        Dispute {
            id: DisputeId::from("d-1"),
            tenancy: TenancyId::from("t-1"),
            reporter: UserId::from("tenant-1"),
            category: DisputeCategory::Damage,
            priority: DisputePriority::Medium,
            status,
            subject: "Broken gate".to_string(),
            resolution_notes: None,
            resolver: None,
            resolved_at: None,
            opened_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn resolution_stamps_resolver_notes_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let resolved = apply(
            &dispute(DisputeStatus::InProgress),
            &DisputeAction::Resolve {
                notes: "Gate repaired, cost shared".to_string(),
            },
            &UserId::from("landlord-1"),
            now,
        )
        .expect("resolution allowed");

        assert_eq!(resolved.status, DisputeStatus::Resolved);
        assert_eq!(resolved.resolver, Some(UserId::from("landlord-1")));
        assert_eq!(resolved.resolved_at, Some(now));
        assert_eq!(
            resolved.resolution_notes.as_deref(),
            Some("Gate repaired, cost shared")
        );
    }

    #[test]
    fn resolution_without_notes_is_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let error = apply(
            &dispute(DisputeStatus::InProgress),
            &DisputeAction::Resolve {
                notes: "   ".to_string(),
            },
            &UserId::from("landlord-1"),
            now,
        )
        .expect_err("blank notes rejected");
        assert!(matches!(error, EngineError::InvariantViolation(_)));
    }

    #[test]
    fn open_disputes_may_be_withdrawn() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let closed = apply(
            &dispute(DisputeStatus::Open),
            &DisputeAction::Close,
            &UserId::from("tenant-1"),
            now,
        )
        .expect("withdrawal allowed");
        assert_eq!(closed.status, DisputeStatus::Closed);
    }

    #[test]
    fn closed_is_terminal() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let error = apply(
            &dispute(DisputeStatus::Closed),
            &DisputeAction::StartProgress,
            &UserId::from("landlord-1"),
            now,
        )
        .expect_err("closed dispute frozen");
        assert!(matches!(error, EngineError::IllegalTransition(_)));
    }
}
