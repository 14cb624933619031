use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::ActionKind;
use crate::domain::{Tenancy, TenancyStatus};
use crate::error::EngineError;

/// User- or clock-triggered tenancy transitions. `Expire` is derived from the
/// lease calendar rather than a counterparty request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TenancyAction {
    Activate,
    Terminate,
    Expire,
}

impl TenancyAction {
    pub const fn action_kind(&self) -> ActionKind {
        match self {
            TenancyAction::Activate => ActionKind::Activate,
            TenancyAction::Terminate => ActionKind::Terminate,
            TenancyAction::Expire => ActionKind::Expire,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.action_kind().label()
    }
}

/// Apply a transition to a copy of the record. The caller persists the result
/// with a compare-and-swap against the status observed here.
pub fn apply(
    tenancy: &Tenancy,
    action: &TenancyAction,
    today: NaiveDate,
) -> Result<Tenancy, EngineError> {
    let next = match (tenancy.status, action) {
        (TenancyStatus::Pending, TenancyAction::Activate) => TenancyStatus::Active,
        (TenancyStatus::Active, TenancyAction::Terminate) => TenancyStatus::Terminated,
        (TenancyStatus::Active, TenancyAction::Expire) => {
            if today <= tenancy.lease_end {
                return Err(EngineError::IllegalTransition(format!(
                    "lease runs until {}; it cannot expire yet",
                    tenancy.lease_end
                )));
            }
            TenancyStatus::Expired
        }
        (current, action) => {
            return Err(EngineError::IllegalTransition(format!(
                "cannot {} a {} tenancy",
                action.label(),
                current.label()
            )))
        }
    };

    let mut updated = tenancy.clone();
    updated.status = next;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use crate::domain::{PropertyId, TenancyId, UserId};

    use super::*;

    fn tenancy(status: TenancyStatus) -> Tenancy {
        Tenancy {
            id: TenancyId::from("t-1"),
            property: PropertyId::from("p-1"),
            tenant: UserId::from("tenant-1"),
            status,
            lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
            lease_end: NaiveDate::from_ymd_opt(2026, 6, 30).expect("valid"),
            rent_cents: 95_000,
        }
    }

    #[test]
    fn pending_activates_and_active_terminates() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid");
        let active = apply(&tenancy(TenancyStatus::Pending), &TenancyAction::Activate, today)
            .expect("activation allowed");
        assert_eq!(active.status, TenancyStatus::Active);

        let terminated = apply(&active, &TenancyAction::Terminate, today).expect("termination");
        assert_eq!(terminated.status, TenancyStatus::Terminated);
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid");
        for status in [TenancyStatus::Expired, TenancyStatus::Terminated] {
            let error = apply(&tenancy(status), &TenancyAction::Activate, today)
                .expect_err("terminal state frozen");
            assert!(matches!(error, EngineError::IllegalTransition(_)));
        }
    }

    #[test]
    fn expiry_waits_for_the_lease_end() {
        let during = NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid");
        let error = apply(&tenancy(TenancyStatus::Active), &TenancyAction::Expire, during)
            .expect_err("lease still running");
        assert!(matches!(error, EngineError::IllegalTransition(_)));

        let after = NaiveDate::from_ymd_opt(2026, 7, 1).expect("valid");
        let expired = apply(&tenancy(TenancyStatus::Active), &TenancyAction::Expire, after)
            .expect("lease over");
        assert_eq!(expired.status, TenancyStatus::Expired);
    }
}
