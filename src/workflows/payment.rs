use serde::{Deserialize, Serialize};

use crate::auth::ActionKind;
use crate::domain::{Payment, PaymentStatus};
use crate::error::EngineError;

/// Payment transitions. `paid` is terminal and reachable either through the
/// gateway confirmation path or a manual landlord/admin override, which must
/// leave an audit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentAction {
    Schedule,
    MarkPaid {
        via_gateway: bool,
        audit_note: Option<String>,
    },
}

impl PaymentAction {
    pub const fn action_kind(&self) -> ActionKind {
        match self {
            PaymentAction::Schedule => ActionKind::Schedule,
            PaymentAction::MarkPaid { .. } => ActionKind::MarkPaid,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.action_kind().label()
    }
}

pub fn apply(payment: &Payment, action: &PaymentAction) -> Result<Payment, EngineError> {
    let mut updated = payment.clone();

    match (payment.status, action) {
        (PaymentStatus::Pending, PaymentAction::Schedule) => {
            updated.status = PaymentStatus::Scheduled;
        }
        (
            PaymentStatus::Pending | PaymentStatus::Scheduled,
            PaymentAction::MarkPaid {
                via_gateway,
                audit_note,
            },
        ) => {
            if *via_gateway {
                updated
                    .audit_notes
                    .push("confirmed by payment gateway".to_string());
            } else {
                let note = audit_note
                    .as_deref()
                    .map(str::trim)
                    .filter(|note| !note.is_empty())
                    .ok_or_else(|| {
                        EngineError::InvariantViolation(
                            "manual paid override requires an audit note".to_string(),
                        )
                    })?;
                updated.audit_notes.push(format!("manual override: {note}"));
            }
            updated.status = PaymentStatus::Paid;
        }
        (current, action) => {
            return Err(EngineError::IllegalTransition(format!(
                "cannot {} a {} payment",
                action.label(),
                current.label()
            )))
        }
    }

    Ok(updated)
}
