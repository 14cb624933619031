use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{HouseholdMemberId, PaymentId, SplitPaymentId, TenancyId};

/// Monetary amounts are carried as integer cents.
pub type Cents = i64;

/// Tolerance for the split-sum invariant; rounding a three-way split of an
/// odd amount may leave the parts one cent off the total.
pub const SPLIT_SUM_EPSILON_CENTS: Cents = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Scheduled,
    Paid,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Scheduled => "scheduled",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// A rent obligation due against a tenancy. Manual `paid` overrides append to
/// `audit_notes`; the gateway confirmation path leaves its own marker there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub tenancy: TenancyId,
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub audit_notes: Vec<String>,
}

/// One household member's share of a payment. Shares are created as a batch
/// whose amounts must sum to the parent payment amount within
/// [`SPLIT_SUM_EPSILON_CENTS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPayment {
    pub id: SplitPaymentId,
    pub payment: PaymentId,
    pub member: HouseholdMemberId,
    pub amount_cents: Cents,
    pub status: PaymentStatus,
}
