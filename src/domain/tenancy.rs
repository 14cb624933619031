use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{HouseholdMemberId, PropertyId, TenancyId, UserId};
use super::payment::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenancyStatus {
    Pending,
    Active,
    Expired,
    Terminated,
}

impl TenancyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TenancyStatus::Pending => "pending",
            TenancyStatus::Active => "active",
            TenancyStatus::Expired => "expired",
            TenancyStatus::Terminated => "terminated",
        }
    }

    /// Terminal states accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, TenancyStatus::Expired | TenancyStatus::Terminated)
    }
}

/// A lease binding a primary tenant to a property. At most one tenancy per
/// property may be `active` at a time; the store enforces that within the
/// activation write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenancy {
    pub id: TenancyId,
    pub property: PropertyId,
    pub tenant: UserId,
    pub status: TenancyStatus,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub rent_cents: Cents,
}

/// Occupant record granting a non-primary user access to a tenancy. The
/// primary tenant appears both as `Tenancy::tenant` and as a row flagged
/// `is_primary_tenant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub id: HouseholdMemberId,
    pub tenancy: TenancyId,
    pub user: UserId,
    pub is_primary_tenant: bool,
    pub role_in_household: String,
}
