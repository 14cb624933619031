use serde::{Deserialize, Serialize};

use super::ids::{OrgId, PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Occupied,
    Maintenance,
    Unavailable,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Occupied => "occupied",
            PropertyStatus::Maintenance => "maintenance",
            PropertyStatus::Unavailable => "unavailable",
        }
    }
}

/// A rentable unit owned by a landlord user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub landlord: UserId,
    pub organization: Option<OrgId>,
    pub address: String,
    pub status: PropertyStatus,
}
