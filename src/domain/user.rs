use serde::{Deserialize, Serialize};

use super::ids::{OrgId, UserId};

/// Platform roles. A user acts under exactly one role per request context,
/// even though the same person may be a household member of one tenancy and
/// the landlord of another; relationships are resolved per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tenant,
    Landlord,
    Admin,
    Support,
    Maintenance,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Tenant => "tenant",
            Role::Landlord => "landlord",
            Role::Admin => "admin",
            Role::Support => "support",
            Role::Maintenance => "maintenance",
        }
    }
}

/// Subscription tier attached to an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub tier: SubscriptionTier,
}

/// A platform account. `organization` is populated for staff and landlords
/// operating under an organization umbrella.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub organization: Option<OrgId>,
    pub display_name: String,
    pub email: String,
}
