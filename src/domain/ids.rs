use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_type!(
    /// Identifier wrapper for organizations.
    OrgId
);
id_type!(
    /// Identifier wrapper for user accounts.
    UserId
);
id_type!(PropertyId);
id_type!(TenancyId);
id_type!(HouseholdMemberId);
id_type!(PaymentId);
id_type!(SplitPaymentId);
id_type!(DisputeId);
id_type!(MaintenanceRequestId);
id_type!(SupportTicketId);
id_type!(DocumentId);
id_type!(NotificationId);
