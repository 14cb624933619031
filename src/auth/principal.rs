use crate::domain::{OrgId, Role, UserId};
use crate::error::EngineError;
use crate::storage::EngineStore;

/// The authenticated actor behind a request: a user id plus the role and
/// organization facts resolved from storage. Role is fixed for the lifetime
/// of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub organization: Option<OrgId>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Session collaborator boundary: maps an opaque credential to an already
/// authenticated user id. The engine trusts this resolution and never
/// re-derives identity.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, credential: &str) -> Result<UserId, EngineError>;
}

/// Load the acting user's role and organization membership for relationship
/// checks. A credential naming a user the store does not know is a deny, not
/// a lookup error.
pub fn resolve_principal<S: EngineStore>(
    store: &S,
    user_id: &UserId,
) -> Result<Principal, EngineError> {
    let user = store
        .user(user_id)
        .map_err(|error| error.into_engine("user"))?
        .ok_or_else(|| {
            EngineError::Unauthorized(format!("unknown principal '{user_id}'"))
        })?;

    Ok(Principal {
        user_id: user.id,
        role: user.role,
        organization: user.organization,
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::User;
    use crate::storage::InMemoryStore;

    use super::*;

    #[test]
    fn resolves_role_and_organization_from_store() {
        let store = InMemoryStore::new();
        store
            .insert_user(User {
                id: UserId::from("landlord-1"),
                role: Role::Landlord,
                organization: Some(OrgId::from("org-1")),
                display_name: "Lena".to_string(),
                email: "lena@example.com".to_string(),
            })
            .expect("user inserted");

        let principal =
            resolve_principal(&store, &UserId::from("landlord-1")).expect("principal resolves");
        assert_eq!(principal.role, Role::Landlord);
        assert_eq!(principal.organization, Some(OrgId::from("org-1")));
        assert!(!principal.is_admin());
    }

    #[test]
    fn unknown_user_is_unauthorized() {
        let store = InMemoryStore::new();
        let error =
            resolve_principal(&store, &UserId::from("ghost")).expect_err("unknown user denied");
        assert!(matches!(error, EngineError::Unauthorized(_)));
    }
}
