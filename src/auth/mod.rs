//! Authorization layers: principal resolution, relationship fact evaluation,
//! and the declarative permission policy consumed by the engine.

pub mod policy;
pub mod principal;
pub mod relationship;

pub use policy::{authorize, ActionKind, Decision, PolicyRule, Requirement, ResourceType, POLICY};
pub use principal::{resolve_principal, IdentityResolver, Principal};
pub use relationship::{RelationshipEvaluator, RelationshipFacts};
