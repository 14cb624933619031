use serde::{Deserialize, Serialize};

use crate::domain::Role;

use super::principal::Principal;
use super::relationship::RelationshipFacts;

/// Resource families covered by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Property,
    Tenancy,
    HouseholdMember,
    Payment,
    SplitPayment,
    Dispute,
    MaintenanceRequest,
    SupportTicket,
    Document,
    Notification,
}

impl ResourceType {
    pub const ALL: [ResourceType; 10] = [
        ResourceType::Property,
        ResourceType::Tenancy,
        ResourceType::HouseholdMember,
        ResourceType::Payment,
        ResourceType::SplitPayment,
        ResourceType::Dispute,
        ResourceType::MaintenanceRequest,
        ResourceType::SupportTicket,
        ResourceType::Document,
        ResourceType::Notification,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ResourceType::Property => "property",
            ResourceType::Tenancy => "tenancy",
            ResourceType::HouseholdMember => "household_member",
            ResourceType::Payment => "payment",
            ResourceType::SplitPayment => "split_payment",
            ResourceType::Dispute => "dispute",
            ResourceType::MaintenanceRequest => "maintenance_request",
            ResourceType::SupportTicket => "support_ticket",
            ResourceType::Document => "document",
            ResourceType::Notification => "notification",
        }
    }
}

/// Every action the engine can be asked to authorize, across all resource
/// types. Workflow transitions are ordinary actions here; the state machines
/// separately decide whether the edge exists for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Read,
    List,
    Create,
    Update,
    Delete,
    AddMember,
    RemoveMember,
    Activate,
    Terminate,
    Expire,
    StartProgress,
    Resolve,
    Close,
    Assign,
    StartWork,
    Complete,
    Cancel,
    Triage,
    Wait,
    Resume,
    Reopen,
    Schedule,
    MarkPaid,
}

impl ActionKind {
    pub const ALL: [ActionKind; 23] = [
        ActionKind::Read,
        ActionKind::List,
        ActionKind::Create,
        ActionKind::Update,
        ActionKind::Delete,
        ActionKind::AddMember,
        ActionKind::RemoveMember,
        ActionKind::Activate,
        ActionKind::Terminate,
        ActionKind::Expire,
        ActionKind::StartProgress,
        ActionKind::Resolve,
        ActionKind::Close,
        ActionKind::Assign,
        ActionKind::StartWork,
        ActionKind::Complete,
        ActionKind::Cancel,
        ActionKind::Triage,
        ActionKind::Wait,
        ActionKind::Resume,
        ActionKind::Reopen,
        ActionKind::Schedule,
        ActionKind::MarkPaid,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ActionKind::Read => "read",
            ActionKind::List => "list",
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
            ActionKind::AddMember => "add_member",
            ActionKind::RemoveMember => "remove_member",
            ActionKind::Activate => "activate",
            ActionKind::Terminate => "terminate",
            ActionKind::Expire => "expire",
            ActionKind::StartProgress => "start_progress",
            ActionKind::Resolve => "resolve",
            ActionKind::Close => "close",
            ActionKind::Assign => "assign",
            ActionKind::StartWork => "start_work",
            ActionKind::Complete => "complete",
            ActionKind::Cancel => "cancel",
            ActionKind::Triage => "triage",
            ActionKind::Wait => "wait",
            ActionKind::Resume => "resume",
            ActionKind::Reopen => "reopen",
            ActionKind::Schedule => "schedule",
            ActionKind::MarkPaid => "mark_paid",
        }
    }
}

/// One grantable condition. Each variant encodes its own conjunction (e.g.
/// `OwnerLandlord` is role landlord AND owning relationship); a rule allows
/// the action when ANY of its requirements is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Principal role is admin.
    Admin,
    /// Resource-specific owner relationship (landlord of the backing
    /// property, document uploader, ticket owner, notification recipient).
    Owner,
    /// Owner relationship held specifically under the landlord role.
    OwnerLandlord,
    /// Tenant side of the tenancy behind the resource.
    Counterparty,
    /// Any household member of the backing tenancy.
    HouseholdMember,
    /// Household member flagged as the primary tenant.
    PrimaryHouseholdMember,
    /// Current assignee of the resource.
    Assignee,
    /// Principal holds the given role, regardless of relationship.
    RoleIs(Role),
    /// Principal belongs to the same organization as the resource.
    SameOrganization,
    /// Any resolved principal.
    Authenticated,
}

impl Requirement {
    fn satisfied(self, principal: &Principal, facts: &RelationshipFacts) -> bool {
        match self {
            Requirement::Admin => facts.is_admin,
            Requirement::Owner => facts.is_owner,
            Requirement::OwnerLandlord => principal.role == Role::Landlord && facts.is_owner,
            Requirement::Counterparty => facts.is_counterparty,
            Requirement::HouseholdMember => facts.is_household_member,
            Requirement::PrimaryHouseholdMember => {
                facts.is_household_member && facts.is_primary_tenant
            }
            Requirement::Assignee => facts.is_assignee,
            Requirement::RoleIs(role) => principal.role == role,
            Requirement::SameOrganization => facts.same_organization,
            Requirement::Authenticated => true,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Requirement::Admin => "an admin",
            Requirement::Owner => "the resource owner",
            Requirement::OwnerLandlord => "the landlord who owns this property",
            Requirement::Counterparty => "the tenant of this tenancy",
            Requirement::HouseholdMember => "a household member",
            Requirement::PrimaryHouseholdMember => "the primary tenant",
            Requirement::Assignee => "the assignee",
            Requirement::RoleIs(Role::Tenant) => "a tenant",
            Requirement::RoleIs(Role::Landlord) => "a landlord",
            Requirement::RoleIs(Role::Admin) => "an admin",
            Requirement::RoleIs(Role::Support) => "support staff",
            Requirement::RoleIs(Role::Maintenance) => "maintenance staff",
            Requirement::SameOrganization => "staff of the owning organization",
            Requirement::Authenticated => "any signed-in user",
        }
    }
}

/// A policy table row: the action is allowed when any listed requirement
/// holds.
#[derive(Debug, Clone, Copy)]
pub struct PolicyRule {
    pub resource: ResourceType,
    pub action: ActionKind,
    pub any_of: &'static [Requirement],
}

use ActionKind as A;
use Requirement as R;
use ResourceType as RT;

/// The full permission policy. Any `(resource, action)` pair absent from
/// this table is denied.
pub const POLICY: &[PolicyRule] = &[
    // Properties.
    PolicyRule {
        resource: RT::Property,
        action: A::Read,
        any_of: &[
            R::Owner,
            R::Counterparty,
            R::HouseholdMember,
            R::SameOrganization,
            R::Admin,
        ],
    },
    PolicyRule {
        resource: RT::Property,
        action: A::List,
        any_of: &[R::RoleIs(Role::Landlord), R::Admin],
    },
    PolicyRule {
        resource: RT::Property,
        action: A::Create,
        any_of: &[R::RoleIs(Role::Landlord), R::Admin],
    },
    PolicyRule {
        resource: RT::Property,
        action: A::Update,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Property,
        action: A::Delete,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    // Tenancies. Tenants are never permitted direct lease-field writes.
    PolicyRule {
        resource: RT::Tenancy,
        action: A::Read,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Tenancy,
        action: A::List,
        any_of: &[R::Authenticated],
    },
    PolicyRule {
        resource: RT::Tenancy,
        action: A::Create,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Tenancy,
        action: A::Update,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Tenancy,
        action: A::Activate,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Tenancy,
        action: A::Terminate,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Tenancy,
        action: A::Expire,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    // Household members. Removing the primary tenant additionally requires
    // landlord or admin authority; the engine enforces that against the
    // target row.
    PolicyRule {
        resource: RT::HouseholdMember,
        action: A::Read,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::HouseholdMember,
        action: A::AddMember,
        any_of: &[R::OwnerLandlord, R::PrimaryHouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::HouseholdMember,
        action: A::RemoveMember,
        any_of: &[R::OwnerLandlord, R::PrimaryHouseholdMember, R::Admin],
    },
    // Payments.
    PolicyRule {
        resource: RT::Payment,
        action: A::Read,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Payment,
        action: A::List,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Payment,
        action: A::Create,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Payment,
        action: A::Schedule,
        any_of: &[R::Counterparty, R::HouseholdMember, R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Payment,
        action: A::MarkPaid,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    // Split payments.
    PolicyRule {
        resource: RT::SplitPayment,
        action: A::Read,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::SplitPayment,
        action: A::Create,
        any_of: &[R::Counterparty, R::HouseholdMember, R::OwnerLandlord, R::Admin],
    },
    // Disputes. Household members may open disputes, matching maintenance
    // request eligibility.
    PolicyRule {
        resource: RT::Dispute,
        action: A::Read,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Dispute,
        action: A::List,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Dispute,
        action: A::Create,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Dispute,
        action: A::StartProgress,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Dispute,
        action: A::Resolve,
        any_of: &[R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Dispute,
        action: A::Close,
        any_of: &[R::Owner, R::Counterparty, R::Admin],
    },
    // Maintenance requests.
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::Read,
        any_of: &[
            R::Owner,
            R::Counterparty,
            R::HouseholdMember,
            R::Assignee,
            R::Admin,
        ],
    },
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::List,
        any_of: &[
            R::Owner,
            R::Counterparty,
            R::HouseholdMember,
            R::Assignee,
            R::Admin,
        ],
    },
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::Create,
        any_of: &[R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::Assign,
        any_of: &[R::RoleIs(Role::Landlord), R::Admin],
    },
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::StartWork,
        any_of: &[R::Assignee, R::RoleIs(Role::Landlord), R::Admin],
    },
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::Complete,
        any_of: &[R::Assignee, R::RoleIs(Role::Landlord), R::Admin],
    },
    PolicyRule {
        resource: RT::MaintenanceRequest,
        action: A::Cancel,
        any_of: &[R::Counterparty, R::HouseholdMember, R::OwnerLandlord, R::Admin],
    },
    // Support tickets. Owner updates are additionally locked to the open
    // status by the engine once the ticket is triaged.
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Create,
        any_of: &[R::Authenticated],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Read,
        any_of: &[R::Owner, R::Assignee, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::List,
        any_of: &[R::Authenticated],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Update,
        any_of: &[R::Owner, R::Assignee, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Triage,
        any_of: &[R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::StartProgress,
        any_of: &[R::Assignee, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Wait,
        any_of: &[R::Assignee, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Resume,
        any_of: &[R::Owner, R::Assignee, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Resolve,
        any_of: &[R::Assignee, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Close,
        any_of: &[R::Owner, R::RoleIs(Role::Support), R::Admin],
    },
    PolicyRule {
        resource: RT::SupportTicket,
        action: A::Reopen,
        any_of: &[R::Owner, R::RoleIs(Role::Support), R::Admin],
    },
    // Documents. The owner fact covers both the uploader and the landlord of
    // the backing property.
    PolicyRule {
        resource: RT::Document,
        action: A::Read,
        any_of: &[R::Owner, R::Counterparty, R::HouseholdMember, R::Admin],
    },
    PolicyRule {
        resource: RT::Document,
        action: A::Create,
        any_of: &[R::Counterparty, R::HouseholdMember, R::OwnerLandlord, R::Admin],
    },
    PolicyRule {
        resource: RT::Document,
        action: A::Delete,
        any_of: &[R::Owner, R::Admin],
    },
    // Notifications are visible to their recipient only.
    PolicyRule {
        resource: RT::Notification,
        action: A::Read,
        any_of: &[R::Owner],
    },
    PolicyRule {
        resource: RT::Notification,
        action: A::List,
        any_of: &[R::Authenticated],
    },
    PolicyRule {
        resource: RT::Notification,
        action: A::Update,
        any_of: &[R::Owner],
    },
];

/// Authorization outcome. Deny carries a reason fit for the caller without
/// leaking unrelated resource data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Total decision function over the policy table: default-deny for pairs
/// without a row, requirement scan otherwise. Only server-resolved facts are
/// consulted; request payloads never reach this function.
pub fn authorize(
    principal: &Principal,
    action: ActionKind,
    resource: ResourceType,
    facts: &RelationshipFacts,
) -> Decision {
    let Some(rule) = POLICY
        .iter()
        .find(|rule| rule.resource == resource && rule.action == action)
    else {
        return Decision::Deny {
            reason: format!(
                "no policy permits {} on {}",
                action.label(),
                resource.label()
            ),
        };
    };

    if rule
        .any_of
        .iter()
        .any(|requirement| requirement.satisfied(principal, facts))
    {
        return Decision::Allow;
    }

    let expectations: Vec<&'static str> = rule
        .any_of
        .iter()
        .map(|requirement| requirement.describe())
        .collect();
    Decision::Deny {
        reason: format!(
            "only {} may {} this {}",
            expectations.join(" or "),
            action.label(),
            resource.label()
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::UserId;

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: UserId::from("user-1"),
            role,
            organization: None,
        }
    }

    fn facts() -> RelationshipFacts {
        RelationshipFacts::default()
    }

    #[test]
    fn pairs_absent_from_the_table_always_deny() {
        let admin = Principal {
            user_id: UserId::from("admin-1"),
            role: Role::Admin,
            organization: None,
        };
        let all_facts = RelationshipFacts {
            is_admin: true,
            is_owner: true,
            is_counterparty: true,
            is_household_member: true,
            is_primary_tenant: true,
            is_assignee: true,
            same_organization: true,
        };

        for resource in ResourceType::ALL {
            for action in ActionKind::ALL {
                let listed = POLICY
                    .iter()
                    .any(|rule| rule.resource == resource && rule.action == action);
                if listed {
                    continue;
                }
                let decision = authorize(&admin, action, resource, &all_facts);
                assert!(
                    !decision.is_allowed(),
                    "unlisted pair ({}, {}) must deny even with every fact set",
                    resource.label(),
                    action.label()
                );
            }
        }
    }

    #[test]
    fn tenant_counterparty_may_never_update_lease_terms() {
        let tenant = principal(Role::Tenant);
        let tenant_facts = RelationshipFacts {
            is_counterparty: true,
            is_household_member: true,
            is_primary_tenant: true,
            ..facts()
        };

        let decision = authorize(&tenant, ActionKind::Update, ResourceType::Tenancy, &tenant_facts);
        assert!(!decision.is_allowed());
    }

    #[test]
    fn owning_landlord_may_resolve_disputes_but_reporter_may_not() {
        let landlord = principal(Role::Landlord);
        let owner_facts = RelationshipFacts {
            is_owner: true,
            ..facts()
        };
        assert!(authorize(
            &landlord,
            ActionKind::Resolve,
            ResourceType::Dispute,
            &owner_facts
        )
        .is_allowed());

        let tenant = principal(Role::Tenant);
        let reporter_facts = RelationshipFacts {
            is_counterparty: true,
            ..facts()
        };
        let decision = authorize(
            &tenant,
            ActionKind::Resolve,
            ResourceType::Dispute,
            &reporter_facts,
        );
        match decision {
            Decision::Deny { reason } => assert!(reason.contains("landlord")),
            Decision::Allow => panic!("reporter must not resolve a dispute"),
        }
    }

    #[test]
    fn household_members_may_open_disputes_and_maintenance_requests() {
        let member = principal(Role::Tenant);
        let member_facts = RelationshipFacts {
            is_household_member: true,
            ..facts()
        };

        assert!(authorize(
            &member,
            ActionKind::Create,
            ResourceType::Dispute,
            &member_facts
        )
        .is_allowed());
        assert!(authorize(
            &member,
            ActionKind::Create,
            ResourceType::MaintenanceRequest,
            &member_facts
        )
        .is_allowed());
    }

    #[test]
    fn non_owner_landlord_cannot_terminate_a_tenancy() {
        let landlord = principal(Role::Landlord);
        let decision = authorize(
            &landlord,
            ActionKind::Terminate,
            ResourceType::Tenancy,
            &facts(),
        );
        assert!(!decision.is_allowed());
    }

    #[test]
    fn admin_fact_grants_listed_rows_without_relationships() {
        let admin = Principal {
            user_id: UserId::from("admin-1"),
            role: Role::Admin,
            organization: None,
        };
        let admin_facts = RelationshipFacts {
            is_admin: true,
            ..facts()
        };

        assert!(authorize(
            &admin,
            ActionKind::Terminate,
            ResourceType::Tenancy,
            &admin_facts
        )
        .is_allowed());
        assert!(authorize(
            &admin,
            ActionKind::Resolve,
            ResourceType::Dispute,
            &admin_facts
        )
        .is_allowed());
    }
}
