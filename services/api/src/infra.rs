use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use leaseguard::auth::IdentityResolver;
use leaseguard::clock::SystemClock;
use leaseguard::domain::{
    HouseholdMember, HouseholdMemberId, Organization, OrgId, Property, PropertyId, PropertyStatus,
    Role, SubscriptionTier, Tenancy, TenancyId, TenancyStatus, User, UserId,
};
use leaseguard::notify::{NotificationSink, NotificationTarget, SinkError};
use leaseguard::storage::{EngineStore, InMemoryStore, StoreError};
use leaseguard::{Engine, EngineError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sink that surfaces deliveries on the service log. Stands in for the push
/// transport until one is wired up.
#[derive(Debug, Default, Clone)]
pub(crate) struct TracingSink;

impl NotificationSink for TracingSink {
    fn send(&self, target: NotificationTarget) -> Result<(), SinkError> {
        info!(
            recipient = %target.recipient,
            priority = target.priority.label(),
            title = %target.title,
            "notification delivered"
        );
        Ok(())
    }
}

pub(crate) type ApiEngine = Engine<InMemoryStore, TracingSink, SystemClock>;

/// Trusted-header identity scheme: the fronting proxy authenticates the user
/// and forwards the account id verbatim.
#[derive(Debug, Default, Clone)]
pub(crate) struct HeaderIdentity;

impl IdentityResolver for HeaderIdentity {
    fn resolve(&self, credential: &str) -> Result<UserId, EngineError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(EngineError::Unauthorized(
                "empty identity credential".to_string(),
            ));
        }
        Ok(UserId::from(credential))
    }
}

fn user(id: &str, role: Role, organization: Option<&str>, name: &str) -> User {
    User {
        id: UserId::from(id),
        role,
        organization: organization.map(OrgId::from),
        display_name: name.to_string(),
        email: format!("{id}@example.com"),
    }
}

/// Seed a small portfolio so the service answers requests out of the box: one
/// organization, a landlord with an occupied property, the household behind
/// it, and platform staff.
pub(crate) fn seed_demo_portfolio(store: &InMemoryStore) -> Result<(), StoreError> {
    store.insert_organization(Organization {
        id: OrgId::from("org-brightside"),
        name: "Brightside Lettings".to_string(),
        tier: SubscriptionTier::Professional,
    })?;

    for seeded in [
        user("landlord-lena", Role::Landlord, Some("org-brightside"), "Lena Alvarez"),
        user("tenant-jordan", Role::Tenant, None, "Jordan Blake"),
        user("member-morgan", Role::Tenant, None, "Morgan Reyes"),
        user("staff-sam", Role::Maintenance, None, "Sam Okafor"),
        user("support-sage", Role::Support, Some("org-brightside"), "Sage Lindqvist"),
        user("admin-ada", Role::Admin, Some("org-brightside"), "Ada Moreau"),
    ] {
        store.insert_user(seeded)?;
    }

    store.insert_property(Property {
        id: PropertyId::from("p-harbor-row"),
        landlord: UserId::from("landlord-lena"),
        organization: Some(OrgId::from("org-brightside")),
        address: "12 Harbor Row".to_string(),
        status: PropertyStatus::Available,
    })?;

    store.insert_tenancy(Tenancy {
        id: TenancyId::from("t-harbor-row"),
        property: PropertyId::from("p-harbor-row"),
        tenant: UserId::from("tenant-jordan"),
        status: TenancyStatus::Active,
        lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
        lease_end: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap_or_default(),
        rent_cents: 120_000,
    })?;

    store.insert_household_member(HouseholdMember {
        id: HouseholdMemberId::from("hm-jordan"),
        tenancy: TenancyId::from("t-harbor-row"),
        user: UserId::from("tenant-jordan"),
        is_primary_tenant: true,
        role_in_household: "primary".to_string(),
    })?;
    store.insert_household_member(HouseholdMember {
        id: HouseholdMemberId::from("hm-morgan"),
        tenancy: TenancyId::from("t-harbor-row"),
        user: UserId::from("member-morgan"),
        is_primary_tenant: false,
        role_in_household: "partner".to_string(),
    })?;

    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
