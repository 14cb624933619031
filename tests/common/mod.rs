#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;

use leaseguard::clock::FixedClock;
use leaseguard::domain::{
    HouseholdMember, HouseholdMemberId, Organization, OrgId, Property, PropertyId, PropertyStatus,
    Role, SubscriptionTier, Tenancy, TenancyId, TenancyStatus, User, UserId,
};
use leaseguard::engine::Engine;
use leaseguard::notify::RecordingSink;
use leaseguard::storage::{EngineStore, InMemoryStore};

pub type TestEngine = Engine<InMemoryStore, RecordingSink, FixedClock>;

pub const LANDLORD: &str = "landlord-lena";
pub const OTHER_LANDLORD: &str = "landlord-luis";
pub const TENANT: &str = "tenant-jordan";
pub const HOUSEMATE: &str = "member-morgan";
pub const STAFF: &str = "staff-sam";
pub const SUPPORT: &str = "support-sage";
pub const ADMIN: &str = "admin-ada";

pub const PROPERTY: &str = "p-main";
pub const OTHER_PROPERTY: &str = "p-other";
pub const TENANCY: &str = "t-main";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date")
}

pub fn uid(id: &str) -> UserId {
    UserId::from(id)
}

fn user(id: &str, role: Role, organization: Option<&str>) -> User {
    User {
        id: UserId::from(id),
        role,
        organization: organization.map(OrgId::from),
        display_name: id.to_string(),
        email: format!("{id}@example.com"),
    }
}

/// One landlord with an active tenancy (primary tenant plus one housemate),
/// a second unrelated landlord, and platform staff.
pub fn engine() -> (TestEngine, Arc<InMemoryStore>, Arc<RecordingSink>) {
    let store = Arc::new(InMemoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let clock = Arc::new(FixedClock::on(today()));

    store
        .insert_organization(Organization {
            id: OrgId::from("org-brightside"),
            name: "Brightside Lettings".to_string(),
            tier: SubscriptionTier::Professional,
        })
        .expect("organization seeded");

    for seeded in [
        user(LANDLORD, Role::Landlord, Some("org-brightside")),
        user(OTHER_LANDLORD, Role::Landlord, None),
        user(TENANT, Role::Tenant, None),
        user(HOUSEMATE, Role::Tenant, None),
        user(STAFF, Role::Maintenance, None),
        user(SUPPORT, Role::Support, Some("org-brightside")),
        user(ADMIN, Role::Admin, Some("org-brightside")),
    ] {
        store.insert_user(seeded).expect("user seeded");
    }

    store
        .insert_property(Property {
            id: PropertyId::from(PROPERTY),
            landlord: uid(LANDLORD),
            organization: Some(OrgId::from("org-brightside")),
            address: "12 Harbor Row".to_string(),
            status: PropertyStatus::Available,
        })
        .expect("property seeded");
    store
        .insert_property(Property {
            id: PropertyId::from(OTHER_PROPERTY),
            landlord: uid(OTHER_LANDLORD),
            organization: None,
            address: "77 Quarry St".to_string(),
            status: PropertyStatus::Available,
        })
        .expect("property seeded");

    store
        .insert_tenancy(Tenancy {
            id: TenancyId::from(TENANCY),
            property: PropertyId::from(PROPERTY),
            tenant: uid(TENANT),
            status: TenancyStatus::Active,
            lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid"),
            lease_end: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid"),
            rent_cents: 120_000,
        })
        .expect("tenancy seeded");

    store
        .insert_household_member(HouseholdMember {
            id: HouseholdMemberId::from("hm-jordan"),
            tenancy: TenancyId::from(TENANCY),
            user: uid(TENANT),
            is_primary_tenant: true,
            role_in_household: "primary".to_string(),
        })
        .expect("member seeded");
    store
        .insert_household_member(HouseholdMember {
            id: HouseholdMemberId::from("hm-morgan"),
            tenancy: TenancyId::from(TENANCY),
            user: uid(HOUSEMATE),
            is_primary_tenant: false,
            role_in_household: "partner".to_string(),
        })
        .expect("member seeded");

    let engine = Engine::new(Arc::clone(&store), Arc::clone(&sink), clock);
    (engine, store, sink)
}

/// Deliveries recorded for one recipient since the sink was last inspected.
pub fn deliveries_for(sink: &RecordingSink, recipient: &str) -> usize {
    sink.sent()
        .iter()
        .filter(|target| target.recipient == uid(recipient))
        .count()
}
