use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;

use leaseguard::clock::FixedClock;
use leaseguard::domain::{HouseholdMemberId, PropertyId, TenancyId, UserId};
use leaseguard::engine::{NewMaintenanceRequest, NewPayment, NewSplitPayment};
use leaseguard::notify::RecordingSink;
use leaseguard::storage::InMemoryStore;
use leaseguard::workflows::MaintenanceAction;
use leaseguard::Engine;

use crate::error::ApiError;
use crate::infra::seed_demo_portfolio;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pin the demo calendar (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Walk the maintenance and rent-split scenarios against an in-memory engine,
/// printing who was allowed to do what and who got notified.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), ApiError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::new(
        Arc::clone(&store),
        Arc::clone(&sink),
        Arc::new(FixedClock::on(today)),
    );
    seed_demo_portfolio(&store).map_err(|error| {
        ApiError::Io(std::io::Error::new(std::io::ErrorKind::Other, error.to_string()))
    })?;

    let landlord = UserId::from("landlord-lena");
    let tenant = UserId::from("tenant-jordan");
    let staff = UserId::from("staff-sam");
    let tenancy = TenancyId::from("t-harbor-row");

    println!("Authorization and workflow engine demo ({today})");
    println!("\nMaintenance: kitchen leak at 12 Harbor Row");

    let request = match engine.create_maintenance_request(
        &tenant,
        NewMaintenanceRequest {
            tenancy: tenancy.clone(),
            title: "Kitchen pipe leaking".to_string(),
        },
    ) {
        Ok(request) => request,
        Err(error) => {
            println!("  report rejected: {error}");
            return Ok(());
        }
    };
    println!("- {tenant} reported the leak -> {}", request.status.label());

    match engine.transition_maintenance_request(
        &landlord,
        &request.id,
        MaintenanceAction::Assign {
            assignee: staff.clone(),
            estimated_cost_cents: Some(18_000),
            scheduled_date: today + chrono::Duration::days(3),
        },
    ) {
        Ok(scheduled) => println!(
            "- {landlord} assigned {staff} -> {}",
            scheduled.status.label()
        ),
        Err(error) => println!("  assignment rejected: {error}"),
    }
    if let Err(error) =
        engine.transition_maintenance_request(&staff, &request.id, MaintenanceAction::StartWork)
    {
        println!("  start rejected: {error}");
    }
    match engine.transition_maintenance_request(
        &staff,
        &request.id,
        MaintenanceAction::Complete {
            notes: "Replaced the trap seal".to_string(),
        },
    ) {
        Ok(completed) => println!("- {staff} completed the job -> {}", completed.status.label()),
        Err(error) => println!("  completion rejected: {error}"),
    }

    // A deliberate denial to show the policy at work.
    if let Err(error) = engine.delete_property(&tenant, &PropertyId::from("p-harbor-row")) {
        println!("- {tenant} tried to delete the property: {error}");
    }

    println!("\nRent split for July");
    let payment = match engine.create_payment(
        &landlord,
        NewPayment {
            tenancy,
            amount_cents: 120_000,
            due_date: today + chrono::Duration::days(14),
        },
    ) {
        Ok(payment) => payment,
        Err(error) => {
            println!("  payment rejected: {error}");
            return Ok(());
        }
    };
    match engine.create_split_payments(
        &tenant,
        &payment.id,
        vec![
            NewSplitPayment {
                member: HouseholdMemberId::from("hm-jordan"),
                amount_cents: 60_000,
            },
            NewSplitPayment {
                member: HouseholdMemberId::from("hm-morgan"),
                amount_cents: 60_000,
            },
        ],
    ) {
        Ok(splits) => println!("- {tenant} split the rent into {} shares", splits.len()),
        Err(error) => println!("  split rejected: {error}"),
    }
    match engine.confirm_payment_gateway(&payment.id) {
        Ok(paid) => println!("- gateway confirmed -> {}", paid.status.label()),
        Err(error) => println!("  confirmation failed: {error}"),
    }

    println!("\nDeliveries");
    for target in sink.sent() {
        println!(
            "- to {} [{}]: {}",
            target.recipient,
            target.priority.label(),
            target.title
        );
    }

    Ok(())
}
