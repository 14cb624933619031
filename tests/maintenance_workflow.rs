//! The kitchen-leak scenario end to end: request, assignment, work, and
//! completion, with exactly the expected notification at each step.

mod common;

use common::*;

use chrono::NaiveDate;

use leaseguard::domain::{MaintenanceStatus, TenancyId};
use leaseguard::engine::NewMaintenanceRequest;
use leaseguard::workflows::MaintenanceAction;
use leaseguard::EngineError;

fn assign_to_staff() -> MaintenanceAction {
    MaintenanceAction::Assign {
        assignee: uid(STAFF),
        estimated_cost_cents: Some(18_000),
        scheduled_date: NaiveDate::from_ymd_opt(2026, 6, 18).expect("valid"),
    }
}

#[test]
fn leak_request_runs_from_report_to_completion() {
    let (engine, _, sink) = engine();

    let request = engine
        .create_maintenance_request(
            &uid(TENANT),
            NewMaintenanceRequest {
                tenancy: TenancyId::from(TENANCY),
                title: "Kitchen pipe leaking".to_string(),
            },
        )
        .expect("tenant reports the leak");
    assert_eq!(request.status, MaintenanceStatus::Pending);
    // The report reaches the landlord and nobody else.
    assert_eq!(deliveries_for(&sink, LANDLORD), 1);
    assert_eq!(deliveries_for(&sink, TENANT), 0);

    let scheduled = engine
        .transition_maintenance_request(&uid(LANDLORD), &request.id, assign_to_staff())
        .expect("landlord assigns staff");
    assert_eq!(scheduled.status, MaintenanceStatus::Scheduled);
    assert_eq!(scheduled.assignee, Some(uid(STAFF)));
    assert_eq!(
        scheduled.scheduled_date,
        NaiveDate::from_ymd_opt(2026, 6, 18)
    );
    // Assignment speaks only to the assignee.
    assert_eq!(deliveries_for(&sink, STAFF), 1);
    assert_eq!(deliveries_for(&sink, TENANT), 0);
    assert_eq!(deliveries_for(&sink, LANDLORD), 1);

    let in_progress = engine
        .transition_maintenance_request(&uid(STAFF), &request.id, MaintenanceAction::StartWork)
        .expect("assignee starts work");
    assert_eq!(in_progress.status, MaintenanceStatus::InProgress);

    let before_completion_tenant = deliveries_for(&sink, TENANT);
    let before_completion_landlord = deliveries_for(&sink, LANDLORD);
    let completed = engine
        .transition_maintenance_request(
            &uid(STAFF),
            &request.id,
            MaintenanceAction::Complete {
                notes: "Replaced the trap seal".to_string(),
            },
        )
        .expect("assignee completes");
    assert_eq!(completed.status, MaintenanceStatus::Completed);
    assert_eq!(completed.completion_notes.as_deref(), Some("Replaced the trap seal"));
    assert!(completed.completed_at.is_some());
    // Completion notifies requester and landlord exactly once each.
    assert_eq!(deliveries_for(&sink, TENANT), before_completion_tenant + 1);
    assert_eq!(
        deliveries_for(&sink, LANDLORD),
        before_completion_landlord + 1
    );
    assert_eq!(deliveries_for(&sink, STAFF), 1);
}

#[test]
fn staff_cannot_assign_and_outsiders_cannot_report() {
    let (engine, _, _) = engine();

    let request = engine
        .create_maintenance_request(
            &uid(HOUSEMATE),
            NewMaintenanceRequest {
                tenancy: TenancyId::from(TENANCY),
                title: "Radiator cold".to_string(),
            },
        )
        .expect("household member reports");

    let error = engine
        .transition_maintenance_request(&uid(STAFF), &request.id, assign_to_staff())
        .expect_err("maintenance staff cannot self-assign");
    assert!(matches!(error, EngineError::Unauthorized(_)));

    let foreign = engine.create_maintenance_request(
        &uid(OTHER_LANDLORD),
        NewMaintenanceRequest {
            tenancy: TenancyId::from(TENANCY),
            title: "Unrelated".to_string(),
        },
    );
    assert!(matches!(foreign, Err(EngineError::Unauthorized(_))));
}

#[test]
fn assignment_requires_a_known_assignee_and_pending_status() {
    let (engine, _, _) = engine();

    let request = engine
        .create_maintenance_request(
            &uid(TENANT),
            NewMaintenanceRequest {
                tenancy: TenancyId::from(TENANCY),
                title: "Door lock jams".to_string(),
            },
        )
        .expect("tenant reports");

    let ghost = engine.transition_maintenance_request(
        &uid(LANDLORD),
        &request.id,
        MaintenanceAction::Assign {
            assignee: uid("nobody"),
            estimated_cost_cents: None,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 6, 20).expect("valid"),
        },
    );
    assert!(matches!(ghost, Err(EngineError::NotFound(_))));

    engine
        .transition_maintenance_request(&uid(LANDLORD), &request.id, assign_to_staff())
        .expect("assignment");
    let again = engine.transition_maintenance_request(
        &uid(LANDLORD),
        &request.id,
        assign_to_staff(),
    );
    assert!(matches!(again, Err(EngineError::IllegalTransition(_))));
}

#[test]
fn cancellation_is_allowed_until_completion() {
    let (engine, _, _) = engine();

    let request = engine
        .create_maintenance_request(
            &uid(TENANT),
            NewMaintenanceRequest {
                tenancy: TenancyId::from(TENANCY),
                title: "Window stuck".to_string(),
            },
        )
        .expect("tenant reports");

    let cancelled = engine
        .transition_maintenance_request(&uid(TENANT), &request.id, MaintenanceAction::Cancel)
        .expect("requester withdraws");
    assert_eq!(cancelled.status, MaintenanceStatus::Cancelled);

    let error = engine
        .transition_maintenance_request(&uid(LANDLORD), &request.id, assign_to_staff())
        .expect_err("cancelled request is terminal");
    assert!(matches!(error, EngineError::IllegalTransition(_)));
}
