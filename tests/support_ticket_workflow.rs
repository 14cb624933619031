//! Support ticket lifecycle: triage assignment, the waiting loop, owner edit
//! locking, and reopen.

mod common;

use common::*;

use leaseguard::domain::{SupportCategory, SupportPriority, SupportTicketStatus};
use leaseguard::engine::NewSupportTicket;
use leaseguard::workflows::SupportAction;
use leaseguard::EngineError;

fn billing_ticket(engine: &TestEngine, owner: &str) -> leaseguard::domain::SupportTicket {
    engine
        .create_support_ticket(
            &uid(owner),
            NewSupportTicket {
                category: SupportCategory::Billing,
                priority: SupportPriority::Medium,
                subject: "Invoice shows the wrong amount".to_string(),
            },
        )
        .expect("any signed-in user may open a ticket")
}

#[test]
fn triage_assigns_the_acting_support_agent() {
    let (engine, _, _) = engine();
    let ticket = billing_ticket(&engine, TENANT);
    assert_eq!(ticket.status, SupportTicketStatus::Open);

    let triaged = engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Triage)
        .expect("support triages");
    assert_eq!(triaged.status, SupportTicketStatus::Pending);
    assert_eq!(triaged.assignee, Some(uid(SUPPORT)));

    let owner_triage =
        engine.transition_support_ticket(&uid(TENANT), &ticket.id, SupportAction::Triage);
    assert!(matches!(owner_triage, Err(EngineError::Unauthorized(_))));
}

#[test]
fn owner_edits_lock_once_the_ticket_is_triaged() {
    let (engine, _, _) = engine();
    let ticket = billing_ticket(&engine, TENANT);

    engine
        .update_support_ticket_subject(
            &uid(TENANT),
            &ticket.id,
            "Invoice charges twice".to_string(),
        )
        .expect("owner edits while open");

    engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Triage)
        .expect("triage");

    let locked = engine.update_support_ticket_subject(
        &uid(TENANT),
        &ticket.id,
        "Changed my mind".to_string(),
    );
    assert!(matches!(locked, Err(EngineError::Unauthorized(_))));

    let staff_edit = engine
        .update_support_ticket_subject(
            &uid(SUPPORT),
            &ticket.id,
            "Duplicate invoice charge".to_string(),
        )
        .expect("staff edit is unaffected");
    assert_eq!(staff_edit.subject, "Duplicate invoice charge");
}

#[test]
fn the_waiting_loop_resumes_when_the_owner_replies() {
    let (engine, _, sink) = engine();
    let ticket = billing_ticket(&engine, TENANT);

    engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Triage)
        .expect("triage");
    engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::StartProgress)
        .expect("start progress");
    let waiting = engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Wait)
        .expect("wait on the customer");
    assert_eq!(waiting.status, SupportTicketStatus::WaitingForCustomer);

    let before = deliveries_for(&sink, SUPPORT);
    let resumed = engine
        .transition_support_ticket(&uid(TENANT), &ticket.id, SupportAction::Resume)
        .expect("owner reply resumes");
    assert_eq!(resumed.status, SupportTicketStatus::InProgress);
    // The reply pings the assignee, not the owner.
    assert_eq!(deliveries_for(&sink, SUPPORT), before + 1);

    let resolved = engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Resolve)
        .expect("resolve");
    assert_eq!(resolved.status, SupportTicketStatus::Resolved);
}

#[test]
fn closed_tickets_reopen_into_a_fresh_queue_entry() {
    let (engine, _, _) = engine();
    let ticket = billing_ticket(&engine, HOUSEMATE);

    engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Triage)
        .expect("triage");
    engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::StartProgress)
        .expect("start");
    engine
        .transition_support_ticket(&uid(SUPPORT), &ticket.id, SupportAction::Resolve)
        .expect("resolve");
    engine
        .transition_support_ticket(&uid(HOUSEMATE), &ticket.id, SupportAction::Close)
        .expect("owner closes");

    let reopened = engine
        .transition_support_ticket(&uid(HOUSEMATE), &ticket.id, SupportAction::Reopen)
        .expect("owner reopens");
    assert_eq!(reopened.status, SupportTicketStatus::Open);
}

#[test]
fn tickets_are_invisible_to_unrelated_users() {
    let (engine, _, _) = engine();
    let ticket = billing_ticket(&engine, TENANT);

    let read = engine.get_support_ticket(&uid(OTHER_LANDLORD), &ticket.id);
    assert!(matches!(read, Err(EngineError::Unauthorized(_))));

    // Same-organization staff visibility comes through the support role, not
    // mere org membership of the owner.
    engine
        .get_support_ticket(&uid(SUPPORT), &ticket.id)
        .expect("support reads any ticket");
}
