//! Dispute lifecycle scenarios: who may open and resolve, what resolution
//! stamps, and how fan-out reaches the counterparty.

mod common;

use common::*;

use leaseguard::domain::{DisputeCategory, DisputePriority, DisputeStatus, TenancyId};
use leaseguard::engine::NewDispute;
use leaseguard::workflows::DisputeAction;
use leaseguard::EngineError;

fn new_dispute(subject: &str) -> NewDispute {
    NewDispute {
        tenancy: TenancyId::from(TENANCY),
        category: DisputeCategory::Damage,
        priority: DisputePriority::High,
        subject: subject.to_string(),
    }
}

#[test]
fn housemate_opens_high_priority_dispute_and_landlord_is_alerted() {
    let (engine, _, sink) = engine();

    let dispute = engine
        .create_dispute(&uid(HOUSEMATE), new_dispute("Ceiling leak damage"))
        .expect("household member may open disputes");
    assert_eq!(dispute.status, DisputeStatus::Open);
    assert_eq!(dispute.reporter, uid(HOUSEMATE));

    assert_eq!(deliveries_for(&sink, LANDLORD), 1);
    assert_eq!(deliveries_for(&sink, HOUSEMATE), 0);
    let to_landlord = sink
        .sent()
        .into_iter()
        .find(|target| target.recipient == uid(LANDLORD))
        .expect("landlord delivery recorded");
    assert_eq!(
        to_landlord.priority,
        DisputePriority::High.notification_priority()
    );
}

#[test]
fn resolution_requires_notes_and_stamps_the_resolver() {
    let (engine, _, _) = engine();

    let dispute = engine
        .create_dispute(&uid(TENANT), new_dispute("Deposit deduction"))
        .expect("tenant opens dispute");
    engine
        .transition_dispute(&uid(LANDLORD), &dispute.id, DisputeAction::StartProgress)
        .expect("landlord starts progress");

    let blank = engine.transition_dispute(
        &uid(LANDLORD),
        &dispute.id,
        DisputeAction::Resolve {
            notes: "  ".to_string(),
        },
    );
    assert!(matches!(blank, Err(EngineError::InvariantViolation(_))));

    let resolved = engine
        .transition_dispute(
            &uid(LANDLORD),
            &dispute.id,
            DisputeAction::Resolve {
                notes: "Deduction reversed in full".to_string(),
            },
        )
        .expect("resolution with notes");
    assert_eq!(resolved.status, DisputeStatus::Resolved);
    assert_eq!(resolved.resolver, Some(uid(LANDLORD)));
    assert!(resolved.resolved_at.is_some());
    assert_eq!(
        resolved.resolution_notes.as_deref(),
        Some("Deduction reversed in full")
    );
}

#[test]
fn the_reporter_cannot_resolve_their_own_dispute() {
    let (engine, _, _) = engine();

    let dispute = engine
        .create_dispute(&uid(TENANT), new_dispute("Noise complaint"))
        .expect("tenant opens dispute");
    engine
        .transition_dispute(&uid(LANDLORD), &dispute.id, DisputeAction::StartProgress)
        .expect("landlord starts progress");

    let error = engine
        .transition_dispute(
            &uid(TENANT),
            &dispute.id,
            DisputeAction::Resolve {
                notes: "All fine now".to_string(),
            },
        )
        .expect_err("reporter cannot resolve");
    match error {
        EngineError::Unauthorized(reason) => assert!(reason.contains("landlord")),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test]
fn open_disputes_can_be_withdrawn_but_closed_ones_are_frozen() {
    let (engine, _, _) = engine();

    let dispute = engine
        .create_dispute(&uid(TENANT), new_dispute("Wrong rent charged"))
        .expect("tenant opens dispute");
    let closed = engine
        .transition_dispute(&uid(TENANT), &dispute.id, DisputeAction::Close)
        .expect("reporter withdraws an open dispute");
    assert_eq!(closed.status, DisputeStatus::Closed);

    let error = engine
        .transition_dispute(&uid(LANDLORD), &dispute.id, DisputeAction::StartProgress)
        .expect_err("closed dispute accepts nothing");
    assert!(matches!(error, EngineError::IllegalTransition(_)));
}

#[test]
fn racing_resolutions_leave_one_winner_and_one_stamped_record() {
    let (engine, _, _) = engine();

    let dispute = engine
        .create_dispute(&uid(TENANT), new_dispute("Boiler repair charge"))
        .expect("tenant opens dispute");
    engine
        .transition_dispute(&uid(LANDLORD), &dispute.id, DisputeAction::StartProgress)
        .expect("landlord starts progress");

    let barrier = std::sync::Arc::new(std::sync::Barrier::new(2));
    let mut handles = Vec::new();
    for (actor, notes) in [(LANDLORD, "Charge waived"), (ADMIN, "Charge upheld")] {
        let engine = engine.clone();
        let id = dispute.id.clone();
        let barrier = std::sync::Arc::clone(&barrier);
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            engine.transition_dispute(
                &uid(actor),
                &id,
                DisputeAction::Resolve {
                    notes: notes.to_string(),
                },
            )
        }));
    }
    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("resolver thread panicked"))
        .collect();

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    // The loser re-reads before giving up and finds the dispute already
    // resolved, so the swap never degrades into a spurious success.
    let loss = outcomes
        .into_iter()
        .find_map(Result::err)
        .expect("exactly one resolution loses");
    assert!(matches!(loss, EngineError::IllegalTransition(_)));

    let resolved = engine
        .get_dispute(&uid(ADMIN), &dispute.id)
        .expect("read back");
    assert_eq!(resolved.status, DisputeStatus::Resolved);
    assert!(resolved.resolver.is_some());
    assert!(resolved.resolution_notes.is_some());
}

#[test]
fn disputes_stay_invisible_outside_the_tenancy() {
    let (engine, _, _) = engine();

    let dispute = engine
        .create_dispute(&uid(TENANT), new_dispute("Mould in bathroom"))
        .expect("tenant opens dispute");

    let read = engine.get_dispute(&uid(OTHER_LANDLORD), &dispute.id);
    assert!(matches!(read, Err(EngineError::Unauthorized(_))));

    let list = engine.list_disputes(&uid(OTHER_LANDLORD), &TenancyId::from(TENANCY));
    assert!(matches!(list, Err(EngineError::Unauthorized(_))));
}
