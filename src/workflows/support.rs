use serde::{Deserialize, Serialize};

use crate::auth::ActionKind;
use crate::domain::{SupportTicket, SupportTicketStatus, UserId};
use crate::error::EngineError;

/// Help-desk ticket transitions. `Resume` models the ticket owner posting a
/// new message while the ticket waits on them; `Triage` assigns the ticket to
/// the acting staff member when none is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SupportAction {
    Triage,
    StartProgress,
    Wait,
    Resume,
    Resolve,
    Close,
    Reopen,
}

impl SupportAction {
    pub const fn action_kind(&self) -> ActionKind {
        match self {
            SupportAction::Triage => ActionKind::Triage,
            SupportAction::StartProgress => ActionKind::StartProgress,
            SupportAction::Wait => ActionKind::Wait,
            SupportAction::Resume => ActionKind::Resume,
            SupportAction::Resolve => ActionKind::Resolve,
            SupportAction::Close => ActionKind::Close,
            SupportAction::Reopen => ActionKind::Reopen,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.action_kind().label()
    }
}

pub fn apply(
    ticket: &SupportTicket,
    action: &SupportAction,
    actor: &UserId,
) -> Result<SupportTicket, EngineError> {
    let mut updated = ticket.clone();

    match (ticket.status, action) {
        (SupportTicketStatus::Open, SupportAction::Triage) => {
            updated.status = SupportTicketStatus::Pending;
            if updated.assignee.is_none() {
                updated.assignee = Some(actor.clone());
            }
        }
        (SupportTicketStatus::Pending, SupportAction::StartProgress) => {
            updated.status = SupportTicketStatus::InProgress;
        }
        (SupportTicketStatus::InProgress, SupportAction::Wait) => {
            updated.status = SupportTicketStatus::WaitingForCustomer;
        }
        (SupportTicketStatus::WaitingForCustomer, SupportAction::Resume) => {
            updated.status = SupportTicketStatus::InProgress;
        }
        (
            SupportTicketStatus::InProgress | SupportTicketStatus::WaitingForCustomer,
            SupportAction::Resolve,
        ) => {
            updated.status = SupportTicketStatus::Resolved;
        }
        (SupportTicketStatus::Resolved, SupportAction::Close) => {
            updated.status = SupportTicketStatus::Closed;
        }
        (SupportTicketStatus::Closed, SupportAction::Reopen) => {
            updated.status = SupportTicketStatus::Open;
        }
        (current, action) => {
            return Err(EngineError::IllegalTransition(format!(
                "cannot {} a {} support ticket",
                action.label(),
                current.label()
            )))
        }
    }

    Ok(updated)
}
