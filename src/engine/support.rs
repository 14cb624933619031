use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{
    Role, SupportCategory, SupportPriority, SupportTicket, SupportTicketId, SupportTicketStatus,
    UserId,
};
use crate::error::EngineError;
use crate::notify::{EventParties, NotificationSink, TransitionEvent};
use crate::storage::EngineStore;
use crate::workflows::SupportAction;

use super::{next_id, with_conflict_retry, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupportTicket {
    pub category: SupportCategory,
    pub priority: SupportPriority,
    pub subject: String,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    /// Any signed-in user may open a ticket against the platform itself.
    pub fn create_support_ticket(
        &self,
        principal_id: &UserId,
        input: NewSupportTicket,
    ) -> Result<SupportTicket, EngineError> {
        let principal = self.principal(principal_id)?;
        let facts = self.principal_facts(&principal);
        self.require(
            &principal,
            ActionKind::Create,
            ResourceType::SupportTicket,
            &facts,
        )?;

        if input.subject.trim().is_empty() {
            return Err(EngineError::InvariantViolation(
                "a support ticket requires a subject".to_string(),
            ));
        }

        let ticket = SupportTicket {
            id: SupportTicketId(next_id("tkt")),
            owner: principal.user_id.clone(),
            assignee: None,
            status: SupportTicketStatus::Open,
            category: input.category,
            priority: input.priority,
            subject: input.subject.trim().to_string(),
            opened_at: self.clock().now(),
        };
        self.store()
            .insert_support_ticket(ticket)
            .map_err(|error| error.into_engine("support ticket"))
    }

    pub fn get_support_ticket(
        &self,
        principal_id: &UserId,
        id: &SupportTicketId,
    ) -> Result<SupportTicket, EngineError> {
        let principal = self.principal(principal_id)?;
        let ticket = self
            .store()
            .support_ticket(id)
            .map_err(|error| error.into_engine("support ticket"))?
            .ok_or_else(|| EngineError::NotFound("support ticket does not exist".to_string()))?;

        let facts = self.evaluator().for_support_ticket(&principal, &ticket)?;
        self.require(&principal, ActionKind::Read, ResourceType::SupportTicket, &facts)?;
        Ok(ticket)
    }

    pub fn list_support_tickets(
        &self,
        principal_id: &UserId,
    ) -> Result<Vec<SupportTicket>, EngineError> {
        let principal = self.principal(principal_id)?;
        let facts = self.principal_facts(&principal);
        self.require(&principal, ActionKind::List, ResourceType::SupportTicket, &facts)?;

        self.store()
            .support_tickets_for_owner(&principal.user_id)
            .map_err(|error| error.into_engine("support tickets"))
    }

    /// Edit the ticket subject. Once triage moves the ticket out of `open`,
    /// the owner loses edit access while staff and the assignee keep it.
    pub fn update_support_ticket_subject(
        &self,
        principal_id: &UserId,
        id: &SupportTicketId,
        subject: String,
    ) -> Result<SupportTicket, EngineError> {
        let principal = self.principal(principal_id)?;
        let ticket = self
            .store()
            .support_ticket(id)
            .map_err(|error| error.into_engine("support ticket"))?
            .ok_or_else(|| EngineError::NotFound("support ticket does not exist".to_string()))?;

        let facts = self.evaluator().for_support_ticket(&principal, &ticket)?;
        self.require(&principal, ActionKind::Update, ResourceType::SupportTicket, &facts)?;

        let staff = facts.is_admin || facts.is_assignee || principal.role == Role::Support;
        if !staff && ticket.status != SupportTicketStatus::Open {
            return Err(EngineError::Unauthorized(
                "a triaged ticket can only be edited by staff".to_string(),
            ));
        }
        if subject.trim().is_empty() {
            return Err(EngineError::InvariantViolation(
                "a support ticket requires a subject".to_string(),
            ));
        }

        let expected = ticket.status;
        let mut updated = ticket;
        updated.subject = subject.trim().to_string();
        self.store()
            .cas_update_support_ticket(updated, expected)
            .map_err(|error| error.into_engine("support ticket"))
    }

    pub fn transition_support_ticket(
        &self,
        principal_id: &UserId,
        id: &SupportTicketId,
        action: SupportAction,
    ) -> Result<SupportTicket, EngineError> {
        with_conflict_retry(|| {
            let principal = self.principal(principal_id)?;
            let ticket = self
                .store()
                .support_ticket(id)
                .map_err(|error| error.into_engine("support ticket"))?
                .ok_or_else(|| {
                    EngineError::NotFound("support ticket does not exist".to_string())
                })?;

            let facts = self.evaluator().for_support_ticket(&principal, &ticket)?;
            self.require(
                &principal,
                action.action_kind(),
                ResourceType::SupportTicket,
                &facts,
            )?;

            let updated = crate::workflows::support::apply(&ticket, &action, &principal.user_id)?;
            let updated = self
                .store()
                .cas_update_support_ticket(updated, ticket.status)
                .map_err(|error| error.into_engine("support ticket"))?;

            self.dispatch(TransitionEvent {
                resource: ResourceType::SupportTicket,
                resource_id: updated.id.0.clone(),
                action: action.action_kind(),
                actor: principal.user_id,
                before: Some(ticket.status.label()),
                after: Some(updated.status.label()),
                priority: updated.priority.notification_priority(),
                summary: format!("Support ticket {}: {}", updated.status.label(), updated.subject),
                parties: EventParties {
                    owner: Some(updated.owner.clone()),
                    assignee: updated.assignee.clone(),
                    ..EventParties::default()
                },
            });
            Ok(updated)
        })
    }
}
