//! Notification fan-out. The engine emits one [`TransitionEvent`] per
//! completed mutation; [`fanout`] turns it into recipient targets by
//! relationship, and a [`NotificationSink`] delivers them. Delivery is
//! best-effort: sink failures never fail the primary operation.

use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::domain::{NotificationPriority, UserId};

/// The principals related to the resource a transition touched. Absent
/// parties simply produce no targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventParties {
    pub landlord: Option<UserId>,
    pub tenant: Option<UserId>,
    pub owner: Option<UserId>,
    pub assignee: Option<UserId>,
    pub household: Vec<UserId>,
}

/// A completed transition or mutation, described richly enough for recipient
/// computation without another storage round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub resource: ResourceType,
    pub resource_id: String,
    pub action: ActionKind,
    pub actor: UserId,
    pub before: Option<&'static str>,
    pub after: Option<&'static str>,
    pub priority: NotificationPriority,
    pub summary: String,
    pub parties: EventParties,
}

impl TransitionEvent {
    fn action_ref(&self) -> String {
        format!("{}/{}", self.resource.label(), self.resource_id)
    }
}

/// One computed notification: recipient plus rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTarget {
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub action_ref: Option<String>,
}

/// Push/real-time delivery boundary. Failures are logged by the caller and
/// never propagated as request failures.
pub trait NotificationSink: Send + Sync {
    fn send(&self, target: NotificationTarget) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sink that records deliveries so services and tests can assert fan-out.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: std::sync::Mutex<Vec<NotificationTarget>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationTarget> {
        self.sent.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn send(&self, target: NotificationTarget) -> Result<(), SinkError> {
        let mut guard = self.sent.lock().expect("sink mutex poisoned");
        guard.push(target);
        Ok(())
    }
}

/// Compute the recipients for a completed transition. The acting principal is
/// never notified about their own action, and duplicates collapse to one
/// target per user.
pub fn fanout(event: &TransitionEvent) -> Vec<NotificationTarget> {
    let parties = &event.parties;
    let mut recipients: Vec<&UserId> = Vec::new();

    match (event.resource, event.action) {
        // Disputes concern both sides of the tenancy.
        (ResourceType::Dispute, _) => {
            recipients.extend(parties.landlord.iter());
            recipients.extend(parties.tenant.iter());
            recipients.extend(parties.owner.iter());
        }
        // Assignment speaks only to the assignee.
        (ResourceType::MaintenanceRequest, ActionKind::Assign) => {
            recipients.extend(parties.assignee.iter());
        }
        (ResourceType::MaintenanceRequest, ActionKind::Create) => {
            recipients.extend(parties.landlord.iter());
        }
        (ResourceType::MaintenanceRequest, _) => {
            recipients.extend(parties.owner.iter());
            recipients.extend(parties.tenant.iter());
            recipients.extend(parties.landlord.iter());
        }
        // New obligations and confirmations go to the paying side; scheduling
        // tells the landlord money is on its way.
        (ResourceType::Payment, ActionKind::MarkPaid | ActionKind::Create) => {
            recipients.extend(parties.tenant.iter());
        }
        (ResourceType::Payment, _) => {
            recipients.extend(parties.landlord.iter());
        }
        (ResourceType::SplitPayment, _) => {
            recipients.extend(parties.household.iter());
        }
        (ResourceType::Tenancy, _) => {
            recipients.extend(parties.landlord.iter());
            recipients.extend(parties.tenant.iter());
        }
        (ResourceType::HouseholdMember, _) => {
            recipients.extend(parties.owner.iter());
            recipients.extend(parties.tenant.iter());
        }
        (ResourceType::SupportTicket, ActionKind::Resume) => {
            recipients.extend(parties.assignee.iter());
        }
        (ResourceType::SupportTicket, _) => {
            recipients.extend(parties.owner.iter());
        }
        _ => {}
    }

    let mut targets: Vec<NotificationTarget> = Vec::new();
    for recipient in recipients {
        if recipient == &event.actor {
            continue;
        }
        if targets.iter().any(|target| &target.recipient == recipient) {
            continue;
        }
        targets.push(NotificationTarget {
            recipient: recipient.clone(),
            title: event.summary.clone(),
            body: format!(
                "{} {} on {}",
                event.summary,
                match (event.before, event.after) {
                    (Some(before), Some(after)) => format!("({before} -> {after})"),
                    _ => String::new(),
                },
                event.action_ref()
            )
            .trim()
            .to_string(),
            priority: event.priority,
            action_ref: Some(event.action_ref()),
        });
    }

    targets
}
