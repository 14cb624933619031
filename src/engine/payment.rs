use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{
    Cents, HouseholdMemberId, NotificationPriority, Payment, PaymentId, PaymentStatus,
    SplitPayment, SplitPaymentId, TenancyId, UserId,
};
use crate::error::EngineError;
use crate::notify::{EventParties, NotificationSink, TransitionEvent};
use crate::storage::EngineStore;
use crate::workflows::PaymentAction;

use super::{next_id, with_conflict_retry, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub tenancy: TenancyId,
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSplitPayment {
    pub member: HouseholdMemberId,
    pub amount_cents: Cents,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    pub fn create_payment(
        &self,
        principal_id: &UserId,
        input: NewPayment,
    ) -> Result<Payment, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(&input.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::Create, ResourceType::Payment, &facts)?;

        if input.amount_cents <= 0 {
            return Err(EngineError::InvariantViolation(
                "payment amount must be positive".to_string(),
            ));
        }

        let payment = Payment {
            id: PaymentId(next_id("pay")),
            tenancy: input.tenancy,
            amount_cents: input.amount_cents,
            due_date: input.due_date,
            status: PaymentStatus::Pending,
            audit_notes: Vec::new(),
        };
        let payment = self
            .store()
            .insert_payment(payment)
            .map_err(|error| error.into_engine("payment"))?;

        let parties = self.tenancy_parties(&tenancy)?;
        self.dispatch(TransitionEvent {
            resource: ResourceType::Payment,
            resource_id: payment.id.0.clone(),
            action: ActionKind::Create,
            actor: principal.user_id,
            before: None,
            after: Some(payment.status.label()),
            priority: NotificationPriority::Normal,
            summary: format!("Rent payment due {}", payment.due_date),
            parties,
        });
        Ok(payment)
    }

    pub fn get_payment(
        &self,
        principal_id: &UserId,
        id: &PaymentId,
    ) -> Result<Payment, EngineError> {
        let principal = self.principal(principal_id)?;
        let payment = self
            .store()
            .payment(id)
            .map_err(|error| error.into_engine("payment"))?
            .ok_or_else(|| EngineError::NotFound("payment does not exist".to_string()))?;

        let facts = self.evaluator().for_payment(&principal, &payment)?;
        self.require(&principal, ActionKind::Read, ResourceType::Payment, &facts)?;
        Ok(payment)
    }

    pub fn list_payments(
        &self,
        principal_id: &UserId,
        tenancy_id: &TenancyId,
    ) -> Result<Vec<Payment>, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(tenancy_id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::List, ResourceType::Payment, &facts)?;

        self.store()
            .payments_for_tenancy(tenancy_id)
            .map_err(|error| error.into_engine("payments"))
    }

    pub fn transition_payment(
        &self,
        principal_id: &UserId,
        id: &PaymentId,
        action: PaymentAction,
    ) -> Result<Payment, EngineError> {
        // Only `confirm_payment_gateway` may take the gateway branch; a
        // payload-supplied flag is downgraded to the manual override path.
        let action = match action {
            PaymentAction::MarkPaid { audit_note, .. } => PaymentAction::MarkPaid {
                via_gateway: false,
                audit_note,
            },
            other => other,
        };
        with_conflict_retry(|| {
            let principal = self.principal(principal_id)?;
            let payment = self
                .store()
                .payment(id)
                .map_err(|error| error.into_engine("payment"))?
                .ok_or_else(|| EngineError::NotFound("payment does not exist".to_string()))?;

            let facts = self.evaluator().for_payment(&principal, &payment)?;
            self.require(&principal, action.action_kind(), ResourceType::Payment, &facts)?;

            let updated = crate::workflows::payment::apply(&payment, &action)?;
            let updated = self
                .store()
                .cas_update_payment(updated, payment.status)
                .map_err(|error| error.into_engine("payment"))?;

            self.dispatch_payment_event(&updated, &action, payment.status, principal.user_id)?;
            Ok(updated)
        })
    }

    /// Gateway confirmation entry point. The payment provider is a trusted
    /// caller outside the principal model, so this path skips the policy
    /// table and applies the gateway variant of the paid transition directly.
    pub fn confirm_payment_gateway(&self, id: &PaymentId) -> Result<Payment, EngineError> {
        let action = PaymentAction::MarkPaid {
            via_gateway: true,
            audit_note: None,
        };
        with_conflict_retry(|| {
            let payment = self
                .store()
                .payment(id)
                .map_err(|error| error.into_engine("payment"))?
                .ok_or_else(|| EngineError::NotFound("payment does not exist".to_string()))?;

            let updated = crate::workflows::payment::apply(&payment, &action)?;
            let updated = self
                .store()
                .cas_update_payment(updated, payment.status)
                .map_err(|error| error.into_engine("payment"))?;

            self.dispatch_payment_event(&updated, &action, payment.status, UserId::from("gateway"))?;
            Ok(updated)
        })
    }

    fn dispatch_payment_event(
        &self,
        payment: &Payment,
        action: &PaymentAction,
        previous: PaymentStatus,
        actor: UserId,
    ) -> Result<(), EngineError> {
        let tenancy = self
            .store()
            .tenancy(&payment.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;
        let parties = self.tenancy_parties(&tenancy)?;
        self.dispatch(TransitionEvent {
            resource: ResourceType::Payment,
            resource_id: payment.id.0.clone(),
            action: action.action_kind(),
            actor,
            before: Some(previous.label()),
            after: Some(payment.status.label()),
            priority: NotificationPriority::Normal,
            summary: format!("Payment {}", payment.status.label()),
            parties,
        });
        Ok(())
    }

    /// Split a payment across household members as one batch. The store
    /// verifies the sum invariant within the insert, so a failing batch
    /// leaves no rows behind.
    pub fn create_split_payments(
        &self,
        principal_id: &UserId,
        payment_id: &PaymentId,
        inputs: Vec<NewSplitPayment>,
    ) -> Result<Vec<SplitPayment>, EngineError> {
        let principal = self.principal(principal_id)?;
        let payment = self
            .store()
            .payment(payment_id)
            .map_err(|error| error.into_engine("payment"))?
            .ok_or_else(|| EngineError::NotFound("payment does not exist".to_string()))?;

        let facts = self.evaluator().for_payment(&principal, &payment)?;
        self.require(
            &principal,
            ActionKind::Create,
            ResourceType::SplitPayment,
            &facts,
        )?;

        if inputs.is_empty() {
            return Err(EngineError::InvariantViolation(
                "a split requires at least one share".to_string(),
            ));
        }

        let mut household = Vec::with_capacity(inputs.len());
        let mut splits = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.amount_cents <= 0 {
                return Err(EngineError::InvariantViolation(
                    "split amounts must be positive".to_string(),
                ));
            }
            let member = self
                .store()
                .household_member(&input.member)
                .map_err(|error| error.into_engine("household member"))?
                .ok_or_else(|| {
                    EngineError::NotFound("household member does not exist".to_string())
                })?;
            if member.tenancy != payment.tenancy {
                return Err(EngineError::InvariantViolation(
                    "split member does not belong to the payment's tenancy".to_string(),
                ));
            }
            household.push(member.user);
            splits.push(SplitPayment {
                id: SplitPaymentId(next_id("spl")),
                payment: payment.id.clone(),
                member: input.member,
                amount_cents: input.amount_cents,
                status: PaymentStatus::Pending,
            });
        }

        let splits = self
            .store()
            .insert_split_payments(payment_id, splits)
            .map_err(|error| error.into_engine("split payments"))?;

        self.dispatch(TransitionEvent {
            resource: ResourceType::SplitPayment,
            resource_id: payment.id.0.clone(),
            action: ActionKind::Create,
            actor: principal.user_id,
            before: None,
            after: None,
            priority: NotificationPriority::Normal,
            summary: "Rent split across the household".to_string(),
            parties: EventParties {
                household,
                ..EventParties::default()
            },
        });
        Ok(splits)
    }

    pub fn list_split_payments(
        &self,
        principal_id: &UserId,
        payment_id: &PaymentId,
    ) -> Result<Vec<SplitPayment>, EngineError> {
        let principal = self.principal(principal_id)?;
        let payment = self
            .store()
            .payment(payment_id)
            .map_err(|error| error.into_engine("payment"))?
            .ok_or_else(|| EngineError::NotFound("payment does not exist".to_string()))?;

        let facts = self.evaluator().for_payment(&principal, &payment)?;
        self.require(
            &principal,
            ActionKind::Read,
            ResourceType::SplitPayment,
            &facts,
        )?;

        self.store()
            .split_payments(payment_id)
            .map_err(|error| error.into_engine("split payments"))
    }
}
