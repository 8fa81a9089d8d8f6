//! Payment reducer.
//!
//! Payments are opened and settled by follow-up actions from the ticket
//! reducer, and can also be managed directly from the payments screen.

use super::{is_blank, show};
use crate::error::{ConsoleError, Entity, Field, Result, ValidationErrors};
use crate::ids::unique_id;
use crate::navigation::{Params, Screen};
use crate::reducer::{ConsoleAction, ConsoleEnvironment, ConsoleState};
use crate::types::{Money, Payment, PaymentId, PaymentStatus, TicketId};
use chrono::NaiveDate;
use parking_console_core::reducer::Effects;
use parking_console_core::smallvec;
use serde::{Deserialize, Serialize};

/// Payment actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentAction {
    /// Record a payment
    Create(PaymentDraft),
    /// Merge an edit into an existing payment
    Update {
        /// Payment to edit
        id: PaymentId,
        /// Fields to change
        patch: PaymentPatch,
    },
    /// Remove a payment
    Delete {
        /// Payment to remove
        id: PaymentId,
    },
    /// Open a pending payment for a newly issued ticket
    OpenForTicket {
        /// Ticket the payment settles
        ticket_id: TicketId,
        /// Amount due
        amount: Money,
    },
    /// Mark a payment as paid, creating it if it does not exist yet
    Settle {
        /// Payment to settle
        id: PaymentId,
        /// Ticket it settles
        ticket_id: TicketId,
        /// Amount paid
        amount: Money,
        /// How it was paid
        method: String,
        /// When it was paid
        paid_on: NaiveDate,
        /// Transaction reference
        transaction_id: String,
    },
}

/// Form submission for a new payment
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDraft {
    /// Ticket the payment settles
    pub ticket_id: Option<TicketId>,
    /// Amount; must be positive
    pub amount: Option<Money>,
    /// Initial status; Pending when absent
    pub status: Option<PaymentStatus>,
    /// How it was paid
    pub method: Option<String>,
    /// When it was paid
    pub paid_on: Option<NaiveDate>,
    /// Transaction reference
    pub transaction_id: Option<String>,
    /// Payer name
    pub payer_name: String,
    /// Payer email
    pub payer_email: String,
}

/// Field-level edit of a payment; `None` keeps the current value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentPatch {
    /// New amount
    pub amount: Option<Money>,
    /// New status
    pub status: Option<PaymentStatus>,
    /// New method
    pub method: Option<String>,
    /// New payment date
    pub paid_on: Option<NaiveDate>,
    /// New transaction reference
    pub transaction_id: Option<String>,
    /// New payer name
    pub payer_name: Option<String>,
    /// New payer email
    pub payer_email: Option<String>,
}

/// Overdue is derived from the ticket's due date and never stored
fn check_stored_status(errors: &mut ValidationErrors, status: PaymentStatus) {
    errors.check(
        status == PaymentStatus::Overdue,
        Field::Status,
        "Overdue is derived from the ticket due date.",
    );
}

/// Reduces a payment action
pub(crate) fn reduce(
    state: &mut ConsoleState,
    action: PaymentAction,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    match action {
        PaymentAction::Create(draft) => create(state, draft, env)?,
        PaymentAction::Update { id, patch } => update(state, &id, patch)?,
        PaymentAction::Delete { id } => {
            let index = state
                .payments
                .iter()
                .position(|payment| payment.id == id)
                .ok_or_else(|| ConsoleError::not_found(Entity::Payment, &id))?;
            state.payments.remove(index);
            tracing::info!(payment_id = %id, "Payment deleted");
            return Ok(smallvec![show(Screen::PaymentsList, Params::new())]);
        },
        PaymentAction::OpenForTicket { ticket_id, amount } => {
            let id = allocate_payment_id(state, env);
            tracing::debug!(payment_id = %id, ticket_id = %ticket_id, "Payment opened");
            state.payments.push(Payment {
                id,
                ticket_id,
                amount,
                status: PaymentStatus::Pending,
                method: None,
                paid_on: None,
                transaction_id: None,
                payer_name: String::new(),
                payer_email: String::new(),
            });
        },
        PaymentAction::Settle {
            id,
            ticket_id,
            amount,
            method,
            paid_on,
            transaction_id,
        } => settle(state, id, ticket_id, amount, method, paid_on, transaction_id)?,
    }
    Ok(smallvec![])
}

fn allocate_payment_id(state: &ConsoleState, env: &ConsoleEnvironment) -> PaymentId {
    PaymentId::new(unique_id(env.ids.as_ref(), PaymentId::PREFIX, |candidate| {
        state.payment(&PaymentId::from(candidate)).is_some()
    }))
}

fn create(state: &mut ConsoleState, draft: PaymentDraft, env: &ConsoleEnvironment) -> Result<()> {
    let mut errors = ValidationErrors::new();
    match &draft.ticket_id {
        Some(ticket_id) if !is_blank(ticket_id.as_str()) => {
            errors.check(
                state.ticket(ticket_id).is_none(),
                Field::TicketId,
                "Ticket not found.",
            );
        },
        _ => errors.add(Field::TicketId, "Ticket is required."),
    }
    errors.check(
        !draft.amount.is_some_and(|amount| amount.is_positive()),
        Field::Amount,
        "Valid amount is required.",
    );
    let status = draft.status.unwrap_or(PaymentStatus::Pending);
    check_stored_status(&mut errors, status);

    let (Some(ticket_id), Some(amount)) = (draft.ticket_id, draft.amount) else {
        return Err(ConsoleError::Validation(errors));
    };
    errors.into_result()?;

    let id = allocate_payment_id(state, env);
    tracing::info!(payment_id = %id, ticket_id = %ticket_id, "Payment recorded");
    state.payments.push(Payment {
        id,
        ticket_id,
        amount,
        status,
        method: draft.method,
        paid_on: draft.paid_on,
        transaction_id: draft.transaction_id,
        payer_name: draft.payer_name,
        payer_email: draft.payer_email,
    });
    Ok(())
}

fn update(state: &mut ConsoleState, id: &PaymentId, patch: PaymentPatch) -> Result<()> {
    let payment = state
        .payments
        .iter_mut()
        .find(|payment| &payment.id == id)
        .ok_or_else(|| ConsoleError::not_found(Entity::Payment, id))?;

    let mut errors = ValidationErrors::new();
    if let Some(amount) = patch.amount {
        errors.check(!amount.is_positive(), Field::Amount, "Valid amount is required.");
    }
    if let Some(status) = patch.status {
        check_stored_status(&mut errors, status);
        errors.check(
            payment.status == PaymentStatus::Paid
                && !matches!(status, PaymentStatus::Paid | PaymentStatus::Refunded),
            Field::Status,
            "A paid payment can only be refunded.",
        );
    }
    errors.into_result()?;

    if let Some(amount) = patch.amount {
        payment.amount = amount;
    }
    if let Some(status) = patch.status {
        payment.status = status;
    }
    if patch.method.is_some() {
        payment.method = patch.method;
    }
    if patch.paid_on.is_some() {
        payment.paid_on = patch.paid_on;
    }
    if patch.transaction_id.is_some() {
        payment.transaction_id = patch.transaction_id;
    }
    if let Some(payer_name) = patch.payer_name {
        payment.payer_name = payer_name;
    }
    if let Some(payer_email) = patch.payer_email {
        payment.payer_email = payer_email;
    }
    tracing::info!(payment_id = %id, status = ?payment.status, "Payment updated");
    Ok(())
}

fn settle(
    state: &mut ConsoleState,
    id: PaymentId,
    ticket_id: TicketId,
    amount: Money,
    method: String,
    paid_on: NaiveDate,
    transaction_id: String,
) -> Result<()> {
    if let Some(payment) = state.payments.iter_mut().find(|payment| payment.id == id) {
        if matches!(payment.status, PaymentStatus::Paid | PaymentStatus::Refunded) {
            let mut errors = ValidationErrors::new();
            errors.add(Field::Status, "Payment is already settled.");
            return Err(ConsoleError::Validation(errors));
        }
        payment.amount = amount;
        payment.status = PaymentStatus::Paid;
        payment.method = Some(method);
        payment.paid_on = Some(paid_on);
        payment.transaction_id = Some(transaction_id);
    } else {
        state.payments.push(Payment {
            id: id.clone(),
            ticket_id: ticket_id.clone(),
            amount,
            status: PaymentStatus::Paid,
            method: Some(method),
            paid_on: Some(paid_on),
            transaction_id: Some(transaction_id),
            payer_name: String::new(),
            payer_email: String::new(),
        });
    }
    tracing::info!(payment_id = %id, ticket_id = %ticket_id, "Payment settled");
    Ok(())
}
