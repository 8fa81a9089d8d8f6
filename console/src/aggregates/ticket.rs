//! Ticket reducer: issue, edit, delete and the admin lifecycle commands.
//!
//! Every accepted ticket action appends exactly one audit entry to the ticket
//! it touches (delete removes the ticket, and with it the log).

use super::payment::PaymentAction;
use super::{audit, is_blank, show};
use crate::error::{ConsoleError, Entity, Field, Result, ValidationErrors};
use crate::ids::unique_id;
use crate::navigation::{Params, Screen, id_param};
use crate::reducer::{ConsoleAction, ConsoleEnvironment, ConsoleState};
use crate::types::{
    Money, OfficerId, PaymentId, PaymentStatus, Ticket, TicketId, TicketRecord, TicketStatus,
    Vehicle,
};
use crate::workflow::Workflow;
use chrono::{Duration, NaiveDate, NaiveTime};
use parking_console_core::effect::Effect;
use parking_console_core::reducer::Effects;
use parking_console_core::smallvec;
use serde::{Deserialize, Serialize};

// ============================================================================
// Actions
// ============================================================================

/// Ticket actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketAction {
    /// Issue a new ticket
    Create(TicketDraft),
    /// Merge an edit into an existing ticket
    Update {
        /// Ticket to edit
        id: TicketId,
        /// Fields to change
        patch: TicketPatch,
    },
    /// Remove a ticket; its payment is kept
    Delete {
        /// Ticket to remove
        id: TicketId,
    },
    /// Issued → Reviewed
    Review {
        /// Ticket to review
        id: TicketId,
        /// Reviewer note
        note: String,
    },
    /// Issued or Reviewed → Appealed
    Appeal {
        /// Ticket under appeal
        id: TicketId,
        /// Appellant's reason
        reason: String,
    },
    /// Anything but Paid → Paid, settling its payment
    MarkPaid {
        /// Ticket to settle
        id: TicketId,
    },
    /// Issued, Reviewed or Appealed → Rejected
    Reject {
        /// Ticket to reject
        id: TicketId,
        /// Why it was thrown out
        reason: String,
    },
    /// Issued, Reviewed or Appealed → Resolved
    Resolve {
        /// Ticket to resolve
        id: TicketId,
        /// Outcome note
        note: String,
    },
}

/// Form submission for a new ticket
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketDraft {
    /// Violation description
    pub violation_type: String,
    /// Violation code
    pub violation_code: String,
    /// Fine amount; must be positive
    pub fine_amount: Option<Money>,
    /// Vehicle cited
    pub vehicle: Vehicle,
    /// Issuing officer
    pub officer_id: Option<OfficerId>,
    /// Where it happened
    pub location: String,
    /// Date written
    pub issue_date: Option<NaiveDate>,
    /// Payment due date; defaults to the configured offset from the issue date
    pub due_date: Option<NaiveDate>,
    /// Evidence photo references
    pub photos: Vec<String>,
    /// Free-form notes
    pub notes: String,
}

/// Field-level edit of a ticket; `None` keeps the current value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketPatch {
    /// New violation description
    pub violation_type: Option<String>,
    /// New violation code
    pub violation_code: Option<String>,
    /// New fine amount
    pub fine_amount: Option<Money>,
    /// New status; Paid is only reachable through mark-paid
    pub status: Option<TicketStatus>,
    /// New license plate
    pub license_plate: Option<String>,
    /// New vehicle make
    pub make: Option<String>,
    /// New vehicle model
    pub model: Option<String>,
    /// New vehicle color
    pub color: Option<String>,
    /// New issuing officer
    pub officer_id: Option<OfficerId>,
    /// New location
    pub location: Option<String>,
    /// New issue date
    pub issue_date: Option<NaiveDate>,
    /// New due date
    pub due_date: Option<NaiveDate>,
    /// Replacement photo list
    pub photos: Option<Vec<String>>,
    /// New notes
    pub notes: Option<String>,
}

/// Assigns `value` to `slot` when it differs, recording `name` as changed
fn merge<T: PartialEq>(slot: &mut T, value: Option<T>, name: &'static str, changed: &mut Vec<&'static str>) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            changed.push(name);
        }
    }
}

impl TicketPatch {
    /// Applies the patch, returning the names of the fields that changed
    fn apply_to(self, ticket: &mut Ticket) -> Vec<&'static str> {
        let mut changed = Vec::new();
        merge(&mut ticket.violation_type, self.violation_type, "violationType", &mut changed);
        merge(&mut ticket.violation_code, self.violation_code, "violationCode", &mut changed);
        merge(&mut ticket.fine_amount, self.fine_amount, "fineAmount", &mut changed);
        merge(&mut ticket.status, self.status, "status", &mut changed);
        merge(&mut ticket.vehicle.license_plate, self.license_plate, "licensePlate", &mut changed);
        merge(&mut ticket.vehicle.make, self.make, "make", &mut changed);
        merge(&mut ticket.vehicle.model, self.model, "model", &mut changed);
        merge(&mut ticket.vehicle.color, self.color, "color", &mut changed);
        merge(&mut ticket.officer_id, self.officer_id, "officerId", &mut changed);
        merge(&mut ticket.location, self.location, "location", &mut changed);
        merge(&mut ticket.issue_date, self.issue_date, "issueDate", &mut changed);
        merge(&mut ticket.due_date, self.due_date, "dueDate", &mut changed);
        merge(&mut ticket.photos, self.photos, "photos", &mut changed);
        merge(&mut ticket.notes, self.notes, "notes", &mut changed);
        changed
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Checks shared by create and edit
fn check_ticket_fields(
    errors: &mut ValidationErrors,
    violation_type: &str,
    fine_amount: Option<Money>,
    license_plate: &str,
    officer_id: Option<&OfficerId>,
    issue_date: Option<NaiveDate>,
    location: &str,
) {
    errors.check(is_blank(violation_type), Field::ViolationType, "Violation type is required.");
    errors.check(
        !fine_amount.is_some_and(|amount| amount.is_positive()),
        Field::FineAmount,
        "Valid fine amount is required.",
    );
    errors.check(is_blank(license_plate), Field::LicensePlate, "License plate is required.");
    errors.check(
        officer_id.is_none_or(|id| is_blank(id.as_str())),
        Field::OfficerId,
        "Officer is required.",
    );
    errors.check(issue_date.is_none(), Field::IssueDate, "Issue date is required.");
    errors.check(is_blank(location), Field::Location, "Location is required.");
}

fn check_officer_exists(errors: &mut ValidationErrors, state: &ConsoleState, id: &OfficerId) {
    if !errors.has(Field::OfficerId) && state.officer(id).is_none() {
        errors.add(Field::OfficerId, "Officer not found.");
    }
}

fn check_due_date(errors: &mut ValidationErrors, issue_date: NaiveDate, due_date: NaiveDate) {
    errors.check(due_date < issue_date, Field::DueDate, "Due date cannot precede the issue date.");
}

// ============================================================================
// Reducer
// ============================================================================

/// Reduces a ticket action on behalf of `actor`
pub(crate) fn reduce(
    state: &mut ConsoleState,
    action: TicketAction,
    actor: &str,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    match action {
        TicketAction::Create(draft) => create(state, draft, actor, env),
        TicketAction::Update { id, patch } => update(state, &id, patch, actor, env),
        TicketAction::Delete { id } => delete(state, &id),
        TicketAction::Review { id, note } => {
            let details = if is_blank(&note) { "Evidence confirmed.".to_string() } else { note };
            transition(state, &id, TicketStatus::Reviewed, "Ticket reviewed.", details, actor, env)
        },
        TicketAction::Appeal { id, reason } => transition(
            state,
            &id,
            TicketStatus::Appealed,
            "Appeal initiated.",
            format!("Reason: {reason}"),
            actor,
            env,
        ),
        TicketAction::Reject { id, reason } => transition(
            state,
            &id,
            TicketStatus::Rejected,
            "Ticket rejected.",
            format!("Reason: {reason}"),
            actor,
            env,
        ),
        TicketAction::Resolve { id, note } => {
            let details = if is_blank(&note) { "No fine collected.".to_string() } else { note };
            transition(state, &id, TicketStatus::Resolved, "Ticket resolved.", details, actor, env)
        },
        TicketAction::MarkPaid { id } => mark_paid(state, &id, actor, env),
    }
}

/// Statuses a lifecycle command may start from
const fn allowed_sources(to: TicketStatus) -> &'static [TicketStatus] {
    use TicketStatus::{Appealed, Issued, Paid, Rejected, Resolved, Reviewed};
    match to {
        Reviewed => &[Issued],
        Appealed => &[Issued, Reviewed],
        Rejected | Resolved => &[Issued, Reviewed, Appealed],
        Paid => &[Issued, Reviewed, Appealed, Rejected, Resolved],
        Issued => &[],
    }
}

impl TicketStatus {
    /// True when an admin lifecycle command may move a ticket from `self` to `to`
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        allowed_sources(to).contains(&self)
    }
}

fn create(
    state: &mut ConsoleState,
    draft: TicketDraft,
    actor: &str,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    let mut errors = ValidationErrors::new();
    check_ticket_fields(
        &mut errors,
        &draft.violation_type,
        draft.fine_amount,
        &draft.vehicle.license_plate,
        draft.officer_id.as_ref(),
        draft.issue_date,
        &draft.location,
    );
    if let Some(officer_id) = &draft.officer_id {
        check_officer_exists(&mut errors, state, officer_id);
    }
    if let (Some(issue_date), Some(due_date)) = (draft.issue_date, draft.due_date) {
        check_due_date(&mut errors, issue_date, due_date);
    }

    let (Some(fine_amount), Some(officer_id), Some(issue_date)) =
        (draft.fine_amount, draft.officer_id, draft.issue_date)
    else {
        return Err(ConsoleError::Validation(errors));
    };
    errors.into_result()?;

    let officer_name = state
        .officer(&officer_id)
        .map(|officer| officer.name.clone())
        .unwrap_or_default();
    let due_date = draft
        .due_date
        .unwrap_or_else(|| issue_date + Duration::days(i64::from(env.payment_due_days)));
    let id = state.allocate_ticket_id();

    let record = TicketRecord {
        id: id.clone(),
        violation_type: draft.violation_type,
        violation_code: draft.violation_code,
        fine_amount,
        status: TicketStatus::Issued,
        vehicle: draft.vehicle,
        officer_id,
        officer_name,
        location: draft.location,
        issue_date,
        due_date,
        payment_id: None,
        photos: draft.photos,
        notes: draft.notes,
    };
    let workflow = Workflow::started(
        TicketStatus::Issued,
        issue_date.and_time(NaiveTime::MIN).and_utc(),
    );
    let created = audit(
        env,
        actor,
        format!("Ticket {id} created."),
        format!("Initial fine: {fine_amount}"),
    );
    state
        .tickets
        .push(Ticket::from_record(record, vec![created], workflow));

    tracing::info!(ticket_id = %id, fine = %fine_amount, "Ticket created");

    Ok(smallvec![Effect::chain(vec![
        Effect::Send(ConsoleAction::Payment(PaymentAction::OpenForTicket {
            ticket_id: id.clone(),
            amount: fine_amount,
        })),
        show(Screen::TicketDetail, id_param(&id)),
    ])])
}

fn update(
    state: &mut ConsoleState,
    id: &TicketId,
    patch: TicketPatch,
    actor: &str,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    let current = state
        .ticket(id)
        .ok_or_else(|| ConsoleError::not_found(Entity::Ticket, id))?;

    let mut updated = current.clone();
    let changed = patch.apply_to(&mut updated);

    let mut errors = ValidationErrors::new();
    check_ticket_fields(
        &mut errors,
        &updated.violation_type,
        Some(updated.fine_amount),
        &updated.vehicle.license_plate,
        Some(&updated.officer_id),
        Some(updated.issue_date),
        &updated.location,
    );
    check_due_date(&mut errors, updated.issue_date, updated.due_date);
    if updated.officer_id != current.officer_id {
        check_officer_exists(&mut errors, state, &updated.officer_id);
    }
    errors.check(
        updated.status == TicketStatus::Paid
            && current.status != TicketStatus::Paid
            && updated.payment_id.is_none(),
        Field::Status,
        "Use mark as paid to record a payment.",
    );
    errors.into_result()?;

    if updated.officer_id != current.officer_id {
        if let Some(officer) = state.officer(&updated.officer_id) {
            updated.officer_name.clone_from(&officer.name);
        }
    }
    if updated.status != current.status {
        updated.sync_workflow(env.clock.now());
    }
    let details = if changed.is_empty() {
        "No changes.".to_string()
    } else {
        format!("Changes applied: {}", changed.join(", "))
    };
    updated.record(audit(env, actor, "Ticket updated.", details));

    tracing::info!(ticket_id = %id, changed = ?changed, "Ticket updated");

    if let Some(slot) = state.ticket_mut(id) {
        *slot = updated;
    }
    Ok(smallvec![show(Screen::TicketDetail, id_param(id))])
}

fn delete(state: &mut ConsoleState, id: &TicketId) -> Result<Effects<ConsoleAction>> {
    let index = state
        .tickets
        .iter()
        .position(|ticket| &ticket.id == id)
        .ok_or_else(|| ConsoleError::not_found(Entity::Ticket, id))?;
    state.tickets.remove(index);
    tracing::info!(ticket_id = %id, "Ticket deleted");
    Ok(smallvec![show(Screen::TicketsList, Params::new())])
}

/// Applies an admin lifecycle command
fn transition(
    state: &mut ConsoleState,
    id: &TicketId,
    to: TicketStatus,
    action: &str,
    details: String,
    actor: &str,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    let ticket = state
        .ticket_mut(id)
        .ok_or_else(|| ConsoleError::not_found(Entity::Ticket, id))?;
    if !ticket.status.can_transition_to(to) {
        return Err(ConsoleError::InvalidTransition {
            id: id.to_string(),
            from: ticket.status,
            to,
        });
    }

    let from = ticket.status;
    ticket.status = to;
    ticket.sync_workflow(env.clock.now());
    ticket.record(audit(env, actor, action, details));

    tracing::info!(ticket_id = %id, from = ?from, to = ?to, "Ticket status changed");
    Ok(smallvec![])
}

fn mark_paid(
    state: &mut ConsoleState,
    id: &TicketId,
    actor: &str,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    let ticket = state
        .ticket(id)
        .ok_or_else(|| ConsoleError::not_found(Entity::Ticket, id))?;
    if !ticket.status.can_transition_to(TicketStatus::Paid) {
        return Err(ConsoleError::InvalidTransition {
            id: id.to_string(),
            from: ticket.status,
            to: TicketStatus::Paid,
        });
    }
    let amount = ticket.fine_amount;

    // Settle the ticket's open payment if it has one.
    let payment_id = state
        .payments
        .iter()
        .find(|payment| {
            &payment.ticket_id == id
                && matches!(payment.status, PaymentStatus::Pending | PaymentStatus::Overdue)
        })
        .map_or_else(
            || {
                PaymentId::new(unique_id(env.ids.as_ref(), PaymentId::PREFIX, |candidate| {
                    state.payment(&PaymentId::from(candidate)).is_some()
                }))
            },
            |payment| payment.id.clone(),
        );
    let transaction_id = format!("TRX-{}", env.ids.next_token());

    let now = env.clock.now();
    let Some(ticket) = state.ticket_mut(id) else {
        return Err(ConsoleError::not_found(Entity::Ticket, id));
    };
    ticket.status = TicketStatus::Paid;
    ticket.payment_id = Some(payment_id.clone());
    ticket.sync_workflow(now);
    ticket.record(audit(
        env,
        actor,
        "Ticket manually marked as Paid.",
        format!("Fine: {amount}"),
    ));

    tracing::info!(ticket_id = %id, payment_id = %payment_id, "Ticket marked as paid");

    Ok(smallvec![Effect::chain(vec![
        Effect::Send(ConsoleAction::Payment(PaymentAction::Settle {
            id: payment_id,
            ticket_id: id.clone(),
            amount,
            method: "Manual".to_string(),
            paid_on: now.date_naive(),
            transaction_id,
        })),
        show(Screen::TicketDetail, id_param(id)),
    ])])
}
