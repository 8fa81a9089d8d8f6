//! Demo data.
//!
//! Generation is deterministic for a given id generator and reference date:
//! the same inputs always produce the same collections.

use crate::reducer::ConsoleState;
use crate::types::{
    AuditEntry, Money, Officer, OfficerId, OfficerStatus, Payment, PaymentId, PaymentStatus,
    Ticket, TicketId, TicketRecord, TicketStatus, Vehicle,
};
use crate::workflow::Workflow;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use parking_console_core::environment::IdGenerator;

/// A violation type with its fine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Description
    pub kind: &'static str,
    /// Code
    pub code: &'static str,
    /// Fine
    pub fine: Money,
}

/// The violation catalogue
pub const VIOLATIONS: [Violation; 5] = [
    Violation { kind: "No Parking Zone", code: "VPK-001", fine: Money::from_dollars(75) },
    Violation { kind: "Expired Meter", code: "VMT-002", fine: Money::from_dollars(50) },
    Violation { kind: "Handicapped Space", code: "VHP-003", fine: Money::from_dollars(250) },
    Violation { kind: "Overtime Parking", code: "VOT-004", fine: Money::from_dollars(40) },
    Violation { kind: "Double Parking", code: "VDP-005", fine: Money::from_dollars(100) },
];

const OFFICERS: [(&str, &str, &str, &str, OfficerStatus); 5] = [
    ("Officer John Doe", "OPD-101", "john.doe@city.gov", "555-0101", OfficerStatus::Active),
    ("Officer Jane Smith", "OPD-102", "jane.smith@city.gov", "555-0102", OfficerStatus::Active),
    ("Officer Mike Johnson", "OPD-103", "mike.j@city.gov", "555-0103", OfficerStatus::Active),
    ("Officer Emily White", "OPD-104", "emily.w@city.gov", "555-0104", OfficerStatus::Inactive),
    ("Officer David Brown", "OPD-105", "david.b@city.gov", "555-0105", OfficerStatus::Active),
];

const VEHICLES: [(&str, &str, &str, &str); 5] = [
    ("ABC-123", "Toyota", "Camry", "Silver"),
    ("XYZ-789", "Honda", "CRV", "Blue"),
    ("DEF-456", "Ford", "F-150", "Black"),
    ("GHI-012", "BMW", "X5", "White"),
    ("JKL-345", "Nissan", "Altima", "Red"),
];

/// Ticket statuses in seed order: 3 Issued, 2 Reviewed, 1 Appealed, 2 Paid,
/// 1 Rejected, 1 Resolved
const TICKET_STATUSES: [TicketStatus; 10] = [
    TicketStatus::Issued,
    TicketStatus::Issued,
    TicketStatus::Issued,
    TicketStatus::Reviewed,
    TicketStatus::Reviewed,
    TicketStatus::Appealed,
    TicketStatus::Paid,
    TicketStatus::Paid,
    TicketStatus::Rejected,
    TicketStatus::Resolved,
];

const PAYER_NAME: &str = "John Citizen";
const PAYER_EMAIL: &str = "john.citizen@example.com";
const FIRST_PAYMENT_NUMBER: usize = 2000;
const DUE_DAYS: i64 = 14;

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// The five demo officers
#[must_use]
pub fn officers(ids: &dyn IdGenerator) -> Vec<Officer> {
    OFFICERS
        .iter()
        .map(|&(name, badge_id, email, phone, status)| Officer {
            id: OfficerId::new(ids.next_token()),
            badge_id: badge_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            status,
        })
        .collect()
}

fn seed_ticket(
    index: usize,
    status: TicketStatus,
    officer: &Officer,
    ids: &dyn IdGenerator,
    today: NaiveDate,
) -> Ticket {
    let violation = VIOLATIONS[(index * 2) % VIOLATIONS.len()];
    let (license_plate, make, model, color) = VEHICLES[(index * 3) % VEHICLES.len()];
    let days_ago = i64::try_from((index * 11 + 3) % 30).unwrap_or_default();
    let issue_date = today - Duration::days(days_ago);
    let due_date = issue_date + Duration::days(DUE_DAYS);
    let number = TicketId::FIRST_NUMBER + u32::try_from(index).unwrap_or_default();
    let issued_at = midnight(issue_date);

    let mut audit_log = vec![AuditEntry::new(
        issued_at,
        officer.name.clone(),
        format!("Ticket {} issued.", violation.code),
        format!("Initial fine: {}", violation.fine),
    )];
    let mut payment_id = None;
    let follow_up = match status {
        TicketStatus::Issued => None,
        TicketStatus::Reviewed => Some((3, "Admin", "Ticket reviewed.", "Evidence confirmed.".to_string())),
        TicketStatus::Appealed => Some((
            7,
            "Citizen",
            "Appeal initiated.",
            "Reason: Incorrect vehicle identified.".to_string(),
        )),
        TicketStatus::Rejected => Some((10, "Admin", "Ticket rejected.", "Issue date missing.".to_string())),
        TicketStatus::Resolved => Some((
            20,
            "Admin",
            "Ticket resolved (warning issued).",
            "No fine collected.".to_string(),
        )),
        TicketStatus::Paid => {
            payment_id = Some(PaymentId::new(format!("{}{}", PaymentId::PREFIX, ids.next_token())));
            Some((
                DUE_DAYS - 5,
                "Citizen",
                "Payment received.",
                format!("Amount: {}", violation.fine),
            ))
        },
    };
    if let Some((days, actor, action, details)) = follow_up {
        audit_log.push(AuditEntry::new(issued_at + Duration::days(days), actor, action, details));
    }

    let record = TicketRecord {
        id: TicketId::from_number(number),
        violation_type: violation.kind.to_string(),
        violation_code: violation.code.to_string(),
        fine_amount: violation.fine,
        status,
        vehicle: Vehicle {
            license_plate: license_plate.to_string(),
            make: make.to_string(),
            model: model.to_string(),
            color: color.to_string(),
        },
        officer_id: officer.id.clone(),
        officer_name: officer.name.clone(),
        location: format!("Main St & {} Ave", char::from(b'A' + u8::try_from(index % 26).unwrap_or_default())),
        issue_date,
        due_date,
        payment_id,
        photos: vec![format!("/images/photo_{}.jpg", index + 1)],
        notes: format!(
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit. This is a note for ticket {number}."
        ),
    };
    Ticket::from_record(record, audit_log, Workflow::seeded(status, issue_date))
}

fn seed_payment(index: usize, ticket: &Ticket, ids: &dyn IdGenerator) -> Payment {
    let id = ticket
        .payment_id
        .clone()
        .unwrap_or_else(|| PaymentId::new(format!("{}{}", PaymentId::PREFIX, FIRST_PAYMENT_NUMBER + index)));
    let base = Payment {
        id,
        ticket_id: ticket.id.clone(),
        amount: ticket.fine_amount,
        status: PaymentStatus::Pending,
        method: None,
        paid_on: None,
        transaction_id: None,
        payer_name: PAYER_NAME.to_string(),
        payer_email: PAYER_EMAIL.to_string(),
    };
    if ticket.status != TicketStatus::Paid {
        return base;
    }

    let offset = i64::try_from((index * 7) % 10).unwrap_or_default();
    let method = if index % 2 == 0 { "Credit Card" } else { "Online Banking" };
    Payment {
        status: PaymentStatus::Paid,
        method: Some(method.to_string()),
        paid_on: Some(ticket.issue_date + Duration::days(offset)),
        transaction_id: Some(format!("TRX-{}", ids.next_token())),
        ..base
    }
}

/// The ten demo tickets issued by `officers`
///
/// Ticket `i` is issued by officer `i mod len`. Returns nothing when there
/// are no officers to issue them.
#[must_use]
pub fn tickets(officers: &[Officer], ids: &dyn IdGenerator, today: NaiveDate) -> Vec<Ticket> {
    if officers.is_empty() {
        return Vec::new();
    }
    TICKET_STATUSES
        .iter()
        .enumerate()
        .map(|(index, &status)| {
            seed_ticket(index, status, &officers[index % officers.len()], ids, today)
        })
        .collect()
}

/// One payment per ticket
#[must_use]
pub fn payments(tickets: &[Ticket], ids: &dyn IdGenerator) -> Vec<Payment> {
    tickets
        .iter()
        .enumerate()
        .map(|(index, ticket)| seed_payment(index, ticket, ids))
        .collect()
}

/// A signed-in console holding the demo collections, as of `today`
#[must_use]
pub fn demo_state(ids: &dyn IdGenerator, today: NaiveDate) -> ConsoleState {
    let officers = officers(ids);
    let tickets = tickets(&officers, ids, today);
    let payments = payments(&tickets, ids);
    let next_ticket_number =
        TicketId::FIRST_NUMBER + u32::try_from(tickets.len()).unwrap_or_default();
    ConsoleState {
        tickets,
        payments,
        officers,
        next_ticket_number,
        ..ConsoleState::default()
    }
}
