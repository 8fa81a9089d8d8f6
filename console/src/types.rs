//! Domain types for the parking console.
//!
//! This module contains the value objects and entities of the console:
//! identifiers, money, the three status enumerations with their badge tables,
//! and the Ticket, Payment and Officer records.

use crate::workflow::Workflow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket (`TKT-1000`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// First ticket number handed out by a fresh store
    pub const FIRST_NUMBER: u32 = 1000;

    /// Wraps an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the identifier for a ticket number
    #[must_use]
    pub fn from_number(number: u32) -> Self {
        Self(format!("TKT-{number}"))
    }

    /// Returns the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for a payment (`PMT-2000`, `PMT-K3J9Q0ZQ1`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Prefix shared by all payment identifiers
    pub const PREFIX: &'static str = "PMT-";

    /// Wraps an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for an officer (a bare generated token)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficerId(String);

impl OfficerId {
    /// Wraps an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfficerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OfficerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero dollars
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole dollars, saturating on overflow
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is strictly positive
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Adds two amounts, saturating on overflow
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// Why a money string could not be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    /// Nothing to parse
    #[error("amount is empty")]
    Empty,

    /// Not a plain decimal amount
    #[error("'{0}' is not a valid amount")]
    Invalid(String),

    /// More than two decimal places
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),

    /// Too large to represent
    #[error("'{0}' is too large")]
    Overflow(String),
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Parses `75`, `75.5`, `75.00` or `$75.00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() && fraction.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(MoneyParseError::Invalid(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(s.to_string());
        let dollars: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse().map_err(|_| overflow())?,
        };

        dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .ok_or_else(overflow)
    }
}

// ============================================================================
// Status badges
// ============================================================================

/// Visual tone of a status badge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    /// Waiting on someone
    Pending,
    /// Settled or in good standing
    Success,
    /// Disputed, refused or inactive
    Danger,
    /// Closed favourably without payment
    Approved,
    /// Past due
    Overdue,
    /// Informational
    Info,
}

/// Label and tone for rendering a status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    /// Human-readable label
    pub label: &'static str,
    /// Visual tone
    pub tone: Tone,
}

impl StatusBadge {
    const fn new(label: &'static str, tone: Tone) -> Self {
        Self { label, tone }
    }
}

/// Error returned when a status string does not name a known status
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} status '{value}'")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

// ============================================================================
// Ticket status
// ============================================================================

/// Lifecycle status of a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Written by an officer, not yet looked at
    Issued,
    /// Evidence checked by an administrator
    Reviewed,
    /// Disputed by the vehicle owner
    Appealed,
    /// Fine settled
    Paid,
    /// Thrown out
    Rejected,
    /// Closed without collecting the fine
    Resolved,
}

impl TicketStatus {
    /// Every ticket status, in lifecycle order
    pub const ALL: [Self; 6] = [
        Self::Issued,
        Self::Reviewed,
        Self::Appealed,
        Self::Paid,
        Self::Rejected,
        Self::Resolved,
    ];

    /// Stable identifier used by filters and serialized state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "ISSUED",
            Self::Reviewed => "REVIEWED",
            Self::Appealed => "APPEALED",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
            Self::Resolved => "RESOLVED",
        }
    }

    /// Badge lookup for ticket statuses
    #[must_use]
    pub const fn badge(self) -> StatusBadge {
        match self {
            Self::Issued => StatusBadge::new("Issued", Tone::Pending),
            Self::Reviewed => StatusBadge::new("Reviewed", Tone::Pending),
            Self::Appealed => StatusBadge::new("Appealed", Tone::Danger),
            Self::Paid => StatusBadge::new("Paid", Tone::Success),
            Self::Rejected => StatusBadge::new("Rejected", Tone::Danger),
            Self::Resolved => StatusBadge::new("Resolved", Tone::Approved),
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.badge().label
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseStatusError;

    /// Accepts the identifier (`PAID`) or the label (`Paid`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(s) || status.label().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| ParseStatusError {
                kind: "ticket",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Payment status
// ============================================================================

/// Settlement status of a payment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Awaiting payment, not yet due
    Pending,
    /// Settled
    Paid,
    /// Awaiting payment past the ticket's due date
    Overdue,
    /// Settled then returned
    Refunded,
}

impl PaymentStatus {
    /// Every payment status
    pub const ALL: [Self; 4] = [Self::Pending, Self::Paid, Self::Overdue, Self::Refunded];

    /// Stable identifier used by serialized state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Badge lookup for payment statuses
    #[must_use]
    pub const fn badge(self) -> StatusBadge {
        match self {
            Self::Pending => StatusBadge::new("Pending", Tone::Pending),
            Self::Paid => StatusBadge::new("Paid", Tone::Success),
            Self::Overdue => StatusBadge::new("Overdue", Tone::Overdue),
            Self::Refunded => StatusBadge::new("Refunded", Tone::Info),
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.badge().label
    }

    /// Resolves the status to show for a payment.
    ///
    /// Paid and Refunded are authoritative. Anything else is derived from the
    /// ticket's due date: Overdue once `today` is past it, Pending otherwise
    /// (and Pending when no due date is known).
    #[must_use]
    pub fn effective(self, due_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match self {
            Self::Paid | Self::Refunded => self,
            Self::Pending | Self::Overdue => match due_date {
                Some(due) if today > due => Self::Overdue,
                _ => Self::Pending,
            },
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStatusError {
                kind: "payment",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Officer status
// ============================================================================

/// Employment status of an officer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfficerStatus {
    /// On duty roster
    #[default]
    Active,
    /// Off roster
    Inactive,
}

impl OfficerStatus {
    /// Badge lookup for officer statuses
    #[must_use]
    pub const fn badge(self) -> StatusBadge {
        match self {
            Self::Active => StatusBadge::new("Active", Tone::Success),
            Self::Inactive => StatusBadge::new("Inactive", Tone::Danger),
        }
    }
}

impl fmt::Display for OfficerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge().label)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Vehicle a ticket was written against
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// License plate
    pub license_plate: String,
    /// Manufacturer
    pub make: String,
    /// Model
    pub model: String,
    /// Paint color
    pub color: String,
}

/// One line of a ticket's audit trail
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Who did it
    pub actor: String,
    /// What happened, e.g. `Ticket reviewed.`
    pub action: String,
    /// Free-form detail, e.g. `Fine: $75.00`
    pub details: String,
}

impl AuditEntry {
    /// Creates an entry
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        actor: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            actor: actor.into(),
            action: action.into(),
            details: details.into(),
        }
    }
}

/// A parking-violation citation and its lifecycle
///
/// The audit log and the workflow are only reachable through accessors: the
/// log is append-only and workflow stages only ever move forward, and both
/// are maintained by the ticket reducer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Identifier
    pub id: TicketId,
    /// Violation description, e.g. `No Parking Zone`
    pub violation_type: String,
    /// Violation code, e.g. `VPK-001`
    pub violation_code: String,
    /// Fine amount (always positive)
    pub fine_amount: Money,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Vehicle cited
    pub vehicle: Vehicle,
    /// Issuing officer (weak reference)
    pub officer_id: OfficerId,
    /// Officer display name captured when the officer was assigned
    pub officer_name: String,
    /// Where the violation happened
    pub location: String,
    /// Date the ticket was written
    pub issue_date: NaiveDate,
    /// Date payment is due
    pub due_date: NaiveDate,
    /// Settling payment, set once the ticket is paid
    pub payment_id: Option<PaymentId>,
    /// Evidence photo references, in upload order
    pub photos: Vec<String>,
    /// Free-form notes
    pub notes: String,
    audit_log: Vec<AuditEntry>,
    workflow: Workflow,
}

/// Everything needed to construct a ticket except its history
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TicketRecord {
    pub id: TicketId,
    pub violation_type: String,
    pub violation_code: String,
    pub fine_amount: Money,
    pub status: TicketStatus,
    pub vehicle: Vehicle,
    pub officer_id: OfficerId,
    pub officer_name: String,
    pub location: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_id: Option<PaymentId>,
    pub photos: Vec<String>,
    pub notes: String,
}

impl Ticket {
    pub(crate) fn from_record(
        record: TicketRecord,
        audit_log: Vec<AuditEntry>,
        workflow: Workflow,
    ) -> Self {
        Self {
            id: record.id,
            violation_type: record.violation_type,
            violation_code: record.violation_code,
            fine_amount: record.fine_amount,
            status: record.status,
            vehicle: record.vehicle,
            officer_id: record.officer_id,
            officer_name: record.officer_name,
            location: record.location,
            issue_date: record.issue_date,
            due_date: record.due_date,
            payment_id: record.payment_id,
            photos: record.photos,
            notes: record.notes,
            audit_log,
            workflow,
        }
    }

    /// Audit trail, oldest first
    #[must_use]
    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    /// Workflow progress
    #[must_use]
    pub const fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Appends an audit entry
    pub(crate) fn record(&mut self, entry: AuditEntry) {
        self.audit_log.push(entry);
    }

    /// Advances the workflow to cover the current status
    pub(crate) fn sync_workflow(&mut self, at: DateTime<Utc>) {
        self.workflow.advance(self.status, at);
    }
}

/// Monetary settlement of a ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Identifier
    pub id: PaymentId,
    /// Ticket being settled (weak reference)
    pub ticket_id: TicketId,
    /// Amount due or paid
    pub amount: Money,
    /// Stored status; see [`PaymentStatus::effective`]
    pub status: PaymentStatus,
    /// How it was paid
    pub method: Option<String>,
    /// When it was paid
    pub paid_on: Option<NaiveDate>,
    /// Gateway transaction reference
    pub transaction_id: Option<String>,
    /// Payer name
    pub payer_name: String,
    /// Payer email
    pub payer_email: String,
}

/// An issuing agent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    /// Identifier
    pub id: OfficerId,
    /// Badge number, e.g. `OPD-101`
    pub badge_id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Roster status
    pub status: OfficerStatus,
}
