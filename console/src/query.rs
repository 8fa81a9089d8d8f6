//! Filter, sort and search over the console collections.
//!
//! Everything here is a pure function of its inputs: nothing is cached, and
//! the collections are never modified. Results borrow from the input slice.

use crate::types::{Officer, Payment, Ticket, TicketStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Case-insensitive substring match; an empty needle matches everything
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

// ============================================================================
// Filters
// ============================================================================

/// Ticket status filter selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    /// No status restriction
    #[default]
    All,
    /// Only tickets with this status
    Only(TicketStatus),
}

impl StatusFilter {
    /// True when `status` passes the filter
    #[must_use]
    pub fn matches(self, status: TicketStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = crate::types::ParseStatusError;

    /// `ALL` or a ticket status identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ALL" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Officer filter selection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfficerFilter {
    /// No officer restriction
    #[default]
    All,
    /// Only tickets issued by this officer id
    Only(String),
}

impl OfficerFilter {
    /// True when `officer_id` passes the filter
    #[must_use]
    pub fn matches(&self, officer_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == officer_id,
        }
    }
}

impl From<&str> for OfficerFilter {
    /// `ALL` or an officer id
    fn from(s: &str) -> Self {
        if s == "ALL" {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }
}

/// Criteria for [`filter_tickets`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCriteria {
    /// Status selection
    pub status: StatusFilter,
    /// Officer selection
    pub officer: OfficerFilter,
    /// Free-text search
    pub search: String,
}

/// Tickets passing every criterion, in input order.
///
/// Search matches case-insensitively against the ticket id, license plate,
/// officer name and violation type.
#[must_use]
pub fn filter_tickets<'a>(tickets: &'a [Ticket], criteria: &TicketCriteria) -> Vec<&'a Ticket> {
    let needle = criteria.search.to_lowercase();
    tickets
        .iter()
        .filter(|ticket| criteria.status.matches(ticket.status))
        .filter(|ticket| criteria.officer.matches(ticket.officer_id.as_str()))
        .filter(|ticket| {
            needle.is_empty()
                || [
                    ticket.id.as_str(),
                    ticket.vehicle.license_plate.as_str(),
                    ticket.officer_name.as_str(),
                    ticket.violation_type.as_str(),
                ]
                .into_iter()
                .any(|field| contains_ignore_case(field, &needle))
        })
        .collect()
}

/// Payments whose ticket id or payer name contains `search`
#[must_use]
pub fn filter_payments<'a>(payments: &'a [Payment], search: &str) -> Vec<&'a Payment> {
    let needle = search.to_lowercase();
    payments
        .iter()
        .filter(|payment| {
            contains_ignore_case(payment.ticket_id.as_str(), &needle)
                || contains_ignore_case(&payment.payer_name, &needle)
        })
        .collect()
}

/// Officers whose name or badge id contains `search`
#[must_use]
pub fn filter_officers<'a>(officers: &'a [Officer], search: &str) -> Vec<&'a Officer> {
    let needle = search.to_lowercase();
    officers
        .iter()
        .filter(|officer| {
            contains_ignore_case(&officer.name, &needle)
                || contains_ignore_case(&officer.badge_id, &needle)
        })
        .collect()
}

// ============================================================================
// Sorting
// ============================================================================

/// Sortable ticket column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)] // variants are the ticket table columns
pub enum SortKey {
    Id,
    LicensePlate,
    ViolationType,
    FineAmount,
    IssueDate,
    DueDate,
    Status,
    OfficerName,
    Location,
    /// Settling payment; absent on unpaid tickets
    PaymentId,
}

impl SortKey {
    /// Every sort key
    pub const ALL: [Self; 10] = [
        Self::Id,
        Self::LicensePlate,
        Self::ViolationType,
        Self::FineAmount,
        Self::IssueDate,
        Self::DueDate,
        Self::Status,
        Self::OfficerName,
        Self::Location,
        Self::PaymentId,
    ];

    /// Column identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::LicensePlate => "licensePlate",
            Self::ViolationType => "violationType",
            Self::FineAmount => "fineAmount",
            Self::IssueDate => "issueDate",
            Self::DueDate => "dueDate",
            Self::Status => "status",
            Self::OfficerName => "officerName",
            Self::Location => "location",
            Self::PaymentId => "paymentId",
        }
    }

    /// The value this column holds for `ticket`
    #[must_use]
    pub fn value(self, ticket: &Ticket) -> SortValue<'_> {
        match self {
            Self::Id => SortValue::Text(ticket.id.as_str()),
            Self::LicensePlate => SortValue::Text(&ticket.vehicle.license_plate),
            Self::ViolationType => SortValue::Text(&ticket.violation_type),
            Self::FineAmount => SortValue::Number(ticket.fine_amount.cents()),
            Self::IssueDate => SortValue::Date(ticket.issue_date),
            Self::DueDate => SortValue::Date(ticket.due_date),
            Self::Status => SortValue::Text(ticket.status.label()),
            Self::OfficerName => SortValue::Text(&ticket.officer_name),
            Self::Location => SortValue::Text(&ticket.location),
            Self::PaymentId => ticket
                .payment_id
                .as_ref()
                .map_or(SortValue::Missing, |id| SortValue::Text(id.as_str())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a column identifier is not sortable
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot sort by '{0}'")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParseSortKeyError(s.to_string()))
    }
}

/// A column value, typed for comparison
#[derive(Clone, Copy, Debug)]
pub enum SortValue<'a> {
    /// Compared case-insensitively
    Text(&'a str),
    /// Compared numerically
    Number(u64),
    /// Compared chronologically
    Date(NaiveDate),
    /// No value; equal to other missing values, after everything else
    Missing,
}

impl SortValue<'_> {
    /// True for [`SortValue::Missing`]
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Text(_) => 0,
            Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Missing => 3,
        }
    }
}

impl Ord for SortValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase)),
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            // Mixed kinds only meet when a column is absent on some rows.
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialEq for SortValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue<'_> {}

impl PartialOrd for SortValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

/// Current sort column and direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Column
    pub key: SortKey,
    /// Direction
    pub direction: SortDirection,
}

impl SortState {
    /// Sort by `key` in `direction`
    #[must_use]
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Column-header click: the current column while ascending flips to
    /// descending, anything else sorts ascending by `key`.
    #[must_use]
    pub fn select(self, key: SortKey) -> Self {
        if self.key == key && self.direction == SortDirection::Asc {
            Self::new(key, SortDirection::Desc)
        } else {
            Self::new(key, SortDirection::Asc)
        }
    }
}

impl Default for SortState {
    /// Newest issue date first
    fn default() -> Self {
        Self::new(SortKey::IssueDate, SortDirection::Desc)
    }
}

/// Sorts `tickets` by `sort`. The sort is stable: tickets with equal values
/// keep their input order in both directions. Tickets without a value for
/// the column come last in both directions.
#[must_use]
pub fn sort_tickets(mut tickets: Vec<&Ticket>, sort: SortState) -> Vec<&Ticket> {
    tickets.sort_by(|a, b| {
        let (a, b) = (sort.key.value(a), sort.key.value(b));
        a.is_missing().cmp(&b.is_missing()).then_with(|| {
            let ordering = a.cmp(&b);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        })
    });
    tickets
}

// ============================================================================
// List query state
// ============================================================================

/// Transient list-screen state: search text, filter selections and sort
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Search text and filter selections
    pub criteria: TicketCriteria,
    /// Sort column and direction
    pub sort: SortState,
}

impl ListQuery {
    /// Applies a UI change
    pub fn apply(&mut self, action: QueryAction) {
        match action {
            QueryAction::SetSearch(search) => self.criteria.search = search,
            QueryAction::SetStatusFilter(status) => self.criteria.status = status,
            QueryAction::SetOfficerFilter(officer) => self.criteria.officer = officer,
            QueryAction::SortBy(key) => self.sort = self.sort.select(key),
            QueryAction::ClearFilters => self.criteria = TicketCriteria::default(),
        }
    }

    /// Filtered and sorted tickets
    #[must_use]
    pub fn run<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        sort_tickets(filter_tickets(tickets, &self.criteria), self.sort)
    }
}

/// Changes to the list query
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryAction {
    /// Replace the search text
    SetSearch(String),
    /// Replace the status filter
    SetStatusFilter(StatusFilter),
    /// Replace the officer filter
    SetOfficerFilter(OfficerFilter),
    /// Column-header click
    SortBy(SortKey),
    /// Reset search and both filters; the sort is kept
    ClearFilters,
}
