//! Error types for the parking console.

use crate::types::TicketStatus;
use parking_console_runtime::StoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors returned by console mutators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    // ═══════════════════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════════════════
    /// One or more fields failed validation; nothing was persisted
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Lookup by id found nothing
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity looked up
        entity: Entity,
        /// Identifier that was not found
        id: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle Errors
    // ═══════════════════════════════════════════════════════════════════════
    /// A lifecycle command was issued from a status that does not allow it
    #[error("ticket {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Ticket the command targeted
        id: String,
        /// Current status
        from: TicketStatus,
        /// Requested status
        to: TicketStatus,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════════════════
    /// A mutation was attempted without an Admin session
    #[error("login required")]
    LoginRequired,

    // ═══════════════════════════════════════════════════════════════════════
    // Runtime Errors
    // ═══════════════════════════════════════════════════════════════════════
    /// The store stopped a runaway chain of follow-up actions
    #[error("dispatch limit of {limit} follow-up actions exceeded")]
    DispatchLimitExceeded {
        /// Configured limit
        limit: usize,
    },
}

impl ConsoleError {
    /// Shorthand for a [`ConsoleError::NotFound`]
    #[must_use]
    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Validation errors, if this is a validation failure
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ConsoleError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError<ConsoleError>> for ConsoleError {
    fn from(error: StoreError<ConsoleError>) -> Self {
        match error {
            StoreError::Rejected(error) => error,
            StoreError::DispatchLimitExceeded { limit } => Self::DispatchLimitExceeded { limit },
        }
    }
}

/// Kind of entity held by the console
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Entity {
    /// A ticket
    Ticket,
    /// A payment
    Payment,
    /// An officer
    Officer,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ticket => "ticket",
            Self::Payment => "payment",
            Self::Officer => "officer",
        })
    }
}

/// A form field that can fail validation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Violation type
    ViolationType,
    /// Fine amount
    FineAmount,
    /// Vehicle license plate
    LicensePlate,
    /// Issuing officer
    OfficerId,
    /// Issue date
    IssueDate,
    /// Due date
    DueDate,
    /// Violation location
    Location,
    /// Ticket status
    Status,
    /// Ticket reference of a payment
    TicketId,
    /// Payment amount
    Amount,
    /// Officer name
    Name,
    /// Officer badge number
    BadgeId,
    /// Officer email
    Email,
}

impl Field {
    /// Form field name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViolationType => "violationType",
            Self::FineAmount => "fineAmount",
            Self::LicensePlate => "licensePlate",
            Self::OfficerId => "officerId",
            Self::IssueDate => "issueDate",
            Self::DueDate => "dueDate",
            Self::Location => "location",
            Self::Status => "status",
            Self::TicketId => "ticketId",
            Self::Amount => "amount",
            Self::Name => "name",
            Self::BadgeId => "badgeId",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failing field
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field that failed
    pub field: Field,
    /// Message for the form
    pub message: String,
}

/// Every failing field of a submission, in form order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a failing field
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Records `message` for `field` when `failed` is true
    pub fn check(&mut self, failed: bool, field: Field, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    /// True when nothing failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `field` failed
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Failing fields in form order
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|e| e.field).collect()
    }

    /// Iterates over the failures
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise the failures as a [`ConsoleError`]
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] when any field failed.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConsoleError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}
