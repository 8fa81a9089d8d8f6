//! The console facade used by a presentation layer.
//!
//! [`ParkingConsole`] owns the [`Store`] and turns user intents into actions.
//! Mutators that the UI follows with a screen change (create, edit, delete,
//! mark-paid) get it from the reducer, in the same commit as the mutation.

use crate::aggregates::officer::{OfficerAction, OfficerDraft, OfficerPatch};
use crate::aggregates::payment::{PaymentAction, PaymentDraft, PaymentPatch};
use crate::aggregates::ticket::{TicketAction, TicketDraft, TicketPatch};
use crate::config::ConsoleConfig;
use crate::dashboard::{self, Activity, DashboardSummary};
use crate::error::{ConsoleError, Entity, Result};
use crate::navigation::{NavigationAction, Params, Screen, SessionAction, View};
use crate::query::{self, OfficerFilter, QueryAction, SortKey, StatusFilter};
use crate::reducer::{ConsoleAction, ConsoleEnvironment, ConsoleReducer, ConsoleState};
use crate::seed;
use crate::types::{
    Officer, OfficerId, Payment, PaymentId, PaymentStatus, StatusBadge, Ticket, TicketId,
};
use parking_console_runtime::{Store, StoreConfig};
use serde::Serialize;

type ConsoleStore = Store<ConsoleState, ConsoleAction, ConsoleEnvironment, ConsoleReducer>;

// Creates append, so a committed create leaves its record last.
const NEWEST: &str = "<newest>";

/// A payment list row with its derived status
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow<'a> {
    /// The payment
    pub payment: &'a Payment,
    /// Status as of today
    pub status: PaymentStatus,
    /// Badge for `status`
    pub badge: StatusBadge,
}

/// Parking console application
pub struct ParkingConsole {
    store: ConsoleStore,
    config: ConsoleConfig,
}

impl ParkingConsole {
    /// Creates a console with the system clock and random ids
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_environment(config, ConsoleEnvironment::production())
    }

    /// Creates a console with injected dependencies, seeding demo data when
    /// the config asks for it
    #[must_use]
    pub fn with_environment(config: ConsoleConfig, env: ConsoleEnvironment) -> Self {
        let state = if config.seed_demo_data {
            seed::demo_state(env.ids.as_ref(), env.clock.today())
        } else {
            ConsoleState::default()
        };
        Self::from_state(config, state, env)
    }

    /// Creates a console around an existing state
    #[must_use]
    pub fn from_state(config: ConsoleConfig, state: ConsoleState, env: ConsoleEnvironment) -> Self {
        let env = env.with_payment_due_days(config.payment_due_days);
        tracing::info!(
            tickets = state.tickets.len(),
            payments = state.payments.len(),
            officers = state.officers.len(),
            "Console started"
        );
        let store = Store::with_config(
            state,
            ConsoleReducer::new(),
            env,
            StoreConfig::new(config.max_dispatch_depth),
        );
        Self { store, config }
    }

    fn send(&mut self, action: ConsoleAction) -> Result<()> {
        self.store.send(action).map_err(ConsoleError::from)
    }

    /// Committed state
    #[must_use]
    pub fn state(&self) -> &ConsoleState {
        self.store.snapshot()
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Serializes the committed state for a presentation layer
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the state cannot be encoded.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self.state())
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    /// Issues a ticket and shows it
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Validation`] for an invalid draft,
    /// [`ConsoleError::LoginRequired`] without an admin session.
    pub fn create_ticket(&mut self, draft: TicketDraft) -> Result<TicketId> {
        self.send(ConsoleAction::Ticket(TicketAction::Create(draft)))?;
        let id = self
            .state()
            .tickets
            .last()
            .map(|ticket| ticket.id.clone())
            .ok_or_else(|| ConsoleError::not_found(Entity::Ticket, NEWEST))?;
        Ok(id)
    }

    /// Edits a ticket and shows it
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`], [`ConsoleError::Validation`] or
    /// [`ConsoleError::LoginRequired`].
    pub fn update_ticket(&mut self, id: &TicketId, patch: TicketPatch) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::Update {
            id: id.clone(),
            patch,
        }))
    }

    /// Deletes a ticket and returns to the list
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] or [`ConsoleError::LoginRequired`].
    pub fn delete_ticket(&mut self, id: &TicketId) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::Delete { id: id.clone() }))
    }

    /// Marks a ticket as reviewed
    ///
    /// # Errors
    ///
    /// [`ConsoleError::InvalidTransition`] unless the ticket is Issued.
    pub fn review_ticket(&mut self, id: &TicketId, note: impl Into<String>) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::Review {
            id: id.clone(),
            note: note.into(),
        }))
    }

    /// Records an appeal
    ///
    /// # Errors
    ///
    /// [`ConsoleError::InvalidTransition`] unless the ticket is Issued or
    /// Reviewed.
    pub fn appeal_ticket(&mut self, id: &TicketId, reason: impl Into<String>) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::Appeal {
            id: id.clone(),
            reason: reason.into(),
        }))
    }

    /// Marks a ticket as paid and shows it
    ///
    /// # Errors
    ///
    /// [`ConsoleError::InvalidTransition`] if it is already Paid.
    pub fn mark_paid(&mut self, id: &TicketId) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::MarkPaid { id: id.clone() }))
    }

    /// Rejects a ticket
    ///
    /// # Errors
    ///
    /// [`ConsoleError::InvalidTransition`] from Paid, Rejected or Resolved.
    pub fn reject_ticket(&mut self, id: &TicketId, reason: impl Into<String>) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::Reject {
            id: id.clone(),
            reason: reason.into(),
        }))
    }

    /// Resolves a ticket without collecting the fine
    ///
    /// # Errors
    ///
    /// [`ConsoleError::InvalidTransition`] from Paid, Rejected or Resolved.
    pub fn resolve_ticket(&mut self, id: &TicketId, note: impl Into<String>) -> Result<()> {
        self.send(ConsoleAction::Ticket(TicketAction::Resolve {
            id: id.clone(),
            note: note.into(),
        }))
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Records a payment
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Validation`] or [`ConsoleError::LoginRequired`].
    pub fn create_payment(&mut self, draft: PaymentDraft) -> Result<PaymentId> {
        self.send(ConsoleAction::Payment(PaymentAction::Create(draft)))?;
        self.state()
            .payments
            .last()
            .map(|payment| payment.id.clone())
            .ok_or_else(|| ConsoleError::not_found(Entity::Payment, NEWEST))
    }

    /// Edits a payment
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`], [`ConsoleError::Validation`] or
    /// [`ConsoleError::LoginRequired`].
    pub fn update_payment(&mut self, id: &PaymentId, patch: PaymentPatch) -> Result<()> {
        self.send(ConsoleAction::Payment(PaymentAction::Update {
            id: id.clone(),
            patch,
        }))
    }

    /// Deletes a payment and returns to the list
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] or [`ConsoleError::LoginRequired`].
    pub fn delete_payment(&mut self, id: &PaymentId) -> Result<()> {
        self.send(ConsoleAction::Payment(PaymentAction::Delete { id: id.clone() }))
    }

    // ------------------------------------------------------------------
    // Officers
    // ------------------------------------------------------------------

    /// Adds an officer
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Validation`] or [`ConsoleError::LoginRequired`].
    pub fn create_officer(&mut self, draft: OfficerDraft) -> Result<OfficerId> {
        self.send(ConsoleAction::Officer(OfficerAction::Create(draft)))?;
        self.state()
            .officers
            .last()
            .map(|officer| officer.id.clone())
            .ok_or_else(|| ConsoleError::not_found(Entity::Officer, NEWEST))
    }

    /// Edits an officer
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`], [`ConsoleError::Validation`] or
    /// [`ConsoleError::LoginRequired`].
    pub fn update_officer(&mut self, id: &OfficerId, patch: OfficerPatch) -> Result<()> {
        self.send(ConsoleAction::Officer(OfficerAction::Update {
            id: id.clone(),
            patch,
        }))
    }

    /// Deletes an officer and returns to the list
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NotFound`] or [`ConsoleError::LoginRequired`].
    pub fn delete_officer(&mut self, id: &OfficerId) -> Result<()> {
        self.send(ConsoleAction::Officer(OfficerAction::Delete { id: id.clone() }))
    }

    // ------------------------------------------------------------------
    // Navigation and session
    // ------------------------------------------------------------------

    /// Replaces the current route. Any screen identifier is accepted.
    ///
    /// # Errors
    ///
    /// Only the store's dispatch limit can fail a navigation.
    pub fn navigate(&mut self, screen: Screen, params: Params) -> Result<()> {
        self.send(ConsoleAction::Navigation(NavigationAction::Navigate {
            screen,
            params,
        }))
    }

    /// Signs in as the built-in admin
    ///
    /// # Errors
    ///
    /// Only the store's dispatch limit can fail a login.
    pub fn login(&mut self) -> Result<()> {
        self.send(ConsoleAction::Session(SessionAction::Login))
    }

    /// Signs out and goes to the login screen
    ///
    /// # Errors
    ///
    /// Only the store's dispatch limit can fail a logout.
    pub fn logout(&mut self) -> Result<()> {
        self.send(ConsoleAction::Session(SessionAction::Logout))
    }

    /// What to render for the current route
    #[must_use]
    pub fn view(&self) -> View {
        self.state().view()
    }

    // ------------------------------------------------------------------
    // List queries
    // ------------------------------------------------------------------

    /// Applies a list-query change
    ///
    /// # Errors
    ///
    /// Only the store's dispatch limit can fail a query change.
    pub fn query(&mut self, action: QueryAction) -> Result<()> {
        self.send(ConsoleAction::Query(action))
    }

    /// Sets the ticket search text
    ///
    /// # Errors
    ///
    /// See [`ParkingConsole::query`].
    pub fn set_search(&mut self, search: impl Into<String>) -> Result<()> {
        self.query(QueryAction::SetSearch(search.into()))
    }

    /// Sets the ticket status filter
    ///
    /// # Errors
    ///
    /// See [`ParkingConsole::query`].
    pub fn set_status_filter(&mut self, filter: StatusFilter) -> Result<()> {
        self.query(QueryAction::SetStatusFilter(filter))
    }

    /// Sets the ticket officer filter
    ///
    /// # Errors
    ///
    /// See [`ParkingConsole::query`].
    pub fn set_officer_filter(&mut self, filter: OfficerFilter) -> Result<()> {
        self.query(QueryAction::SetOfficerFilter(filter))
    }

    /// Column-header click on the ticket list
    ///
    /// # Errors
    ///
    /// See [`ParkingConsole::query`].
    pub fn sort_by(&mut self, key: SortKey) -> Result<()> {
        self.query(QueryAction::SortBy(key))
    }

    /// Tickets matching the list query, sorted
    #[must_use]
    pub fn tickets_view(&self) -> Vec<&Ticket> {
        self.state().list_query.run(&self.state().tickets)
    }

    /// Payments matching `search`, with their status as of today
    #[must_use]
    pub fn payments_view(&self, search: &str) -> Vec<PaymentRow<'_>> {
        let state = self.state();
        let today = self.store.environment().clock.today();
        query::filter_payments(&state.payments, search)
            .into_iter()
            .map(|payment| {
                let status = state.payment_status(payment, today);
                PaymentRow {
                    payment,
                    status,
                    badge: status.badge(),
                }
            })
            .collect()
    }

    /// Officers matching `search`
    #[must_use]
    pub fn officers_view(&self, search: &str) -> Vec<&Officer> {
        query::filter_officers(&self.state().officers, search)
    }

    /// Dashboard figures
    #[must_use]
    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::compute(&self.state().tickets, self.config.recent_activity_limit)
    }

    /// Every audit entry across all tickets, newest first. Backs the
    /// `AUDIT_LOG` screen reached from the dashboard's "View All".
    #[must_use]
    pub fn audit_feed(&self) -> Vec<Activity> {
        dashboard::recent_activity(&self.state().tickets, usize::MAX)
    }
}

impl std::fmt::Debug for ParkingConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingConsole")
            .field("config", &self.config)
            .field("route", &self.state().route)
            .finish_non_exhaustive()
    }
}
