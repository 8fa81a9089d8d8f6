//! Root reducer for the console.
//!
//! [`ConsoleReducer`] routes each [`ConsoleAction`] to the reducer that owns
//! the affected slice of [`ConsoleState`]. Collection mutations require an
//! Admin session; navigation, session and list-query changes do not.

use crate::aggregates::officer::{self, OfficerAction};
use crate::aggregates::payment::{self, PaymentAction};
use crate::aggregates::ticket::{self, TicketAction};
use crate::error::{ConsoleError, Entity, Result};
use crate::navigation::{NavigationAction, Route, Screen, Session, SessionAction, View};
use crate::query::{ListQuery, QueryAction};
use crate::types::{
    Officer, OfficerId, Payment, PaymentId, PaymentStatus, Ticket, TicketId, TicketStatus,
};
use chrono::NaiveDate;
use parking_console_core::effect::Effect;
use parking_console_core::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use parking_console_core::reducer::{Effects, Reducer};
use parking_console_core::smallvec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// Everything the console holds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleState {
    /// Tickets, in creation order
    pub tickets: Vec<Ticket>,
    /// Payments, in creation order
    pub payments: Vec<Payment>,
    /// Officers, in creation order
    pub officers: Vec<Officer>,
    /// Number of the next ticket to issue
    pub next_ticket_number: u32,
    /// Current navigation state
    pub route: Route,
    /// Who is signed in
    pub session: Session,
    /// Ticket list search, filters and sort
    pub list_query: ListQuery,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            tickets: Vec::new(),
            payments: Vec::new(),
            officers: Vec::new(),
            next_ticket_number: TicketId::FIRST_NUMBER,
            route: Route::default(),
            session: Session::default(),
            list_query: ListQuery::default(),
        }
    }
}

impl ConsoleState {
    /// Ticket by id
    #[must_use]
    pub fn ticket(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| &ticket.id == id)
    }

    pub(crate) fn ticket_mut(&mut self, id: &TicketId) -> Option<&mut Ticket> {
        self.tickets.iter_mut().find(|ticket| &ticket.id == id)
    }

    /// Payment by id
    #[must_use]
    pub fn payment(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|payment| &payment.id == id)
    }

    /// Payments recorded against a ticket
    pub fn payments_for<'a>(&'a self, ticket_id: &'a TicketId) -> impl Iterator<Item = &'a Payment> {
        self.payments
            .iter()
            .filter(move |payment| &payment.ticket_id == ticket_id)
    }

    /// Officer by id
    #[must_use]
    pub fn officer(&self, id: &OfficerId) -> Option<&Officer> {
        self.officers.iter().find(|officer| &officer.id == id)
    }

    /// Number of tickets with `status`
    #[must_use]
    pub fn count_status(&self, status: TicketStatus) -> usize {
        self.tickets
            .iter()
            .filter(|ticket| ticket.status == status)
            .count()
    }

    /// Status to show for `payment` on `today`
    ///
    /// Pending and Overdue are derived from the due date of the payment's
    /// ticket; a payment whose ticket is gone shows as Pending.
    #[must_use]
    pub fn payment_status(&self, payment: &Payment, today: NaiveDate) -> PaymentStatus {
        let due_date = self.ticket(&payment.ticket_id).map(|ticket| ticket.due_date);
        payment.status.effective(due_date, today)
    }

    /// Takes the next unused ticket number
    pub(crate) fn allocate_ticket_id(&mut self) -> TicketId {
        loop {
            let id = TicketId::from_number(self.next_ticket_number);
            self.next_ticket_number = self.next_ticket_number.saturating_add(1);
            if self.ticket(&id).is_none() {
                return id;
            }
        }
    }

    /// Resolves the current route into what should be rendered
    #[must_use]
    pub fn view(&self) -> View {
        if !self.session.is_admin() {
            return View::LoginRequired;
        }

        let id = self.route.id();
        let missing = |entity| View::EntityNotFound {
            entity,
            id: id.map(str::to_string),
        };
        let ticket_view = |make: fn(TicketId) -> View| {
            id.map(TicketId::from)
                .filter(|id| self.ticket(id).is_some())
                .map_or_else(|| missing(Entity::Ticket), make)
        };

        match &self.route.screen {
            Screen::Dashboard => View::Dashboard,
            Screen::TicketsList => View::TicketsList,
            Screen::TicketDetail => ticket_view(View::TicketDetail),
            Screen::CreateTicket => View::CreateTicket,
            Screen::EditTicket => ticket_view(View::EditTicket),
            Screen::PaymentsList => View::PaymentsList,
            Screen::PaymentDetail => id
                .map(PaymentId::from)
                .filter(|id| self.payment(id).is_some())
                .map_or_else(|| missing(Entity::Payment), View::PaymentDetail),
            Screen::OfficersList => View::OfficersList,
            Screen::OfficerDetail => id
                .map(OfficerId::from)
                .filter(|id| self.officer(id).is_some())
                .map_or_else(|| missing(Entity::Officer), View::OfficerDetail),
            Screen::CreateOfficer => View::CreateOfficer,
            Screen::EditOfficer => View::EditOfficer(id.map(OfficerId::from)),
            Screen::Settings => View::Settings,
            Screen::AuditLog => View::AuditLog,
            // Signed-in users have no login screen to see.
            Screen::Login | Screen::Unknown(_) => View::NotFound {
                screen: self.route.screen.identifier().to_string(),
            },
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Every input the console reducer accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleAction {
    /// Ticket collection
    Ticket(TicketAction),
    /// Payment collection
    Payment(PaymentAction),
    /// Officer collection
    Officer(OfficerAction),
    /// Navigation
    Navigation(NavigationAction),
    /// Sign in and out
    Session(SessionAction),
    /// Ticket list search, filters and sort
    Query(QueryAction),
}

// ============================================================================
// Environment
// ============================================================================

/// Injected dependencies of the console reducer
#[derive(Clone)]
pub struct ConsoleEnvironment {
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Token source for payment and officer ids
    pub ids: Arc<dyn IdGenerator>,
    /// Days between issue date and default due date
    pub payment_due_days: u32,
}

impl ConsoleEnvironment {
    /// Default number of days a new ticket has until payment is due
    pub const DEFAULT_PAYMENT_DUE_DAYS: u32 = 14;

    /// Creates an environment with the default due-date offset
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            payment_due_days: Self::DEFAULT_PAYMENT_DUE_DAYS,
        }
    }

    /// Sets the due-date offset
    #[must_use]
    pub const fn with_payment_due_days(mut self, days: u32) -> Self {
        self.payment_due_days = days;
        self
    }

    /// System clock and random ids
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIdGenerator))
    }
}

impl fmt::Debug for ConsoleEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleEnvironment")
            .field("now", &self.clock.now())
            .field("payment_due_days", &self.payment_due_days)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Root reducer of the console
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReducer;

impl ConsoleReducer {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Audit actor for a mutation, or [`ConsoleError::LoginRequired`]
    fn authorize(state: &ConsoleState) -> Result<String> {
        state
            .session
            .admin_name()
            .map(str::to_string)
            .ok_or(ConsoleError::LoginRequired)
    }
}

impl Reducer for ConsoleReducer {
    type State = ConsoleState;
    type Action = ConsoleAction;
    type Environment = ConsoleEnvironment;
    type Error = ConsoleError;

    fn reduce(
        &self,
        state: &mut ConsoleState,
        action: ConsoleAction,
        env: &ConsoleEnvironment,
    ) -> Result<Effects<ConsoleAction>> {
        match action {
            ConsoleAction::Ticket(action) => {
                let actor = Self::authorize(state)?;
                ticket::reduce(state, action, &actor, env)
            },
            ConsoleAction::Payment(action) => {
                Self::authorize(state)?;
                payment::reduce(state, action, env)
            },
            ConsoleAction::Officer(action) => {
                Self::authorize(state)?;
                officer::reduce(state, action, env)
            },
            ConsoleAction::Navigation(NavigationAction::Navigate { screen, params }) => {
                tracing::debug!(screen = %screen, "Navigate");
                state.route = Route::new(screen, params);
                Ok(smallvec![])
            },
            ConsoleAction::Session(SessionAction::Login) => {
                state.session.login();
                tracing::info!("Signed in");
                Ok(smallvec![])
            },
            ConsoleAction::Session(SessionAction::Logout) => {
                state.session.logout();
                tracing::info!("Signed out");
                Ok(smallvec![Effect::Send(ConsoleAction::Navigation(
                    NavigationAction::Navigate {
                        screen: Screen::Login,
                        params: crate::navigation::Params::new(),
                    }
                ))])
            },
            ConsoleAction::Query(action) => {
                state.list_query.apply(action);
                Ok(smallvec![])
            },
        }
    }
}
