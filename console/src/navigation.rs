//! Screen navigation and the session that gates it.
//!
//! Navigation is a plain `{screen, params}` pair that is replaced wholesale on
//! every navigate. Nothing is validated when navigating: an unknown screen
//! identifier is stored as-is and only turns into a not-found view when the
//! route is resolved.

use crate::error::Entity;
use crate::types::{OfficerId, PaymentId, TicketId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Route parameters, e.g. `{"id": "TKT-1000"}`
pub type Params = BTreeMap<String, String>;

/// Builds a params map holding only `id`
#[must_use]
pub fn id_param(id: impl fmt::Display) -> Params {
    Params::from([("id".to_string(), id.to_string())])
}

// ============================================================================
// Screens
// ============================================================================

/// A screen identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[allow(missing_docs)] // variants mirror the screen identifiers
pub enum Screen {
    Dashboard,
    TicketsList,
    TicketDetail,
    CreateTicket,
    EditTicket,
    PaymentsList,
    PaymentDetail,
    OfficersList,
    OfficerDetail,
    CreateOfficer,
    EditOfficer,
    Settings,
    AuditLog,
    Login,
    /// Any identifier the console does not know
    Unknown(String),
}

impl Screen {
    /// Every known screen
    pub const KNOWN: [Self; 14] = [
        Self::Dashboard,
        Self::TicketsList,
        Self::TicketDetail,
        Self::CreateTicket,
        Self::EditTicket,
        Self::PaymentsList,
        Self::PaymentDetail,
        Self::OfficersList,
        Self::OfficerDetail,
        Self::CreateOfficer,
        Self::EditOfficer,
        Self::Settings,
        Self::AuditLog,
        Self::Login,
    ];

    /// Parses a screen identifier. Never fails; unrecognised identifiers
    /// become [`Screen::Unknown`].
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|screen| screen.identifier() == identifier)
            .unwrap_or_else(|| Self::Unknown(identifier.to_string()))
    }

    /// Screen identifier, e.g. `TICKET_DETAIL`
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Dashboard => "DASHBOARD",
            Self::TicketsList => "TICKETS_LIST",
            Self::TicketDetail => "TICKET_DETAIL",
            Self::CreateTicket => "CREATE_TICKET",
            Self::EditTicket => "EDIT_TICKET",
            Self::PaymentsList => "PAYMENTS_LIST",
            Self::PaymentDetail => "PAYMENT_DETAIL",
            Self::OfficersList => "OFFICERS_LIST",
            Self::OfficerDetail => "OFFICER_DETAIL",
            Self::CreateOfficer => "CREATE_OFFICER",
            Self::EditOfficer => "EDIT_OFFICER",
            Self::Settings => "SETTINGS",
            Self::AuditLog => "AUDIT_LOG",
            Self::Login => "LOGIN",
            Self::Unknown(identifier) => identifier,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Screen {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for Screen {
    fn from(identifier: String) -> Self {
        Self::parse(&identifier)
    }
}

impl From<Screen> for String {
    fn from(screen: Screen) -> Self {
        screen.identifier().to_string()
    }
}

// ============================================================================
// Route
// ============================================================================

/// Current navigation state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Screen to show
    pub screen: Screen,
    /// Screen parameters
    pub params: Params,
}

impl Route {
    /// Route to `screen` with `params`
    #[must_use]
    pub const fn new(screen: Screen, params: Params) -> Self {
        Self { screen, params }
    }

    /// Route to `screen` without params
    #[must_use]
    pub const fn to(screen: Screen) -> Self {
        Self::new(screen, Params::new())
    }

    /// The `id` parameter, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.params.get("id").map(String::as_str)
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::to(Screen::Dashboard)
    }
}

/// Navigation actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationAction {
    /// Replace the current route
    Navigate {
        /// Target screen
        screen: Screen,
        /// Target params
        params: Params,
    },
}

// ============================================================================
// Session
// ============================================================================

/// Capability level of a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access to the console
    Admin,
}

/// The signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name, used as the audit actor
    pub name: String,
    /// Capability level
    pub role: Role,
}

impl User {
    /// Display name of the built-in administrator
    pub const ADMIN_NAME: &'static str = "System Admin";

    /// The built-in administrator
    #[must_use]
    pub fn admin() -> Self {
        Self {
            name: Self::ADMIN_NAME.to_string(),
            role: Role::Admin,
        }
    }
}

/// Who is using the console
///
/// Two states are reachable: signed out, and signed in as the built-in admin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// A signed-out session
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user: None }
    }

    /// A session signed in as the built-in admin
    #[must_use]
    pub fn admin() -> Self {
        Self {
            user: Some(User::admin()),
        }
    }

    /// Signs in as the built-in admin
    pub fn login(&mut self) {
        self.user = Some(User::admin());
    }

    /// Signs out
    pub fn logout(&mut self) {
        self.user = None;
    }

    /// The capability check for every gated screen and mutation
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.role == Role::Admin)
    }

    /// Audit actor name of an admin session
    #[must_use]
    pub fn admin_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .filter(|user| user.role == Role::Admin)
            .map(|user| user.name.as_str())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::admin()
    }
}

/// Session actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAction {
    /// Sign in as the built-in admin
    Login,
    /// Sign out and go to the login screen
    Logout,
}

// ============================================================================
// Views
// ============================================================================

/// What the presentation layer should render for the current route
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)] // one variant per screen
pub enum View {
    /// No admin session
    LoginRequired,
    Dashboard,
    TicketsList,
    TicketDetail(TicketId),
    CreateTicket,
    EditTicket(TicketId),
    PaymentsList,
    PaymentDetail(PaymentId),
    OfficersList,
    OfficerDetail(OfficerId),
    CreateOfficer,
    EditOfficer(Option<OfficerId>),
    Settings,
    AuditLog,
    /// A detail screen whose id is missing or unknown
    EntityNotFound {
        /// Entity the screen shows
        entity: Entity,
        /// Requested id, if one was given
        id: Option<String>,
    },
    /// A screen the console does not know
    NotFound {
        /// Requested screen identifier
        screen: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown_screens() {
        for screen in Screen::KNOWN {
            assert_eq!(Screen::parse(screen.identifier()), screen);
        }
        assert_eq!(
            Screen::parse("UNKNOWN_SCREEN"),
            Screen::Unknown("UNKNOWN_SCREEN".to_string())
        );
        assert_eq!("dashboard".parse(), Ok(Screen::Unknown("dashboard".to_string())));
    }

    #[test]
    fn screens_serialize_as_identifiers() {
        let json = serde_json::to_string(&Screen::TicketDetail).unwrap_or_default();
        assert_eq!(json, "\"TICKET_DETAIL\"");
        let back: Screen = serde_json::from_str("\"NOPE\"").unwrap_or(Screen::Dashboard);
        assert_eq!(back, Screen::Unknown("NOPE".to_string()));
    }

    #[test]
    fn route_id_param() {
        let route = Route::new(Screen::TicketDetail, id_param("TKT-1000"));
        assert_eq!(route.id(), Some("TKT-1000"));
        assert_eq!(Route::default().id(), None);
        assert_eq!(Route::default().screen, Screen::Dashboard);
    }

    #[test]
    fn session_state_machine() {
        let mut session = Session::default();
        assert!(session.is_admin());
        assert_eq!(session.admin_name(), Some("System Admin"));

        session.logout();
        assert!(!session.is_admin());
        assert_eq!(session.admin_name(), None);
        assert_eq!(session, Session::signed_out());

        session.login();
        assert_eq!(session, Session::admin());
    }
}
