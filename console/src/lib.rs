//! Parking Console - administration console for municipal parking violations
//!
//! Tickets, payments and officers live in one in-memory [`ConsoleState`]
//! driven by [`ConsoleReducer`] through the runtime's transactional store.
//! It showcases:
//!
//! - **Multiple aggregates**: Ticket, Payment, Officer
//! - **Workflow tracking**: Issued → Reviewed → Actioned → Closed, monotonic
//! - **Audit trail**: every ticket mutation appends an attributed entry
//! - **Cross-aggregate follow-ups**: a new ticket opens its payment, marking a
//!   ticket paid settles it
//! - **Derived views**: filtering, sorting, dashboard figures
//!
//! # Architecture
//!
//! ```text
//! ParkingConsole (facade)
//!        │ ConsoleAction
//!        ▼
//!   Store ── clone state ──▶ ConsoleReducer ──▶ Effect::Send(follow-up)
//!        ▲                        │                      │
//!        └──── commit on success ─┴──────── FIFO queue ◀─┘
//! ```
//!
//! A user action and all of its follow-ups commit together. If any of them is
//! rejected the committed state is left untouched.
//!
//! # Example
//!
//! ```
//! use parking_console::{ConsoleConfig, ParkingConsole};
//! use parking_console::types::TicketStatus;
//!
//! let console = ParkingConsole::new(ConsoleConfig::default());
//! let issued = console.state().count_status(TicketStatus::Issued);
//! assert_eq!(issued, 3);
//! ```

pub mod aggregates;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod navigation;
pub mod query;
pub mod reducer;
pub mod seed;
pub mod types;
pub mod workflow;

mod ids;

pub use aggregates::officer::{OfficerAction, OfficerDraft, OfficerPatch};
pub use aggregates::payment::{PaymentAction, PaymentDraft, PaymentPatch};
pub use aggregates::ticket::{TicketAction, TicketDraft, TicketPatch};
pub use app::{ParkingConsole, PaymentRow};
pub use config::ConsoleConfig;
pub use dashboard::DashboardSummary;
pub use error::{ConsoleError, Result};
pub use navigation::{Route, Screen, View};
pub use reducer::{ConsoleAction, ConsoleEnvironment, ConsoleReducer, ConsoleState};
