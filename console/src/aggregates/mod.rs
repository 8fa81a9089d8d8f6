//! Per-collection reducers.
//!
//! Each submodule owns one collection of [`ConsoleState`](crate::reducer::ConsoleState)
//! and the actions that mutate it. A reducer validates the whole action before
//! its first write, so a rejected action leaves the state untouched. Where a
//! ticket action needs a payment change it returns an explicit
//! [`PaymentAction`](payment::PaymentAction) effect instead of touching the
//! payment collection itself. The screen the UI shows next is a follow-up too,
//! so it commits with the mutation.

pub mod officer;
pub mod payment;
pub mod ticket;

use crate::navigation::{NavigationAction, Params, Screen};
use crate::reducer::{ConsoleAction, ConsoleEnvironment};
use crate::types::AuditEntry;
use parking_console_core::effect::Effect;

/// True when a required text field has no content
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Follow-up that moves the UI to `screen`
pub(crate) fn show(screen: Screen, params: Params) -> Effect<ConsoleAction> {
    Effect::Send(ConsoleAction::Navigation(NavigationAction::Navigate {
        screen,
        params,
    }))
}

/// Audit entry stamped with the environment clock
pub(crate) fn audit(
    env: &ConsoleEnvironment,
    actor: &str,
    action: impl Into<String>,
    details: impl Into<String>,
) -> AuditEntry {
    AuditEntry::new(env.clock.now(), actor, action, details)
}
