//! Officer reducer.
//!
//! Tickets keep a weak reference to their officer, so deleting an officer
//! leaves its tickets (and their captured officer name) in place.

use super::{is_blank, show};
use crate::error::{ConsoleError, Entity, Field, Result, ValidationErrors};
use crate::ids::unique_id;
use crate::navigation::{Params, Screen};
use crate::reducer::{ConsoleAction, ConsoleEnvironment, ConsoleState};
use crate::types::{Officer, OfficerId, OfficerStatus};
use parking_console_core::reducer::Effects;
use parking_console_core::smallvec;
use serde::{Deserialize, Serialize};

/// Officer actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfficerAction {
    /// Add an officer
    Create(OfficerDraft),
    /// Merge an edit into an existing officer
    Update {
        /// Officer to edit
        id: OfficerId,
        /// Fields to change
        patch: OfficerPatch,
    },
    /// Remove an officer
    Delete {
        /// Officer to remove
        id: OfficerId,
    },
}

/// Form submission for a new officer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficerDraft {
    /// Badge number
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

/// Field-level edit of an officer; `None` keeps the current value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficerPatch {
    /// New badge number
    pub badge_id: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New phone
    pub phone: Option<String>,
    /// New roster status
    pub status: Option<OfficerStatus>,
}

fn validate(state: &ConsoleState, officer: &Officer) -> Result<()> {
    let mut errors = ValidationErrors::new();
    errors.check(is_blank(&officer.name), Field::Name, "Name is required.");
    errors.check(is_blank(&officer.badge_id), Field::BadgeId, "Badge ID is required.");
    errors.check(
        !is_blank(&officer.badge_id)
            && state
                .officers
                .iter()
                .any(|other| other.id != officer.id && other.badge_id.trim() == officer.badge_id.trim()),
        Field::BadgeId,
        "Badge ID is already assigned.",
    );
    errors.check(
        !officer.email.is_empty() && !officer.email.contains('@'),
        Field::Email,
        "Email address is invalid.",
    );
    errors.into_result()
}

/// Reduces an officer action
pub(crate) fn reduce(
    state: &mut ConsoleState,
    action: OfficerAction,
    env: &ConsoleEnvironment,
) -> Result<Effects<ConsoleAction>> {
    match action {
        OfficerAction::Create(draft) => {
            let id = OfficerId::new(unique_id(env.ids.as_ref(), "", |candidate| {
                state.officer(&OfficerId::from(candidate)).is_some()
            }));
            let officer = Officer {
                id,
                badge_id: draft.badge_id,
                name: draft.name,
                email: draft.email,
                phone: draft.phone,
                status: draft.status,
            };
            validate(state, &officer)?;
            tracing::info!(officer_id = %officer.id, badge = %officer.badge_id, "Officer created");
            state.officers.push(officer);
        },
        OfficerAction::Update { id, patch } => {
            let mut updated = state
                .officer(&id)
                .cloned()
                .ok_or_else(|| ConsoleError::not_found(Entity::Officer, &id))?;
            if let Some(badge_id) = patch.badge_id {
                updated.badge_id = badge_id;
            }
            if let Some(name) = patch.name {
                updated.name = name;
            }
            if let Some(email) = patch.email {
                updated.email = email;
            }
            if let Some(phone) = patch.phone {
                updated.phone = phone;
            }
            if let Some(status) = patch.status {
                updated.status = status;
            }
            validate(state, &updated)?;
            tracing::info!(officer_id = %id, "Officer updated");
            if let Some(slot) = state.officers.iter_mut().find(|officer| officer.id == id) {
                *slot = updated;
            }
        },
        OfficerAction::Delete { id } => {
            let index = state
                .officers
                .iter()
                .position(|officer| officer.id == id)
                .ok_or_else(|| ConsoleError::not_found(Entity::Officer, &id))?;
            state.officers.remove(index);
            tracing::info!(officer_id = %id, "Officer deleted");
            return Ok(smallvec![show(Screen::OfficersList, Params::new())]);
        },
    }
    Ok(smallvec![])
}
