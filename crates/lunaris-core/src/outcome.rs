//! Structured results of player-triggered operations.

use lunaris_types::Resources;
use serde::Serialize;

/// Why an operation was refused. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// The referenced entity does not exist or is not the caller's.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity (`planet`, `research`, `fleet`).
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// The operation does not apply to the current state.
    #[error("{reason}")]
    InvalidState {
        /// Explanation shown to the player.
        reason: String,
    },

    /// One or more prerequisites are unmet.
    #[error("prerequisites not met: {}", .missing.join("; "))]
    PrerequisiteUnmet {
        /// Every unmet prerequisite, in order.
        missing: Vec<String>,
    },

    /// The planet cannot pay.
    #[error("insufficient resources: missing {}", missing_text(.required, .available))]
    InsufficientResources {
        /// What the action costs.
        required: Resources,
        /// What the planet has.
        available: Resources,
    },
}

impl Rejection {
    /// Shorthand for [`Rejection::InvalidState`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Rejection::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// The result of an operation: success with the affected entity, or a
/// rejection with a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome<T> {
    /// Whether the operation applied.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// The affected entity after the operation.
    pub entity: Option<T>,
    /// Set when `success` is false.
    pub rejection: Option<Rejection>,
}

impl<T> ActionOutcome<T> {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>, entity: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            entity: Some(entity),
            rejection: None,
        }
    }

    /// A refused outcome.
    pub fn rejected(rejection: Rejection) -> Self {
        Self {
            success: false,
            message: rejection.to_string(),
            entity: None,
            rejection: Some(rejection),
        }
    }

    /// The entity, if the operation succeeded.
    pub fn into_entity(self) -> Option<T> {
        self.entity
    }
}

/// `crystal 30, deuterium 10` for every resource `available` lacks.
fn missing_text(required: &Resources, available: &Resources) -> String {
    available
        .shortfall(required)
        .iter()
        .map(|(kind, amount)| format!("{} {}", kind.key(), amount.ceil()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<T> From<Rejection> for ActionOutcome<T> {
    fn from(rejection: Rejection) -> Self {
        Self::rejected(rejection)
    }
}
