//! Error types for the game service.
//!
//! These cover faults only: a bug, bad configuration, or a broken
//! persistence layer. Rejections a player can trigger (not found, wrong
//! state, missing prerequisites, insufficient resources) are returned as
//! [`Rejection`](crate::outcome::Rejection) values instead.

use lunaris_economy::EconomyError;
use lunaris_types::UnknownTypeError;

use crate::config::ConfigError;

/// Errors raised by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed (connection, query, serialization).
    #[error("persistence backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored type key no longer matches any known type.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// A stored record violates an invariant the engine relies on.
    #[error("corrupt record: {reason}")]
    Corrupt {
        /// Which record and what is wrong with it.
        reason: String,
    },
}

impl StoreError {
    /// Wrap any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Errors returned by [`Game`](crate::game::Game) operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The persistence layer failed; the transaction was rolled back.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A formula received inputs it cannot evaluate.
    #[error("economy error: {0}")]
    Economy(#[from] EconomyError),

    /// The configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Every coordinate in the universe is taken.
    #[error("no free position left for a new homeworld")]
    UniverseFull,

    /// A timestamp fell outside the representable range.
    #[error("timestamp overflow adding {seconds}s")]
    TimeOverflow {
        /// The offset that overflowed.
        seconds: u64,
    },
}
