//! Error types for the data layer.
//!
//! Everything inside this crate propagates [`DbError`]. At the
//! [`StoreTx`](lunaris_core::StoreTx) boundary it is folded into the
//! engine's [`StoreError`].

use lunaris_core::StoreError;
use lunaris_types::UnknownTypeError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A JSONB column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored type key did not parse.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// A stored value is out of range for its domain type.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UnknownType(e) => Self::UnknownType(e),
            DbError::Corrupt(reason) => Self::Corrupt { reason },
            other => Self::backend(other),
        }
    }
}
