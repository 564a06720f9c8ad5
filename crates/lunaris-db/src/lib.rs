//! `PostgreSQL` persistence for the Lunaris game engine.
//!
//! Implements the [`GameStore`](lunaris_core::GameStore) interface on a
//! `PostgreSQL` pool. Planets, buildings, research records, and fleets
//! live in one table each; ship maps, ship queues, and research levels are
//! `JSONB` columns.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool, configuration, migrations
//! - [`store`] -- [`PgStore`] and its row-locking transaction [`PgTx`]
//! - [`rows`] -- Row types and their conversion to domain types
//! - [`error`] -- Shared error types

pub mod error;
pub mod postgres;
pub mod rows;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{MIN_CONNECTIONS, PostgresConfig, PostgresPool};
pub use store::{PgStore, PgTx};
