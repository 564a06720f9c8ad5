//! Queue managers, fleet engine, and game service for the Lunaris engine.
//!
//! [`Game`] is the entry point. It owns a [`GameStore`], a [`Clock`], an
//! [`EventSink`], and the [`GameConfig`], and exposes one async method per
//! player-facing operation. Player-triggerable refusals come back as
//! [`ActionOutcome`] values carrying a [`Rejection`]; only faults become
//! [`GameError`].
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `lunaris-config.yaml`.
//! - [`clock`] -- [`Clock`] trait with [`SystemClock`] and [`ManualClock`].
//! - [`store`] -- The transactional persistence interface.
//! - [`memory`] -- [`MemoryStore`], an in-process store.
//! - [`notify`] -- [`EventSink`] and the built-in sinks.
//! - [`game`] -- The [`Game`] service.
//! - [`sync`] -- Resource sync and the planet overview.
//! - [`buildings`] -- Building upgrade queue (per planet).
//! - [`research`] -- Research queue (per account).
//! - [`shipyard`] -- Ship production queue (per planet).
//! - [`fleet`] -- Fleet dispatch, recall, arrival, and return.
//! - [`sweep`] -- Batch completion of everything due.
//! - [`homeworld`] -- Account registration.
//! - [`outcome`] -- [`ActionOutcome`] and [`Rejection`].
//! - [`error`] -- [`GameError`] and [`StoreError`].

pub mod buildings;
pub mod clock;
pub mod config;
pub mod error;
pub mod fleet;
pub mod game;
pub mod homeworld;
pub mod memory;
pub mod notify;
pub mod outcome;
pub mod research;
pub mod shipyard;
pub mod store;
pub mod sweep;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use error::{GameError, StoreError};
pub use fleet::{DispatchReceipt, DispatchRequest};
pub use game::Game;
pub use memory::MemoryStore;
pub use notify::{EventSink, NoopSink, RecordingSink, TracingSink};
pub use outcome::{ActionOutcome, Rejection};
pub use research::FinishedResearch;
pub use store::{GameStore, StoreTx};
pub use sweep::Completion;
pub use sync::PlanetOverview;
