//! Economy computations for the Lunaris game engine.
//!
//! Everything in this crate is pure and synchronous: no persistence, no
//! clock. The queue managers in `lunaris-core` call into it after loading
//! state and before writing it back.
//!
//! # Modules
//!
//! - [`catalog`] -- Base costs, ship statistics, and prerequisite tables.
//! - [`formulas`] -- Production, cost, duration, and flight formulas.
//! - [`prerequisites`] -- Non-short-circuiting prerequisite checks.
//! - [`production`] -- Energy balance, efficiency throttling, storage caps.
//! - [`accumulation`] -- Offline resource growth between syncs.
//! - [`error`] -- [`EconomyError`] for inputs a formula cannot evaluate.

pub mod accumulation;
pub mod catalog;
pub mod error;
pub mod formulas;
pub mod prerequisites;
pub mod production;

pub use accumulation::accumulate;
pub use error::EconomyError;
pub use prerequisites::{Levels, PrerequisiteCheck, Requirement};
pub use production::{PlanetEconomy, energy_balance, production_rates, storage_capacity};
