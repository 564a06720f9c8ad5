//! Shared type definitions for the Lunaris game engine.
//!
//! This crate is the single source of truth for the entity and value types
//! used across the workspace. Types flow downstream to `TypeScript` via
//! `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Building, research, ship, mission, and status enumerations
//! - [`structs`] -- Persisted entities and economy value types
//! - [`events`] -- Notification payloads emitted after state transitions

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    BuildingType, FleetStatus, MissionKind, ResearchType, ResourceKind, ShipType,
    UnknownTypeError,
};
pub use events::GameEvent;
pub use ids::{AccountId, BuildingId, FleetId, PlanetId};
pub use structs::{
    Building, BuildingLevels, Coordinates, CostInfo, EnergyBalance, Fleet, Planet,
    ProductionRates, Research, ResourceSnapshot, Resources, ShipQueue,
};
