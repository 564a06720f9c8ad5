//! Error types for the economy crate.

use lunaris_types::ShipType;

/// Inputs a formula cannot evaluate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EconomyError {
    /// The universe speed must be a finite positive number.
    #[error("invalid universe speed: {0}")]
    InvalidUniverseSpeed(f64),

    /// The fleet speed percentage must lie in `(0, 100]`.
    #[error("invalid speed percent: {0} (must be in (0, 100])")]
    InvalidSpeedPercent(f64),

    /// A fleet needs at least one ship with a positive count.
    #[error("fleet has no ships")]
    EmptyFleet,

    /// The ship class cannot fly.
    #[error("{} cannot leave its planet", .0.label())]
    StationaryShip(ShipType),
}
