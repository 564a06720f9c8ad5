//! Core entity structs for the Lunaris game engine.
//!
//! These mirror the persisted records (planet, building, research, fleet)
//! plus the value types passed between the economy and the queue managers.
//! Loosely typed storage columns (ship maps, ship queue) are modelled here
//! as real types; the persistence adapter handles the column format.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Sub};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BuildingType, FleetStatus, MissionKind, ResearchType, ResourceKind, ShipType};
use crate::ids::{AccountId, BuildingId, FleetId, PlanetId};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// An amount of each storable resource.
///
/// Used for balances, costs, refunds, cargo, and storage caps alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Metal units.
    pub metal: f64,
    /// Crystal units.
    pub crystal: f64,
    /// Deuterium units.
    pub deuterium: f64,
}

impl Resources {
    /// No resources at all.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create an amount from its three components.
    pub const fn new(metal: f64, crystal: f64, deuterium: f64) -> Self {
        Self {
            metal,
            crystal,
            deuterium,
        }
    }

    /// Return the amount of a single resource.
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
        }
    }

    /// Whether every component of `self` is at least the matching
    /// component of `required`.
    pub fn covers(&self, required: &Self) -> bool {
        self.metal >= required.metal
            && self.crystal >= required.crystal
            && self.deuterium >= required.deuterium
    }

    /// Every resource where `self` falls short of `required`, with the
    /// missing amount.
    pub fn shortfall(&self, required: &Self) -> Vec<(ResourceKind, f64)> {
        ResourceKind::ALL
            .iter()
            .filter_map(|&kind| {
                let missing = required.get(kind) - self.get(kind);
                (missing > 0.0).then_some((kind, missing))
            })
            .collect()
    }

    /// Metal plus crystal, the quantity construction time scales with.
    pub fn metal_and_crystal(&self) -> f64 {
        self.metal + self.crystal
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.metal + rhs.metal,
            self.crystal + rhs.crystal,
            self.deuterium + rhs.deuterium,
        )
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Resources {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.metal - rhs.metal,
            self.crystal - rhs.crystal,
            self.deuterium - rhs.deuterium,
        )
    }
}

impl Mul<f64> for Resources {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.metal * rhs, self.crystal * rhs, self.deuterium * rhs)
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A position in the universe: galaxy, solar system, orbital slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinates {
    /// Galaxy number, starting at 1.
    pub galaxy: u32,
    /// Solar system number within the galaxy, starting at 1.
    pub system: u32,
    /// Orbital position within the system, starting at 1.
    pub position: u32,
}

impl Coordinates {
    /// Create a coordinate triple.
    pub const fn new(galaxy: u32, system: u32, position: u32) -> Self {
        Self {
            galaxy,
            system,
            position,
        }
    }
}

impl core::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}:{}", self.galaxy, self.system, self.position)
    }
}

// ---------------------------------------------------------------------------
// Planet
// ---------------------------------------------------------------------------

/// A single-slot ship production order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShipQueue {
    /// The ship class being produced.
    pub ship_type: ShipType,
    /// How many ships the batch delivers (at least 1).
    pub quantity: u64,
    /// When production started.
    pub start_time: DateTime<Utc>,
    /// When the whole batch is delivered.
    pub end_time: DateTime<Utc>,
}

/// A planet with its resource snapshot, docked ships, and ship queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Planet {
    /// Unique planet identifier.
    pub id: PlanetId,
    /// The owning account.
    pub owner: AccountId,
    /// Display name.
    pub name: String,
    /// Position in the universe.
    pub coordinates: Coordinates,
    /// Maximum surface temperature in degrees Celsius.
    pub temperature: i32,
    /// Resources as of `resources_updated_at`.
    pub resources: Resources,
    /// Timestamp of the last resource sync.
    pub resources_updated_at: DateTime<Utc>,
    /// Ships docked at the planet.
    pub ships: BTreeMap<ShipType, u64>,
    /// Active ship production order, if any.
    pub ship_queue: Option<ShipQueue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Planet {
    /// Number of ships of the given class docked here.
    pub fn ship_count(&self, ship_type: ShipType) -> u64 {
        self.ships.get(&ship_type).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// A building on a planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Building {
    /// Unique building record identifier.
    pub id: BuildingId,
    /// The planet the building stands on.
    pub planet_id: PlanetId,
    /// The kind of building.
    pub building_type: BuildingType,
    /// Current level; never decreases.
    pub level: u32,
    /// Whether an upgrade to `level + 1` is in progress.
    pub upgrading: bool,
    /// When the in-progress upgrade completes.
    pub upgrade_end_time: Option<DateTime<Utc>>,
}

impl Building {
    /// A fresh level-0 record.
    pub fn new(planet_id: PlanetId, building_type: BuildingType) -> Self {
        Self {
            id: BuildingId::new(),
            planet_id,
            building_type,
            level: 0,
            upgrading: false,
            upgrade_end_time: None,
        }
    }
}

/// Building levels on one planet, keyed by type. Missing types are level 0.
pub type BuildingLevels = BTreeMap<BuildingType, u32>;

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// The research record of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Research {
    /// The owning account.
    pub account_id: AccountId,
    /// Level per technology; missing entries are level 0.
    pub levels: BTreeMap<ResearchType, u32>,
    /// Whether a research is in progress.
    pub researching: bool,
    /// The technology in progress.
    pub current_research: Option<ResearchType>,
    /// The planet that paid for the research in progress.
    pub research_planet_id: Option<PlanetId>,
    /// When the research in progress completes.
    pub research_end_time: Option<DateTime<Utc>>,
}

impl Research {
    /// A fresh record with every technology at level 0.
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            levels: ResearchType::ALL.iter().map(|&t| (t, 0)).collect(),
            researching: false,
            current_research: None,
            research_planet_id: None,
            research_end_time: None,
        }
    }

    /// Current level of a technology.
    pub fn level(&self, research_type: ResearchType) -> u32 {
        self.levels.get(&research_type).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

/// A dispatched fleet movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Fleet {
    /// Unique fleet identifier.
    pub id: FleetId,
    /// The dispatching account.
    pub owner: AccountId,
    /// Planet the fleet departed from.
    pub origin_planet_id: PlanetId,
    /// Planet at the target coordinates, if one exists.
    pub target_planet_id: Option<PlanetId>,
    /// Target coordinates.
    pub target_coordinates: Coordinates,
    /// The mission flown.
    pub mission: MissionKind,
    /// Ship composition; every count is positive.
    pub ships: BTreeMap<ShipType, u64>,
    /// Resources carried.
    pub cargo: Resources,
    /// Lifecycle state.
    pub status: FleetStatus,
    /// Departure timestamp.
    pub departure_time: DateTime<Utc>,
    /// Arrival timestamp at the target.
    pub arrival_time: DateTime<Utc>,
    /// Return timestamp; set when the arrival is processed.
    pub return_time: Option<DateTime<Utc>>,
    /// One-way flight duration in seconds.
    pub flight_seconds: u64,
    /// Deuterium burned for the trip.
    pub fuel_consumption: f64,
}

// ---------------------------------------------------------------------------
// Derived economy values
// ---------------------------------------------------------------------------

/// Energy production against consumption on a planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnergyBalance {
    /// Energy produced by plants, reactors, and satellites.
    pub production: f64,
    /// Energy consumed by mines.
    pub consumption: f64,
    /// `production - consumption`; negative under starvation.
    pub available: f64,
    /// Fraction of full output the mines run at, in `[0, 1]`.
    pub efficiency: f64,
}

/// Per-hour production rates of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProductionRates {
    /// Metal per hour.
    pub metal: f64,
    /// Crystal per hour.
    pub crystal: f64,
    /// Net deuterium per hour (after fusion reactor consumption).
    pub deuterium: f64,
    /// Available energy.
    pub energy: f64,
}

/// A planet's resources right after a sync, with the figures derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceSnapshot {
    /// The synced planet.
    pub planet_id: PlanetId,
    /// Current balances.
    pub resources: Resources,
    /// Available energy (derived, not stored).
    pub energy: f64,
    /// Storage capacity per resource.
    pub capacity: Resources,
    /// Per-hour production.
    pub production: ProductionRates,
    /// Timestamp the balances are valid for.
    pub last_update: DateTime<Utc>,
}

/// Price, duration, and eligibility of the next upgrade or build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CostInfo {
    /// Metal cost.
    pub metal: f64,
    /// Crystal cost.
    pub crystal: f64,
    /// Deuterium cost.
    pub deuterium: f64,
    /// Duration in seconds.
    pub time: u64,
    /// Whether the planet's current balance covers the cost.
    pub can_afford: bool,
    /// Whether every prerequisite is satisfied.
    pub meets_prerequisites: bool,
    /// Human-readable description of each unmet prerequisite.
    pub missing_prerequisites: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_requires_every_component() {
        let have = Resources::new(100.0, 50.0, 0.0);
        assert!(have.covers(&Resources::new(100.0, 50.0, 0.0)));
        assert!(!have.covers(&Resources::new(100.0, 50.0, 1.0)));
    }

    #[test]
    fn shortfall_lists_missing_amounts() {
        let have = Resources::new(100.0, 50.0, 0.0);
        let missing = have.shortfall(&Resources::new(60.0, 80.0, 10.0));
        assert_eq!(
            missing,
            vec![(ResourceKind::Crystal, 30.0), (ResourceKind::Deuterium, 10.0)]
        );
    }

    #[test]
    fn add_then_sub_is_identity_for_integral_amounts() {
        let a = Resources::new(500.0, 500.0, 0.0);
        let b = Resources::new(60.0, 15.0, 0.0);
        assert_eq!((a - b) + b, a);
    }

    #[test]
    fn coordinates_display() {
        assert_eq!(Coordinates::new(1, 42, 7).to_string(), "1:42:7");
    }

    #[test]
    fn fresh_research_has_all_levels_zero() {
        let r = Research::new(AccountId::new());
        assert_eq!(r.levels.len(), ResearchType::ALL.len());
        assert!(r.levels.values().all(|&l| l == 0));
        assert!(!r.researching);
    }
}
