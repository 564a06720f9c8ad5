//! Row types for the four tables and their conversion to domain types.
//!
//! Integer columns are signed in `PostgreSQL`; every conversion back to an
//! unsigned domain value is checked and reported as [`DbError::Corrupt`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lunaris_types::{
    Building, BuildingType, Coordinates, Fleet, FleetStatus, MissionKind, Planet, Research,
    ResearchType, Resources, ShipQueue, ShipType,
};
use uuid::Uuid;

use crate::error::DbError;

/// Convert a stored `INTEGER` to `u32`.
pub(crate) fn to_u32(value: i32, column: &str) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|e| DbError::Corrupt(format!("{column} is negative: {value} ({e})")))
}

/// Convert a stored `BIGINT` to `u64`.
pub(crate) fn to_u64(value: i64, column: &str) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|e| DbError::Corrupt(format!("{column} is negative: {value} ({e})")))
}

/// Convert a `u32` to an `INTEGER` parameter.
pub(crate) fn to_i32(value: u32, column: &str) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|e| DbError::Corrupt(format!("{column} out of range: {value} ({e})")))
}

/// Convert a `u64` to a `BIGINT` parameter.
pub(crate) fn to_i64(value: u64, column: &str) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|e| DbError::Corrupt(format!("{column} out of range: {value} ({e})")))
}

// =============================================================================
// Planets
// =============================================================================

/// A row from the `planets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanetRow {
    /// Planet id.
    pub id: Uuid,
    /// Owning account.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Galaxy number.
    pub galaxy: i32,
    /// System number.
    pub system: i32,
    /// Orbital position.
    pub position: i32,
    /// Maximum temperature.
    pub temperature: i32,
    /// Metal balance.
    pub metal: f64,
    /// Crystal balance.
    pub crystal: f64,
    /// Deuterium balance.
    pub deuterium: f64,
    /// Last resource sync.
    pub resources_updated_at: DateTime<Utc>,
    /// Docked ships, keyed by ship type.
    pub ships: serde_json::Value,
    /// Active ship batch.
    pub ship_queue: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlanetRow> for Planet {
    type Error = DbError;

    fn try_from(row: PlanetRow) -> Result<Self, DbError> {
        let ships: BTreeMap<ShipType, u64> = serde_json::from_value(row.ships)?;
        let ship_queue: Option<ShipQueue> = row
            .ship_queue
            .map(serde_json::from_value)
            .transpose()?;
        Ok(Self {
            id: row.id.into(),
            owner: row.owner_id.into(),
            name: row.name,
            coordinates: Coordinates::new(
                to_u32(row.galaxy, "galaxy")?,
                to_u32(row.system, "system")?,
                to_u32(row.position, "position")?,
            ),
            temperature: row.temperature,
            resources: Resources::new(row.metal, row.crystal, row.deuterium),
            resources_updated_at: row.resources_updated_at,
            ships,
            ship_queue,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Buildings
// =============================================================================

/// A row from the `buildings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BuildingRow {
    /// Record id.
    pub id: Uuid,
    /// Planet the building stands on.
    pub planet_id: Uuid,
    /// Building type key.
    pub building_type: String,
    /// Current level.
    pub level: i32,
    /// Whether an upgrade is in progress.
    pub upgrading: bool,
    /// When the upgrade completes.
    pub upgrade_end_time: Option<DateTime<Utc>>,
}

impl TryFrom<BuildingRow> for Building {
    type Error = DbError;

    fn try_from(row: BuildingRow) -> Result<Self, DbError> {
        Ok(Self {
            id: row.id.into(),
            planet_id: row.planet_id.into(),
            building_type: row.building_type.parse::<BuildingType>()?,
            level: to_u32(row.level, "building level")?,
            upgrading: row.upgrading,
            upgrade_end_time: row.upgrade_end_time,
        })
    }
}

// =============================================================================
// Research
// =============================================================================

/// A row from the `research` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResearchRow {
    /// Owning account.
    pub account_id: Uuid,
    /// Level per technology key.
    pub levels: serde_json::Value,
    /// Whether a research is in progress.
    pub researching: bool,
    /// Technology key in progress.
    pub current_research: Option<String>,
    /// Planet that paid for it.
    pub research_planet_id: Option<Uuid>,
    /// When it completes.
    pub research_end_time: Option<DateTime<Utc>>,
}

impl TryFrom<ResearchRow> for Research {
    type Error = DbError;

    fn try_from(row: ResearchRow) -> Result<Self, DbError> {
        let levels: BTreeMap<ResearchType, u32> = serde_json::from_value(row.levels)?;
        Ok(Self {
            account_id: row.account_id.into(),
            levels,
            researching: row.researching,
            current_research: row
                .current_research
                .as_deref()
                .map(str::parse::<ResearchType>)
                .transpose()?,
            research_planet_id: row.research_planet_id.map(Into::into),
            research_end_time: row.research_end_time,
        })
    }
}

// =============================================================================
// Fleets
// =============================================================================

/// A row from the `fleets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FleetRow {
    /// Fleet id.
    pub id: Uuid,
    /// Dispatching account.
    pub owner_id: Uuid,
    /// Origin planet.
    pub origin_planet_id: Uuid,
    /// Planet at the target, if any.
    pub target_planet_id: Option<Uuid>,
    /// Target galaxy.
    pub target_galaxy: i32,
    /// Target system.
    pub target_system: i32,
    /// Target position.
    pub target_position: i32,
    /// Mission key.
    pub mission: String,
    /// Ship composition.
    pub ships: serde_json::Value,
    /// Carried metal.
    pub cargo_metal: f64,
    /// Carried crystal.
    pub cargo_crystal: f64,
    /// Carried deuterium.
    pub cargo_deuterium: f64,
    /// Status key.
    pub status: String,
    /// Departure.
    pub departure_time: DateTime<Utc>,
    /// Arrival at the target.
    pub arrival_time: DateTime<Utc>,
    /// Return home, once scheduled.
    pub return_time: Option<DateTime<Utc>>,
    /// One-way flight duration.
    pub flight_seconds: i64,
    /// Fuel burned.
    pub fuel_consumption: f64,
}

impl TryFrom<FleetRow> for Fleet {
    type Error = DbError;

    fn try_from(row: FleetRow) -> Result<Self, DbError> {
        Ok(Self {
            id: row.id.into(),
            owner: row.owner_id.into(),
            origin_planet_id: row.origin_planet_id.into(),
            target_planet_id: row.target_planet_id.map(Into::into),
            target_coordinates: Coordinates::new(
                to_u32(row.target_galaxy, "target_galaxy")?,
                to_u32(row.target_system, "target_system")?,
                to_u32(row.target_position, "target_position")?,
            ),
            mission: row.mission.parse::<MissionKind>()?,
            ships: serde_json::from_value(row.ships)?,
            cargo: Resources::new(row.cargo_metal, row.cargo_crystal, row.cargo_deuterium),
            status: row.status.parse::<FleetStatus>()?,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            return_time: row.return_time,
            flight_seconds: to_u64(row.flight_seconds, "flight_seconds")?,
            fuel_consumption: row.fuel_consumption,
        })
    }
}
