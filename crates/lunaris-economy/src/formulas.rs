//! Production, cost, duration, and flight formulas.
//!
//! Every function here is pure and deterministic. Rounding is part of the
//! contract: production and capacity round down, consumption and fuel round
//! up, durations are `floor(max(1, seconds))`.
//!
//! Notation used in the docs: `N` is the level, `T` the planet temperature,
//! `E` the energy technology level, `US` the universe speed.

use std::collections::BTreeMap;

use lunaris_types::{BuildingType, Coordinates, ResearchType, Resources, ShipType};

use crate::catalog::{building_base_cost, research_base_cost, ship_stats};
use crate::error::EconomyError;

/// Growth factor shared by mines, plants, and consumption curves.
const LEVEL_GROWTH: f64 = 1.1;

/// Seconds per hour; production rates are per hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `N * 1.1^N`, the common core of the mine and plant curves.
fn level_curve(level: u32) -> f64 {
    let n = f64::from(level);
    n * LEVEL_GROWTH.powf(n)
}

/// Convert a non-negative, already-rounded float to whole seconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Inputs are floored and clamped to >= 0 first.
fn whole_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

/// Convert a ship count to `f64` for fleet arithmetic.
#[allow(clippy::cast_precision_loss)] // Ship counts stay far below 2^52.
const fn count_f64(count: u64) -> f64 {
    count as f64
}

// ---------------------------------------------------------------------------
// Mines
// ---------------------------------------------------------------------------

/// Metal per hour: 30 at level 0, else `floor(30 * N * 1.1^N)`.
pub fn metal_production(level: u32) -> f64 {
    if level == 0 {
        return 30.0;
    }
    (30.0 * level_curve(level)).floor()
}

/// Crystal per hour: 15 at level 0, else `floor(20 * N * 1.1^N)`.
pub fn crystal_production(level: u32) -> f64 {
    if level == 0 {
        return 15.0;
    }
    (20.0 * level_curve(level)).floor()
}

/// Deuterium per hour: 0 at level 0, else
/// `floor(10 * N * 1.1^N * (1.44 - 0.004 * T))`.
///
/// Colder planets yield more.
pub fn deuterium_production(level: u32, temperature: i32) -> f64 {
    if level == 0 {
        return 0.0;
    }
    let climate = 0.004_f64.mul_add(-f64::from(temperature), 1.44);
    (10.0 * level_curve(level) * climate).floor()
}

/// Energy drawn by a metal or crystal mine: `ceil(10 * N * 1.1^N)`.
pub fn mine_energy_consumption(level: u32) -> f64 {
    (10.0 * level_curve(level)).ceil()
}

/// Energy drawn by a deuterium synthesizer: `ceil(20 * N * 1.1^N)`.
pub fn synthesizer_energy_consumption(level: u32) -> f64 {
    (20.0 * level_curve(level)).ceil()
}

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

/// Solar plant output: `floor(20 * N * 1.1^N)`.
pub fn solar_plant_energy(level: u32) -> f64 {
    (20.0 * level_curve(level)).floor()
}

/// Fusion reactor output: `floor(30 * N * (1.05 + 0.01 * E)^N)`.
pub fn fusion_reactor_energy(level: u32, energy_tech: u32) -> f64 {
    let n = f64::from(level);
    let growth = 0.01_f64.mul_add(f64::from(energy_tech), 1.05);
    (30.0 * n * growth.powf(n)).floor()
}

/// Deuterium burned per hour by a fusion reactor: `ceil(10 * N * 1.1^N)`.
pub fn fusion_reactor_deuterium_consumption(level: u32) -> f64 {
    (10.0 * level_curve(level)).ceil()
}

/// Energy from one solar satellite: `floor((T + 140) / 6)`, never negative.
pub fn solar_satellite_energy(temperature: i32) -> f64 {
    ((f64::from(temperature) + 140.0) / 6.0).floor().max(0.0)
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Storage cap at level 0.
pub const BASE_STORAGE: f64 = 10_000.0;

/// Storage cap for a metal storage, crystal storage, or deuterium tank:
/// 10 000 at level 0, else `10000 + floor(5000 * floor(2.5 * e^(20N/33)))`.
pub fn storage_capacity(level: u32) -> f64 {
    if level == 0 {
        return BASE_STORAGE;
    }
    let exponent = 20.0 * f64::from(level) / 33.0;
    BASE_STORAGE + (5000.0 * (2.5 * exponent.exp()).floor()).floor()
}

// ---------------------------------------------------------------------------
// Costs
// ---------------------------------------------------------------------------

/// Cost of raising a building to `target_level`: `base * 2^(N-1)`.
///
/// A target level of 0 is treated as 1.
pub fn building_cost(building: BuildingType, target_level: u32) -> Resources {
    let exponent = target_level.saturating_sub(1);
    building_base_cost(building) * 2.0_f64.powf(f64::from(exponent))
}

/// Cost of researching the level after `current_level`: `base * 2^N`.
pub fn research_cost(research: ResearchType, current_level: u32) -> Resources {
    research_base_cost(research) * 2.0_f64.powf(f64::from(current_level))
}

/// Cost of a batch of ships. Ships have no level scaling.
pub fn ship_cost(ship: ShipType, quantity: u64) -> Resources {
    ship_stats(ship).cost * count_f64(quantity)
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Rejects a universe speed that would divide by zero or flip signs.
fn check_universe_speed(universe_speed: f64) -> Result<(), EconomyError> {
    if universe_speed.is_finite() && universe_speed > 0.0 {
        Ok(())
    } else {
        Err(EconomyError::InvalidUniverseSpeed(universe_speed))
    }
}

/// Construction time in seconds for buildings and ships:
/// `floor(max(1, (M + C) / (2500 * (1 + F) * 2^nanite) * 3600 / US))`,
/// where `F` is the robotics factory level for buildings and the shipyard
/// level for ships.
pub fn construction_time(
    cost: &Resources,
    facility_level: u32,
    nanite_level: u32,
    universe_speed: f64,
) -> Result<u64, EconomyError> {
    check_universe_speed(universe_speed)?;
    let divisor = 2500.0
        * (1.0 + f64::from(facility_level))
        * 2.0_f64.powf(f64::from(nanite_level));
    let seconds = cost.metal_and_crystal() / divisor * SECONDS_PER_HOUR / universe_speed;
    Ok(whole_seconds(seconds.max(1.0).floor()))
}

/// Research time in seconds:
/// `floor(max(1, (M + C) / (1000 * (1 + lab)) * 3600 / US))`.
pub fn research_time(
    cost: &Resources,
    lab_level: u32,
    universe_speed: f64,
) -> Result<u64, EconomyError> {
    check_universe_speed(universe_speed)?;
    let divisor = 1000.0 * (1.0 + f64::from(lab_level));
    let seconds = cost.metal_and_crystal() / divisor * SECONDS_PER_HOUR / universe_speed;
    Ok(whole_seconds(seconds.max(1.0).floor()))
}

// ---------------------------------------------------------------------------
// Fleets
// ---------------------------------------------------------------------------

/// Distance between two coordinates.
///
/// - same galaxy, system, and position: 5
/// - same system: `1000 + 5 * |dposition|`
/// - same galaxy: `2700 + 95 * |dsystem|`
/// - otherwise: `20000 * |dgalaxy|`
pub fn distance(from: &Coordinates, to: &Coordinates) -> u64 {
    if from.galaxy != to.galaxy {
        return u64::from(from.galaxy.abs_diff(to.galaxy)).saturating_mul(20_000);
    }
    if from.system != to.system {
        return u64::from(from.system.abs_diff(to.system))
            .saturating_mul(95)
            .saturating_add(2700);
    }
    if from.position != to.position {
        return u64::from(from.position.abs_diff(to.position))
            .saturating_mul(5)
            .saturating_add(1000);
    }
    5
}

/// Speed of a fleet: the slowest ship's `base_speed * (1 + 0.1 * drive)`
/// among ship classes with a non-zero count.
///
/// The drive level is the combustion drive for every ship class, whichever
/// drive the ship actually uses. Zero-count entries are ignored.
///
/// # Errors
///
/// [`EconomyError::EmptyFleet`] if no class has a positive count, and
/// [`EconomyError::StationaryShip`] if a stationary class is included.
pub fn fleet_speed(
    ships: &BTreeMap<ShipType, u64>,
    combustion_drive: u32,
) -> Result<f64, EconomyError> {
    let bonus = 0.1_f64.mul_add(f64::from(combustion_drive), 1.0);
    let mut slowest: Option<f64> = None;
    for (&ship, &count) in ships {
        if count == 0 {
            continue;
        }
        let stats = ship_stats(ship);
        if stats.is_stationary() {
            return Err(EconomyError::StationaryShip(ship));
        }
        let speed = stats.speed * bonus;
        slowest = Some(slowest.map_or(speed, |s| s.min(speed)));
    }
    slowest.ok_or(EconomyError::EmptyFleet)
}

/// One-way flight time in seconds:
/// `floor((3500 / pct) * sqrt(distance * 10 / (speed * pct / 100)) + 10)`.
///
/// # Errors
///
/// [`EconomyError::InvalidSpeedPercent`] unless `0 < pct <= 100`, and
/// [`EconomyError::EmptyFleet`] for a non-positive fleet speed.
pub fn travel_duration(distance: u64, speed: f64, speed_percent: f64) -> Result<u64, EconomyError> {
    if !(speed_percent > 0.0 && speed_percent <= 100.0) {
        return Err(EconomyError::InvalidSpeedPercent(speed_percent));
    }
    if speed.is_nan() || speed <= 0.0 {
        return Err(EconomyError::EmptyFleet);
    }
    let effective = speed * speed_percent / 100.0;
    let seconds = (3500.0 / speed_percent).mul_add((count_f64(distance) * 10.0 / effective).sqrt(), 10.0);
    Ok(whole_seconds(seconds.floor()))
}

/// Deuterium burned by a fleet:
/// `ceil(sum((base_fuel * count * distance / 35000 + 1) * count))`.
pub fn fuel_consumption(ships: &BTreeMap<ShipType, u64>, distance: u64) -> f64 {
    let d = count_f64(distance);
    ships
        .iter()
        .map(|(&ship, &count)| {
            let n = count_f64(count);
            (ship_stats(ship).fuel * n * d / 35_000.0 + 1.0) * n
        })
        .sum::<f64>()
        .ceil()
}

/// Total cargo space of a fleet: `sum(base_cargo * count)`.
pub fn cargo_capacity(ships: &BTreeMap<ShipType, u64>) -> f64 {
    ships
        .iter()
        .map(|(&ship, &count)| ship_stats(ship).cargo * count_f64(count))
        .sum()
}
