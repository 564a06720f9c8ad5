//! Resource synchronisation and the read-side planet views.

use chrono::{DateTime, Utc};
use lunaris_economy::{PlanetEconomy, accumulate, energy_balance, production_rates, storage_capacity};
use lunaris_types::{
    Building, BuildingLevels, EnergyBalance, Planet, PlanetId, ProductionRates, ResourceSnapshot,
    Resources, ShipType,
};
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::error::GameError;
use crate::game::{Game, PlanetState};
use crate::outcome::{ActionOutcome, Rejection};
use crate::store::{GameStore, StoreTx};

/// Seconds from `from` to `to`; negative if the clock moved backwards.
#[allow(clippy::cast_precision_loss)] // Millisecond spans stay far below 2^52.
fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Accumulate a planet's resources up to `now` and stamp the sync time.
///
/// Calling this twice with the same `now` changes nothing the second time.
/// A `now` earlier than the last sync leaves the planet untouched.
pub fn sync_planet(
    planet: &mut Planet,
    levels: &BuildingLevels,
    energy_tech: u32,
    now: DateTime<Utc>,
) -> ResourceSnapshot {
    let economy = PlanetEconomy {
        buildings: levels,
        temperature: planet.temperature,
        solar_satellites: planet.ship_count(ShipType::SolarSatellite),
        energy_tech,
    };
    let rates = production_rates(&economy);
    let caps = storage_capacity(levels);
    let elapsed = elapsed_seconds(planet.resources_updated_at, now);

    planet.resources = accumulate(&planet.resources, &rates, &caps, elapsed);
    if now > planet.resources_updated_at {
        planet.resources_updated_at = now;
    }
    debug!(planet_id = %planet.id, elapsed, "Synced resources");

    ResourceSnapshot {
        planet_id: planet.id,
        resources: planet.resources,
        energy: rates.energy,
        capacity: caps,
        production: rates,
        last_update: planet.resources_updated_at,
    }
}

/// Everything the planet screen shows, as of one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetOverview {
    /// The planet with synced balances.
    pub planet: Planet,
    /// Every building record on the planet.
    pub buildings: Vec<Building>,
    /// Energy production against consumption.
    pub energy: EnergyBalance,
    /// Per-hour production.
    pub production: ProductionRates,
    /// Storage caps.
    pub capacity: Resources,
}

impl<S: GameStore, C: Clock> Game<S, C> {
    /// Bring a planet's resources up to now and persist them.
    pub async fn sync_resources(
        &self,
        planet_id: PlanetId,
    ) -> Result<ActionOutcome<ResourceSnapshot>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        let snapshot = state.sync(now);
        tx.save_planet(&state.planet).await?;
        tx.commit().await?;
        Ok(ActionOutcome::ok("resources synced", snapshot))
    }

    /// The planet as of now, without writing anything.
    pub async fn planet_overview(
        &self,
        planet_id: PlanetId,
    ) -> Result<ActionOutcome<PlanetOverview>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        state.sync(now);
        let economy = state.economy();
        let overview = PlanetOverview {
            energy: energy_balance(&economy),
            production: production_rates(&economy),
            capacity: storage_capacity(&state.levels),
            buildings: state.buildings.values().cloned().collect(),
            planet: state.planet,
        };
        Ok(ActionOutcome::ok("planet overview", overview))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Duration;
    use lunaris_types::{AccountId, Coordinates};

    use super::*;

    fn planet(at: DateTime<Utc>) -> Planet {
        Planet {
            id: PlanetId::new(),
            owner: AccountId::new(),
            name: "Sync".to_owned(),
            coordinates: Coordinates::new(1, 1, 8),
            temperature: 65,
            resources: Resources::new(500.0, 500.0, 0.0),
            resources_updated_at: at,
            ships: BTreeMap::new(),
            ship_queue: None,
            created_at: at,
        }
    }

    #[test]
    fn one_hour_of_base_production() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let mut p = planet(start);
        let later = start + Duration::hours(1);
        let snapshot = sync_planet(&mut p, &BTreeMap::new(), 0, later);
        assert_eq!(snapshot.resources, Resources::new(530.0, 515.0, 0.0));
        assert_eq!(p.resources_updated_at, later);
    }

    #[test]
    fn resync_at_same_instant_is_noop() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let mut p = planet(start);
        let later = start + Duration::minutes(37);
        sync_planet(&mut p, &BTreeMap::new(), 0, later);
        let before = p.clone();
        sync_planet(&mut p, &BTreeMap::new(), 0, later);
        assert_eq!(p, before);
    }

    #[test]
    fn clock_going_backwards_changes_nothing() {
        let start = DateTime::<Utc>::UNIX_EPOCH + Duration::days(1);
        let mut p = planet(start);
        let before = p.clone();
        sync_planet(&mut p, &BTreeMap::new(), 0, start - Duration::hours(2));
        assert_eq!(p, before);
    }
}
