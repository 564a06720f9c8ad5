//! The game service: every player-facing operation behind one facade.
//!
//! Each mutating operation runs in a single store transaction:
//!
//! 1. read the clock once
//! 2. load and lock the scope (planet, account research, or fleet)
//! 3. sync the planet's resources up to now
//! 4. validate (single slot, prerequisites, affordability)
//! 5. apply, persist, commit
//! 6. emit events to the [`EventSink`]
//!
//! A rejection returns before commit, so nothing is written. The queue
//! and fleet operations live in their own modules as further `impl` blocks.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lunaris_economy::{Levels, PlanetEconomy};
use lunaris_types::{
    Building, BuildingLevels, BuildingType, GameEvent, Planet, PlanetId, Research, ResearchType,
    ShipType,
};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::error::{GameError, StoreError};
use crate::notify::EventSink;
use crate::store::{GameStore, StoreTx};
use crate::sync::sync_planet;

/// The game service.
pub struct Game<S, C> {
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) config: GameConfig,
}

impl<S: GameStore, C: Clock> Game<S, C> {
    /// Create a game service.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] if `config` fails validation.
    pub fn new(
        store: S,
        clock: C,
        sink: Arc<dyn EventSink>,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            sink,
            config,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub(crate) fn universe_speed(&self) -> f64 {
        self.config.universe.speed
    }

    pub(crate) fn emit(&self, event: &GameEvent) {
        self.sink.emit(event);
    }
}

/// `now + seconds`, failing instead of wrapping.
pub(crate) fn add_seconds(now: DateTime<Utc>, seconds: u64) -> Result<DateTime<Utc>, GameError> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or(GameError::TimeOverflow { seconds })
}

// ---------------------------------------------------------------------------
// Loaded planet scope
// ---------------------------------------------------------------------------

/// A planet with its buildings and its owner's research, loaded in one
/// transaction.
#[derive(Debug, Clone)]
pub(crate) struct PlanetState {
    pub planet: Planet,
    pub buildings: BTreeMap<BuildingType, Building>,
    pub levels: BuildingLevels,
    pub research: Research,
}

impl PlanetState {
    /// Load a planet (locking it) and then its owner's research.
    pub async fn load<T: StoreTx>(tx: &mut T, id: PlanetId) -> Result<Option<Self>, StoreError> {
        let Some(planet) = tx.planet(id).await? else {
            return Ok(None);
        };
        let buildings = tx.buildings(id).await?;
        let research = tx
            .research(planet.owner)
            .await?
            .unwrap_or_else(|| Research::new(planet.owner));
        Ok(Some(Self::new(planet, buildings, research)))
    }

    pub fn new(planet: Planet, buildings: Vec<Building>, research: Research) -> Self {
        let buildings: BTreeMap<BuildingType, Building> = buildings
            .into_iter()
            .map(|b| (b.building_type, b))
            .collect();
        let levels = buildings.values().map(|b| (b.building_type, b.level)).collect();
        Self {
            planet,
            buildings,
            levels,
            research,
        }
    }

    pub fn level(&self, building: BuildingType) -> u32 {
        self.levels.get(&building).copied().unwrap_or(0)
    }

    pub fn research_level(&self, research: ResearchType) -> u32 {
        self.research.level(research)
    }

    pub fn prerequisite_levels(&self) -> Levels<'_> {
        Levels {
            buildings: &self.levels,
            research: &self.research.levels,
        }
    }

    pub fn economy(&self) -> PlanetEconomy<'_> {
        PlanetEconomy {
            buildings: &self.levels,
            temperature: self.planet.temperature,
            solar_satellites: self.planet.ship_count(ShipType::SolarSatellite),
            energy_tech: self.research_level(ResearchType::Energy),
        }
    }

    /// Bring the resource snapshot up to `now`.
    pub fn sync(&mut self, now: DateTime<Utc>) -> lunaris_types::ResourceSnapshot {
        let energy_tech = self.research_level(ResearchType::Energy);
        sync_planet(&mut self.planet, &self.levels, energy_tech, now)
    }

    /// The building currently upgrading, if any.
    pub fn upgrading(&self) -> Option<&Building> {
        self.buildings.values().find(|b| b.upgrading)
    }

    /// The record for a building type, created at level 0 if absent.
    pub fn building_mut(&mut self, building_type: BuildingType) -> &mut Building {
        let planet_id = self.planet.id;
        self.buildings
            .entry(building_type)
            .or_insert_with(|| Building::new(planet_id, building_type))
    }

    /// Record a new level for a building type.
    pub fn set_level(&mut self, building_type: BuildingType, level: u32) {
        self.building_mut(building_type).level = level;
        self.levels.insert(building_type, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_seconds_moves_forward() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        assert_eq!(
            add_seconds(start, 108).ok(),
            Some(start + Duration::seconds(108))
        );
    }

    #[test]
    fn add_seconds_rejects_overflow() {
        assert!(matches!(
            add_seconds(DateTime::<Utc>::MAX_UTC, 1),
            Err(GameError::TimeOverflow { seconds: 1 })
        ));
    }
}
