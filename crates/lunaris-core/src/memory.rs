//! In-process [`GameStore`] for tests and local runs.
//!
//! A transaction holds the store's only lock and works on a private copy
//! of the state. Commit publishes the copy; dropping the transaction
//! discards it. Transactions are therefore fully serialized.

use std::collections::BTreeMap;
use std::future::{Future, ready};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lunaris_types::{
    AccountId, Building, BuildingType, Coordinates, Fleet, FleetId, FleetStatus, Planet, PlanetId,
    Research,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::StoreError;
use crate::store::{GameStore, StoreTx};

/// Everything the in-memory store holds.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    planets: BTreeMap<PlanetId, Planet>,
    buildings: BTreeMap<PlanetId, BTreeMap<BuildingType, Building>>,
    research: BTreeMap<AccountId, Research>,
    fleets: BTreeMap<FleetId, Fleet>,
}

/// A [`GameStore`] kept entirely in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }
}

/// A transaction on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

impl StoreTx for MemoryTx {
    fn planet(
        &mut self,
        id: PlanetId,
    ) -> impl Future<Output = Result<Option<Planet>, StoreError>> + Send {
        ready(Ok(self.work.planets.get(&id).cloned()))
    }

    fn planet_at(
        &mut self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<Option<PlanetId>, StoreError>> + Send {
        let found = self
            .work
            .planets
            .values()
            .find(|p| p.coordinates == coordinates)
            .map(|p| p.id);
        ready(Ok(found))
    }

    fn save_planet(
        &mut self,
        planet: &Planet,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.work.planets.insert(planet.id, planet.clone());
        ready(Ok(()))
    }

    fn buildings(
        &mut self,
        planet: PlanetId,
    ) -> impl Future<Output = Result<Vec<Building>, StoreError>> + Send {
        let rows = self
            .work
            .buildings
            .get(&planet)
            .map(|by_type| by_type.values().cloned().collect())
            .unwrap_or_default();
        ready(Ok(rows))
    }

    fn save_building(
        &mut self,
        building: &Building,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.work
            .buildings
            .entry(building.planet_id)
            .or_default()
            .insert(building.building_type, building.clone());
        ready(Ok(()))
    }

    fn research(
        &mut self,
        account: AccountId,
    ) -> impl Future<Output = Result<Option<Research>, StoreError>> + Send {
        ready(Ok(self.work.research.get(&account).cloned()))
    }

    fn create_research(
        &mut self,
        research: &Research,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        let created = !self.work.research.contains_key(&research.account_id);
        if created {
            self.work
                .research
                .insert(research.account_id, research.clone());
        }
        ready(Ok(created))
    }

    fn save_research(
        &mut self,
        research: &Research,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.work
            .research
            .insert(research.account_id, research.clone());
        ready(Ok(()))
    }

    fn fleet(
        &mut self,
        id: FleetId,
    ) -> impl Future<Output = Result<Option<Fleet>, StoreError>> + Send {
        ready(Ok(self.work.fleets.get(&id).cloned()))
    }

    fn save_fleet(&mut self, fleet: &Fleet) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.work.fleets.insert(fleet.id, fleet.clone());
        ready(Ok(()))
    }

    fn delete_fleet(&mut self, id: FleetId) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.work.fleets.remove(&id);
        ready(Ok(()))
    }

    fn due_buildings(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<PlanetId>, StoreError>> + Send {
        let due = self
            .work
            .buildings
            .iter()
            .filter(|(_, by_type)| {
                by_type
                    .values()
                    .any(|b| b.upgrading && b.upgrade_end_time.is_some_and(|end| end <= now))
            })
            .map(|(&planet, _)| planet)
            .collect();
        ready(Ok(due))
    }

    fn due_research(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AccountId>, StoreError>> + Send {
        let due = self
            .work
            .research
            .values()
            .filter(|r| r.researching && r.research_end_time.is_some_and(|end| end <= now))
            .map(|r| r.account_id)
            .collect();
        ready(Ok(due))
    }

    fn due_ship_queues(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<PlanetId>, StoreError>> + Send {
        let due = self
            .work
            .planets
            .values()
            .filter(|p| p.ship_queue.as_ref().is_some_and(|q| q.end_time <= now))
            .map(|p| p.id)
            .collect();
        ready(Ok(due))
    }

    fn fleets_arriving(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<FleetId>, StoreError>> + Send {
        let due = self
            .work
            .fleets
            .values()
            .filter(|f| f.status == FleetStatus::Traveling && f.arrival_time <= now)
            .map(|f| f.id)
            .collect();
        ready(Ok(due))
    }

    fn fleets_returning(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<FleetId>, StoreError>> + Send {
        let due = self
            .work
            .fleets
            .values()
            .filter(|f| f.status == FleetStatus::Arrived && f.return_time.is_some_and(|t| t <= now))
            .map(|f| f.id)
            .collect();
        ready(Ok(due))
    }

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send {
        let Self { mut guard, work } = self;
        *guard = work;
        ready(Ok(()))
    }
}
