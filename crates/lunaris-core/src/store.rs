//! The persistence interface the game service runs on.
//!
//! Every operation opens one transaction with [`GameStore::begin`], reads
//! and writes through [`StoreTx`], and finishes with [`StoreTx::commit`].
//! Dropping a transaction without committing rolls it back, so an early
//! return on a rejection leaves no trace.
//!
//! Reads of planets and research records lock the row for the rest of the
//! transaction. Two operations on the same planet (or the same account's
//! research) therefore run one after the other, which is what keeps the
//! single-slot queues and the balances consistent.

use std::future::Future;

use chrono::{DateTime, Utc};
use lunaris_types::{
    AccountId, Building, Coordinates, Fleet, FleetId, Planet, PlanetId, Research,
};

use crate::error::StoreError;

/// A transactional store of planets, buildings, research, and fleets.
pub trait GameStore: Send + Sync {
    /// The transaction type.
    type Tx: StoreTx;

    /// Open a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;
}

/// One open transaction.
pub trait StoreTx: Send + Sized {
    // --- Planets ---

    /// Load a planet, locking it until the transaction ends.
    fn planet(
        &mut self,
        id: PlanetId,
    ) -> impl Future<Output = Result<Option<Planet>, StoreError>> + Send;

    /// Find the planet at a coordinate, if any.
    fn planet_at(
        &mut self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<Option<PlanetId>, StoreError>> + Send;

    /// Insert or update a planet.
    fn save_planet(
        &mut self,
        planet: &Planet,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Buildings ---

    /// Every building record on a planet.
    fn buildings(
        &mut self,
        planet: PlanetId,
    ) -> impl Future<Output = Result<Vec<Building>, StoreError>> + Send;

    /// Insert or update a building record, keyed by planet and type.
    fn save_building(
        &mut self,
        building: &Building,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Research ---

    /// Load an account's research record, locking it.
    fn research(
        &mut self,
        account: AccountId,
    ) -> impl Future<Output = Result<Option<Research>, StoreError>> + Send;

    /// Insert a research record for an account that has none. Returns
    /// `false`, writing nothing, if the account already has one, including
    /// one created by a concurrent transaction.
    fn create_research(
        &mut self,
        research: &Research,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Insert or update a research record.
    fn save_research(
        &mut self,
        research: &Research,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Fleets ---

    /// Load a fleet, locking it.
    fn fleet(
        &mut self,
        id: FleetId,
    ) -> impl Future<Output = Result<Option<Fleet>, StoreError>> + Send;

    /// Insert or update a fleet.
    fn save_fleet(&mut self, fleet: &Fleet) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a fleet.
    fn delete_fleet(&mut self, id: FleetId) -> impl Future<Output = Result<(), StoreError>> + Send;

    // --- Deadline queries ---

    /// Planets with a building upgrade due at or before `now`.
    fn due_buildings(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<PlanetId>, StoreError>> + Send;

    /// Accounts with a research due at or before `now`.
    fn due_research(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AccountId>, StoreError>> + Send;

    /// Planets with a ship batch due at or before `now`.
    fn due_ship_queues(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<PlanetId>, StoreError>> + Send;

    /// Traveling fleets whose arrival time is at or before `now`.
    fn fleets_arriving(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<FleetId>, StoreError>> + Send;

    /// Arrived fleets whose return time is at or before `now`.
    fn fleets_returning(
        &mut self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<FleetId>, StoreError>> + Send;

    // --- Lifecycle ---

    /// Make every write of this transaction visible.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
