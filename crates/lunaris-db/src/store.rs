//! [`GameStore`] implementation on `PostgreSQL`.
//!
//! Each [`PgTx`] wraps one database transaction. Planet, research, and
//! fleet reads use `SELECT ... FOR UPDATE`, so two game operations on the
//! same row serialize at the database. Dropping a [`PgTx`] without
//! committing rolls it back.

use chrono::{DateTime, Utc};
use lunaris_core::{GameStore, StoreError, StoreTx};
use lunaris_types::{
    AccountId, Building, Coordinates, Fleet, FleetId, FleetStatus, Planet, PlanetId, Research,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::rows::{BuildingRow, FleetRow, PlanetRow, ResearchRow, to_i32, to_i64};

const PLANET_COLUMNS: &str = "id, owner_id, name, galaxy, system, position, temperature, \
     metal, crystal, deuterium, resources_updated_at, ships, ship_queue, created_at";

const FLEET_COLUMNS: &str = "id, owner_id, origin_planet_id, target_planet_id, \
     target_galaxy, target_system, target_position, mission, ships, \
     cargo_metal, cargo_crystal, cargo_deuterium, status, \
     departure_time, arrival_time, return_time, flight_seconds, fuel_consumption";

/// A [`GameStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connected pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

impl GameStore for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, StoreError> {
        let tx = self.pool.begin().await.map_err(DbError::from)?;
        Ok(PgTx { tx })
    }
}

/// One open `PostgreSQL` transaction.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

// =============================================================================
// Queries
// =============================================================================

impl PgTx {
    async fn load_planet(&mut self, id: PlanetId) -> Result<Option<Planet>, DbError> {
        let sql = format!("SELECT {PLANET_COLUMNS} FROM planets WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, PlanetRow>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Planet::try_from).transpose()
    }

    async fn find_planet_at(&mut self, at: Coordinates) -> Result<Option<PlanetId>, DbError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM planets WHERE galaxy = $1 AND system = $2 AND position = $3",
        )
        .bind(to_i32(at.galaxy, "galaxy")?)
        .bind(to_i32(at.system, "system")?)
        .bind(to_i32(at.position, "position")?)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id.map(PlanetId::from))
    }

    async fn upsert_planet(&mut self, planet: &Planet) -> Result<(), DbError> {
        let ships = serde_json::to_value(&planet.ships)?;
        let queue = planet
            .ship_queue
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let queue_end = planet.ship_queue.as_ref().map(|q| q.end_time);

        sqlx::query(
            r"INSERT INTO planets
              (id, owner_id, name, galaxy, system, position, temperature,
               metal, crystal, deuterium, resources_updated_at,
               ships, ship_queue, ship_queue_end_time, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
              ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                metal = EXCLUDED.metal,
                crystal = EXCLUDED.crystal,
                deuterium = EXCLUDED.deuterium,
                resources_updated_at = EXCLUDED.resources_updated_at,
                ships = EXCLUDED.ships,
                ship_queue = EXCLUDED.ship_queue,
                ship_queue_end_time = EXCLUDED.ship_queue_end_time",
        )
        .bind(planet.id.into_inner())
        .bind(planet.owner.into_inner())
        .bind(&planet.name)
        .bind(to_i32(planet.coordinates.galaxy, "galaxy")?)
        .bind(to_i32(planet.coordinates.system, "system")?)
        .bind(to_i32(planet.coordinates.position, "position")?)
        .bind(planet.temperature)
        .bind(planet.resources.metal)
        .bind(planet.resources.crystal)
        .bind(planet.resources.deuterium)
        .bind(planet.resources_updated_at)
        .bind(ships)
        .bind(queue)
        .bind(queue_end)
        .bind(planet.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn load_buildings(&mut self, planet: PlanetId) -> Result<Vec<Building>, DbError> {
        let rows = sqlx::query_as::<_, BuildingRow>(
            r"SELECT id, planet_id, building_type, level, upgrading, upgrade_end_time
              FROM buildings
              WHERE planet_id = $1
              ORDER BY building_type",
        )
        .bind(planet.into_inner())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(Building::try_from).collect()
    }

    async fn upsert_building(&mut self, building: &Building) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO buildings (id, planet_id, building_type, level, upgrading, upgrade_end_time)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (planet_id, building_type) DO UPDATE SET
                level = EXCLUDED.level,
                upgrading = EXCLUDED.upgrading,
                upgrade_end_time = EXCLUDED.upgrade_end_time",
        )
        .bind(building.id.into_inner())
        .bind(building.planet_id.into_inner())
        .bind(building.building_type.key())
        .bind(to_i32(building.level, "building level")?)
        .bind(building.upgrading)
        .bind(building.upgrade_end_time)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn load_research(&mut self, account: AccountId) -> Result<Option<Research>, DbError> {
        let row = sqlx::query_as::<_, ResearchRow>(
            r"SELECT account_id, levels, researching, current_research,
                     research_planet_id, research_end_time
              FROM research
              WHERE account_id = $1
              FOR UPDATE",
        )
        .bind(account.into_inner())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Research::try_from).transpose()
    }

    async fn upsert_research(&mut self, research: &Research) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO research
              (account_id, levels, researching, current_research, research_planet_id, research_end_time)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (account_id) DO UPDATE SET
                levels = EXCLUDED.levels,
                researching = EXCLUDED.researching,
                current_research = EXCLUDED.current_research,
                research_planet_id = EXCLUDED.research_planet_id,
                research_end_time = EXCLUDED.research_end_time",
        )
        .bind(research.account_id.into_inner())
        .bind(serde_json::to_value(&research.levels)?)
        .bind(research.researching)
        .bind(research.current_research.map(|t| t.key()))
        .bind(research.research_planet_id.map(PlanetId::into_inner))
        .bind(research.research_end_time)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_research(&mut self, research: &Research) -> Result<bool, DbError> {
        // A concurrent insert for the same account blocks here until the other
        // transaction ends, then affects no rows.
        let result = sqlx::query(
            r"INSERT INTO research
              (account_id, levels, researching, current_research, research_planet_id, research_end_time)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(research.account_id.into_inner())
        .bind(serde_json::to_value(&research.levels)?)
        .bind(research.researching)
        .bind(research.current_research.map(|t| t.key()))
        .bind(research.research_planet_id.map(PlanetId::into_inner))
        .bind(research.research_end_time)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn load_fleet(&mut self, id: FleetId) -> Result<Option<Fleet>, DbError> {
        let sql = format!("SELECT {FLEET_COLUMNS} FROM fleets WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, FleetRow>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Fleet::try_from).transpose()
    }

    async fn upsert_fleet(&mut self, fleet: &Fleet) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO fleets
              (id, owner_id, origin_planet_id, target_planet_id,
               target_galaxy, target_system, target_position, mission, ships,
               cargo_metal, cargo_crystal, cargo_deuterium, status,
               departure_time, arrival_time, return_time, flight_seconds, fuel_consumption)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
              ON CONFLICT (id) DO UPDATE SET
                cargo_metal = EXCLUDED.cargo_metal,
                cargo_crystal = EXCLUDED.cargo_crystal,
                cargo_deuterium = EXCLUDED.cargo_deuterium,
                status = EXCLUDED.status,
                return_time = EXCLUDED.return_time",
        )
        .bind(fleet.id.into_inner())
        .bind(fleet.owner.into_inner())
        .bind(fleet.origin_planet_id.into_inner())
        .bind(fleet.target_planet_id.map(PlanetId::into_inner))
        .bind(to_i32(fleet.target_coordinates.galaxy, "target_galaxy")?)
        .bind(to_i32(fleet.target_coordinates.system, "target_system")?)
        .bind(to_i32(fleet.target_coordinates.position, "target_position")?)
        .bind(fleet.mission.key())
        .bind(serde_json::to_value(&fleet.ships)?)
        .bind(fleet.cargo.metal)
        .bind(fleet.cargo.crystal)
        .bind(fleet.cargo.deuterium)
        .bind(fleet.status.key())
        .bind(fleet.departure_time)
        .bind(fleet.arrival_time)
        .bind(fleet.return_time)
        .bind(to_i64(fleet.flight_seconds, "flight_seconds")?)
        .bind(fleet.fuel_consumption)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn remove_fleet(&mut self, id: FleetId) -> Result<(), DbError> {
        sqlx::query("DELETE FROM fleets WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Run a single-column id query bound to `now`.
    async fn due_ids(&mut self, sql: &str, now: DateTime<Utc>) -> Result<Vec<Uuid>, DbError> {
        Ok(sqlx::query_scalar::<_, Uuid>(sql)
            .bind(now)
            .fetch_all(&mut *self.tx)
            .await?)
    }
}

// =============================================================================
// StoreTx
// =============================================================================

impl StoreTx for PgTx {
    async fn planet(&mut self, id: PlanetId) -> Result<Option<Planet>, StoreError> {
        Ok(self.load_planet(id).await?)
    }

    async fn planet_at(
        &mut self,
        coordinates: Coordinates,
    ) -> Result<Option<PlanetId>, StoreError> {
        Ok(self.find_planet_at(coordinates).await?)
    }

    async fn save_planet(&mut self, planet: &Planet) -> Result<(), StoreError> {
        Ok(self.upsert_planet(planet).await?)
    }

    async fn buildings(&mut self, planet: PlanetId) -> Result<Vec<Building>, StoreError> {
        Ok(self.load_buildings(planet).await?)
    }

    async fn save_building(&mut self, building: &Building) -> Result<(), StoreError> {
        Ok(self.upsert_building(building).await?)
    }

    async fn research(&mut self, account: AccountId) -> Result<Option<Research>, StoreError> {
        Ok(self.load_research(account).await?)
    }

    async fn create_research(&mut self, research: &Research) -> Result<bool, StoreError> {
        Ok(self.insert_research(research).await?)
    }

    async fn save_research(&mut self, research: &Research) -> Result<(), StoreError> {
        Ok(self.upsert_research(research).await?)
    }

    async fn fleet(&mut self, id: FleetId) -> Result<Option<Fleet>, StoreError> {
        Ok(self.load_fleet(id).await?)
    }

    async fn save_fleet(&mut self, fleet: &Fleet) -> Result<(), StoreError> {
        Ok(self.upsert_fleet(fleet).await?)
    }

    async fn delete_fleet(&mut self, id: FleetId) -> Result<(), StoreError> {
        Ok(self.remove_fleet(id).await?)
    }

    async fn due_buildings(&mut self, now: DateTime<Utc>) -> Result<Vec<PlanetId>, StoreError> {
        let ids = self
            .due_ids(
                r"SELECT DISTINCT planet_id FROM buildings
                  WHERE upgrading AND upgrade_end_time <= $1",
                now,
            )
            .await?;
        Ok(ids.into_iter().map(PlanetId::from).collect())
    }

    async fn due_research(&mut self, now: DateTime<Utc>) -> Result<Vec<AccountId>, StoreError> {
        let ids = self
            .due_ids(
                r"SELECT account_id FROM research
                  WHERE researching AND research_end_time <= $1
                  ORDER BY research_end_time",
                now,
            )
            .await?;
        Ok(ids.into_iter().map(AccountId::from).collect())
    }

    async fn due_ship_queues(&mut self, now: DateTime<Utc>) -> Result<Vec<PlanetId>, StoreError> {
        let ids = self
            .due_ids(
                r"SELECT id FROM planets
                  WHERE ship_queue_end_time <= $1
                  ORDER BY ship_queue_end_time",
                now,
            )
            .await?;
        Ok(ids.into_iter().map(PlanetId::from).collect())
    }

    async fn fleets_arriving(&mut self, now: DateTime<Utc>) -> Result<Vec<FleetId>, StoreError> {
        let sql = format!(
            "SELECT id FROM fleets WHERE status = '{}' AND arrival_time <= $1 ORDER BY arrival_time",
            FleetStatus::Traveling.key()
        );
        let ids = self.due_ids(&sql, now).await?;
        Ok(ids.into_iter().map(FleetId::from).collect())
    }

    async fn fleets_returning(&mut self, now: DateTime<Utc>) -> Result<Vec<FleetId>, StoreError> {
        let sql = format!(
            "SELECT id FROM fleets WHERE status = '{}' AND return_time <= $1 ORDER BY return_time",
            FleetStatus::Arrived.key()
        );
        let ids = self.due_ids(&sql, now).await?;
        Ok(ids.into_iter().map(FleetId::from).collect())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}
