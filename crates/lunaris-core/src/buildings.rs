//! Building upgrade queue: one upgrade at a time per planet.

use lunaris_economy::{formulas, prerequisites};
use lunaris_types::{Building, BuildingType, CostInfo, GameEvent, PlanetId};
use tracing::info;

use crate::clock::Clock;
use crate::error::GameError;
use crate::game::{Game, PlanetState, add_seconds};
use crate::outcome::{ActionOutcome, Rejection};
use crate::store::{GameStore, StoreTx};

impl<S: GameStore, C: Clock> Game<S, C> {
    /// Price, duration, and eligibility of the next level of a building.
    pub async fn building_upgrade_info(
        &self,
        planet_id: PlanetId,
        building_type: BuildingType,
    ) -> Result<ActionOutcome<CostInfo>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        state.sync(now);

        let target = state.level(building_type).saturating_add(1);
        let cost = formulas::building_cost(building_type, target);
        let time = formulas::construction_time(
            &cost,
            state.level(BuildingType::RoboticsFactory),
            state.level(BuildingType::NaniteFactory),
            self.universe_speed(),
        )?;
        let check = prerequisites::check_building(building_type, state.prerequisite_levels());

        Ok(ActionOutcome::ok(
            format!("{} level {target}", building_type.label()),
            CostInfo {
                metal: cost.metal,
                crystal: cost.crystal,
                deuterium: cost.deuterium,
                time,
                can_afford: state.planet.resources.covers(&cost),
                meets_prerequisites: check.met,
                missing_prerequisites: check.missing,
            },
        ))
    }

    /// Start upgrading a building to its next level.
    pub async fn start_building(
        &self,
        planet_id: PlanetId,
        building_type: BuildingType,
    ) -> Result<ActionOutcome<Building>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };

        if let Some(busy) = state.upgrading() {
            return Ok(Rejection::invalid(format!(
                "{} is already being upgraded",
                busy.building_type.label()
            ))
            .into());
        }
        if building_type == BuildingType::Shipyard && state.planet.ship_queue.is_some() {
            return Ok(Rejection::invalid("the shipyard is producing ships").into());
        }

        let check = prerequisites::check_building(building_type, state.prerequisite_levels());
        if !check.met {
            return Ok(Rejection::PrerequisiteUnmet {
                missing: check.missing,
            }
            .into());
        }

        state.sync(now);
        let target = state.level(building_type).saturating_add(1);
        let cost = formulas::building_cost(building_type, target);
        if !state.planet.resources.covers(&cost) {
            return Ok(Rejection::InsufficientResources {
                required: cost,
                available: state.planet.resources,
            }
            .into());
        }

        let seconds = formulas::construction_time(
            &cost,
            state.level(BuildingType::RoboticsFactory),
            state.level(BuildingType::NaniteFactory),
            self.universe_speed(),
        )?;
        let end_time = add_seconds(now, seconds)?;

        state.planet.resources = state.planet.resources - cost;
        let building = state.building_mut(building_type);
        building.upgrading = true;
        building.upgrade_end_time = Some(end_time);
        let building = building.clone();

        tx.save_planet(&state.planet).await?;
        tx.save_building(&building).await?;
        tx.commit().await?;

        info!(
            %planet_id,
            building = building_type.key(),
            target_level = target,
            seconds,
            "Building upgrade started"
        );
        self.emit(&GameEvent::BuildingStarted {
            planet_id,
            building_type,
            target_level: target,
            end_time,
        });
        Ok(ActionOutcome::ok(
            format!("{} upgrade to level {target} started", building_type.label()),
            building,
        ))
    }

    /// Cancel the upgrade in progress on a planet and refund its full cost.
    pub async fn cancel_building(
        &self,
        planet_id: PlanetId,
    ) -> Result<ActionOutcome<Building>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        let Some(building_type) = state.upgrading().map(|b| b.building_type) else {
            return Ok(Rejection::invalid("no building upgrade in progress").into());
        };

        state.sync(now);
        // The level has not moved since start, so this is the price paid.
        let refund = formulas::building_cost(building_type, state.level(building_type).saturating_add(1));
        state.planet.resources += refund;
        let building = state.building_mut(building_type);
        building.upgrading = false;
        building.upgrade_end_time = None;
        let building = building.clone();

        tx.save_planet(&state.planet).await?;
        tx.save_building(&building).await?;
        tx.commit().await?;

        info!(%planet_id, building = building_type.key(), "Building upgrade cancelled");
        self.emit(&GameEvent::BuildingCancelled {
            planet_id,
            building_type,
            refund,
        });
        Ok(ActionOutcome::ok(
            format!("{} upgrade cancelled", building_type.label()),
            building,
        ))
    }

    /// Apply a finished upgrade. Rejected (without effect) if nothing is
    /// upgrading or the upgrade is not yet due.
    pub async fn complete_building(
        &self,
        planet_id: PlanetId,
    ) -> Result<ActionOutcome<Building>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        let Some((building_type, end_time)) = state
            .upgrading()
            .map(|b| (b.building_type, b.upgrade_end_time))
        else {
            return Ok(Rejection::invalid("no building upgrade in progress").into());
        };
        let end_time = end_time.unwrap_or(now);
        if now < end_time {
            return Ok(Rejection::invalid("building upgrade not yet complete").into());
        }

        // Produce at the old level until the upgrade finished, then at the new one.
        state.sync(end_time);
        let level = state.level(building_type).saturating_add(1);
        state.set_level(building_type, level);
        state.sync(now);
        let building = state.building_mut(building_type);
        building.upgrading = false;
        building.upgrade_end_time = None;
        let building = building.clone();

        tx.save_planet(&state.planet).await?;
        tx.save_building(&building).await?;
        tx.commit().await?;

        info!(%planet_id, building = building_type.key(), level, "Building upgrade completed");
        self.emit(&GameEvent::BuildingCompleted {
            planet_id,
            building_type,
            level,
        });
        Ok(ActionOutcome::ok(
            format!("{} reached level {level}", building_type.label()),
            building,
        ))
    }
}
