//! Ship production queue: one batch at a time per planet.
//!
//! The shipyard cannot produce while it is being upgraded, and cannot be
//! upgraded while it is producing.

use lunaris_economy::{formulas, prerequisites};
use lunaris_types::{BuildingType, CostInfo, GameEvent, Planet, PlanetId, ShipQueue, ShipType};
use tracing::info;

use crate::clock::Clock;
use crate::error::GameError;
use crate::game::{Game, PlanetState, add_seconds};
use crate::outcome::{ActionOutcome, Rejection};
use crate::store::{GameStore, StoreTx};

impl<S: GameStore, C: Clock> Game<S, C> {
    fn batch_time(
        &self,
        state: &PlanetState,
        ship_type: ShipType,
        quantity: u64,
    ) -> Result<u64, GameError> {
        Ok(formulas::construction_time(
            &formulas::ship_cost(ship_type, quantity),
            state.level(BuildingType::Shipyard),
            state.level(BuildingType::NaniteFactory),
            self.universe_speed(),
        )?)
    }

    /// Price, duration, and eligibility of a batch of ships.
    pub async fn ship_build_info(
        &self,
        planet_id: PlanetId,
        ship_type: ShipType,
        quantity: u64,
    ) -> Result<ActionOutcome<CostInfo>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        state.sync(now);

        let quantity = quantity.max(1);
        let cost = formulas::ship_cost(ship_type, quantity);
        let time = self.batch_time(&state, ship_type, quantity)?;
        let check = prerequisites::check_ship(ship_type, state.prerequisite_levels());

        Ok(ActionOutcome::ok(
            format!("{quantity} x {}", ship_type.label()),
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

    /// Start producing `quantity` ships of one class.
    pub async fn start_ship_production(
        &self,
        planet_id: PlanetId,
        ship_type: ShipType,
        quantity: u64,
    ) -> Result<ActionOutcome<ShipQueue>, GameError> {
        if quantity == 0 {
            return Ok(Rejection::invalid("quantity must be at least 1").into());
        }
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };

        if let Some(queue) = &state.planet.ship_queue {
            return Ok(Rejection::invalid(format!(
                "the shipyard is already producing {}",
                queue.ship_type.label()
            ))
            .into());
        }
        if state
            .upgrading()
            .is_some_and(|b| b.building_type == BuildingType::Shipyard)
        {
            return Ok(Rejection::invalid("the shipyard is being upgraded").into());
        }

        let check = prerequisites::check_ship(ship_type, state.prerequisite_levels());
        if !check.met {
            return Ok(Rejection::PrerequisiteUnmet {
                missing: check.missing,
            }
            .into());
        }

        state.sync(now);
        let cost = formulas::ship_cost(ship_type, quantity);
        if !state.planet.resources.covers(&cost) {
            return Ok(Rejection::InsufficientResources {
                required: cost,
                available: state.planet.resources,
            }
            .into());
        }

        let seconds = self.batch_time(&state, ship_type, quantity)?;
        let end_time = add_seconds(now, seconds)?;
        let queue = ShipQueue {
            ship_type,
            quantity,
            start_time: now,
            end_time,
        };
        state.planet.resources = state.planet.resources - cost;
        state.planet.ship_queue = Some(queue.clone());

        tx.save_planet(&state.planet).await?;
        tx.commit().await?;

        info!(%planet_id, ship = ship_type.key(), quantity, seconds, "Ship production started");
        self.emit(&GameEvent::ShipProductionStarted {
            planet_id,
            ship_type,
            quantity,
            end_time,
        });
        Ok(ActionOutcome::ok(
            format!("production of {quantity} x {} started", ship_type.label()),
            queue,
        ))
    }

    /// Cancel the planet's ship batch and refund its full cost.
    pub async fn cancel_ship_production(
        &self,
        planet_id: PlanetId,
    ) -> Result<ActionOutcome<ShipQueue>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        let Some(queue) = state.planet.ship_queue.take() else {
            return Ok(Rejection::invalid("no ship production in progress").into());
        };

        state.sync(now);
        let refund = formulas::ship_cost(queue.ship_type, queue.quantity);
        state.planet.resources += refund;

        tx.save_planet(&state.planet).await?;
        tx.commit().await?;

        info!(%planet_id, ship = queue.ship_type.key(), quantity = queue.quantity, "Ship production cancelled");
        self.emit(&GameEvent::ShipProductionCancelled {
            planet_id,
            ship_type: queue.ship_type,
            quantity: queue.quantity,
            refund,
        });
        Ok(ActionOutcome::ok(
            format!("production of {} x {} cancelled", queue.quantity, queue.ship_type.label()),
            queue,
        ))
    }

    /// Deliver a finished ship batch. Rejected (without effect) if nothing
    /// is in production or the batch is not yet due.
    pub async fn complete_ship_production(
        &self,
        planet_id: PlanetId,
    ) -> Result<ActionOutcome<Planet>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        let Some(queue) = state.planet.ship_queue.clone() else {
            return Ok(Rejection::invalid("no ship production in progress").into());
        };
        if now < queue.end_time {
            return Ok(Rejection::invalid("ship production not yet complete").into());
        }

        // Satellites feed the energy balance from the moment they are delivered.
        state.sync(queue.end_time);
        let docked = state.planet.ships.entry(queue.ship_type).or_insert(0);
        *docked = docked.saturating_add(queue.quantity);
        state.planet.ship_queue = None;
        state.sync(now);

        tx.save_planet(&state.planet).await?;
        tx.commit().await?;

        info!(%planet_id, ship = queue.ship_type.key(), quantity = queue.quantity, "Ship production completed");
        self.emit(&GameEvent::ShipProductionCompleted {
            planet_id,
            ship_type: queue.ship_type,
            quantity: queue.quantity,
        });
        Ok(ActionOutcome::ok(
            format!("{} x {} delivered", queue.quantity, queue.ship_type.label()),
            state.planet,
        ))
    }
}
