//! Fleet dispatch, recall, arrival, and return.
//!
//! A fleet takes its ships, cargo, and fuel from the origin planet at
//! dispatch. Arrival only marks the fleet arrived and schedules its return
//! one flight later; no mission effects are simulated. On return the ships
//! and cargo go back to the origin planet. A recall before arrival also
//! refunds the fuel.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lunaris_economy::{EconomyError, catalog, formulas};
use lunaris_types::{
    Coordinates, Fleet, FleetId, FleetStatus, GameEvent, MissionKind, PlanetId, ResearchType,
    Resources, ShipType,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::GameError;
use crate::game::{Game, PlanetState, add_seconds};
use crate::outcome::{ActionOutcome, Rejection};
use crate::store::{GameStore, StoreTx};

/// A request to send ships from a planet.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Planet the fleet departs from.
    pub origin_planet_id: PlanetId,
    /// Where the fleet flies to.
    pub target: Coordinates,
    /// The mission to fly.
    pub mission: MissionKind,
    /// Ships to send; zero counts are ignored.
    pub ships: BTreeMap<ShipType, u64>,
    /// Resources to carry.
    pub cargo: Resources,
    /// Speed as a percentage of full speed, in `(0, 100]`.
    pub speed_percent: f64,
}

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReceipt {
    /// The new fleet record.
    pub fleet: Fleet,
    /// Distance to the target.
    pub distance: u64,
    /// When the fleet will be back if nothing intervenes.
    pub planned_return_time: DateTime<Utc>,
}

/// Distance, duration, and fuel of a proposed flight.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FlightPlan {
    distance: u64,
    seconds: u64,
    fuel: f64,
    capacity: f64,
}

fn plan_flight(
    from: &Coordinates,
    to: &Coordinates,
    ships: &BTreeMap<ShipType, u64>,
    combustion_drive: u32,
    speed_percent: f64,
) -> Result<FlightPlan, EconomyError> {
    let distance = formulas::distance(from, to);
    let speed = formulas::fleet_speed(ships, combustion_drive)?;
    let seconds = formulas::travel_duration(distance, speed, speed_percent)?;
    Ok(FlightPlan {
        distance,
        seconds,
        fuel: formulas::fuel_consumption(ships, distance),
        capacity: formulas::cargo_capacity(ships),
    })
}

impl<S: GameStore, C: Clock> Game<S, C> {
    fn within_universe(&self, target: &Coordinates) -> bool {
        let u = &self.config.universe;
        (1..=u.galaxies).contains(&target.galaxy)
            && (1..=u.systems).contains(&target.system)
            && (1..=u.positions).contains(&target.position)
    }

    /// Send a fleet. Ships, cargo, and fuel leave the origin planet in the
    /// same transaction that creates the fleet.
    pub async fn dispatch_fleet(
        &self,
        request: DispatchRequest,
    ) -> Result<ActionOutcome<DispatchReceipt>, GameError> {
        let DispatchRequest {
            origin_planet_id,
            target,
            mission,
            ships,
            cargo,
            speed_percent,
        } = request;

        if !(speed_percent > 0.0 && speed_percent <= 100.0) {
            return Ok(Rejection::invalid("speed must be between 1 and 100 percent").into());
        }
        if !self.within_universe(&target) {
            return Ok(Rejection::invalid(format!("coordinates {target} are outside the universe")).into());
        }
        if cargo.metal < 0.0 || cargo.crystal < 0.0 || cargo.deuterium < 0.0 {
            return Ok(Rejection::invalid("cargo amounts must not be negative").into());
        }
        let ships: BTreeMap<ShipType, u64> = ships.into_iter().filter(|&(_, n)| n > 0).collect();
        if ships.is_empty() {
            return Ok(Rejection::invalid("a fleet needs at least one ship").into());
        }
        if let Some(&stationary) = ships
            .keys()
            .find(|&&ship| catalog::ship_stats(ship).is_stationary())
        {
            return Ok(Rejection::invalid(format!("{} cannot leave its planet", stationary.label())).into());
        }

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, origin_planet_id).await? else {
            return Ok(Rejection::not_found("planet", origin_planet_id).into());
        };

        for (&ship, &requested) in &ships {
            let owned = state.planet.ship_count(ship);
            if requested > owned {
                return Ok(Rejection::invalid(format!(
                    "not enough {} (requested {requested}, available {owned})",
                    ship.label()
                ))
                .into());
            }
        }

        state.sync(now);
        if !state.planet.resources.covers(&cargo) {
            return Ok(Rejection::InsufficientResources {
                required: cargo,
                available: state.planet.resources,
            }
            .into());
        }

        let plan = plan_flight(
            &state.planet.coordinates,
            &target,
            &ships,
            state.research_level(ResearchType::CombustionDrive),
            speed_percent,
        )?;
        let load = cargo.metal + cargo.crystal + cargo.deuterium + plan.fuel;
        if load > plan.capacity {
            return Ok(Rejection::invalid(format!(
                "cargo and fuel ({load}) exceed the fleet's capacity ({})",
                plan.capacity
            ))
            .into());
        }
        let fuel = Resources::new(0.0, 0.0, plan.fuel);
        let required = cargo + fuel;
        if state.planet.resources.deuterium < required.deuterium {
            return Ok(Rejection::InsufficientResources {
                required,
                available: state.planet.resources,
            }
            .into());
        }

        let arrival_time = add_seconds(now, plan.seconds)?;
        let planned_return_time = add_seconds(arrival_time, plan.seconds)?;

        for (&ship, &count) in &ships {
            let remaining = state.planet.ship_count(ship).saturating_sub(count);
            if remaining == 0 {
                state.planet.ships.remove(&ship);
            } else {
                state.planet.ships.insert(ship, remaining);
            }
        }
        state.planet.resources = state.planet.resources - required;

        let fleet = Fleet {
            id: FleetId::new(),
            owner: state.planet.owner,
            origin_planet_id,
            target_planet_id: tx.planet_at(target).await?,
            target_coordinates: target,
            mission,
            ships,
            cargo,
            status: FleetStatus::Traveling,
            departure_time: now,
            arrival_time,
            return_time: None,
            flight_seconds: plan.seconds,
            fuel_consumption: plan.fuel,
        };

        tx.save_planet(&state.planet).await?;
        tx.save_fleet(&fleet).await?;
        tx.commit().await?;

        info!(
            fleet_id = %fleet.id,
            %origin_planet_id,
            %target,
            mission = mission.key(),
            distance = plan.distance,
            seconds = plan.seconds,
            fuel = plan.fuel,
            "Fleet dispatched"
        );
        self.emit(&GameEvent::FleetDispatched {
            fleet_id: fleet.id,
            origin_planet_id,
            target,
            mission,
            arrival_time,
        });
        Ok(ActionOutcome::ok(
            format!("fleet dispatched to {target}"),
            DispatchReceipt {
                fleet,
                distance: plan.distance,
                planned_return_time,
            },
        ))
    }

    /// Call a traveling fleet back before it arrives. Ships, cargo, and fuel
    /// are refunded in full.
    pub async fn recall_fleet(&self, fleet_id: FleetId) -> Result<ActionOutcome<Fleet>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(fleet) = tx.fleet(fleet_id).await? else {
            return Ok(Rejection::not_found("fleet", fleet_id).into());
        };
        if fleet.status != FleetStatus::Traveling || now >= fleet.arrival_time {
            return Ok(Rejection::invalid("the fleet has already arrived").into());
        }
        let Some(mut state) = PlanetState::load(&mut tx, fleet.origin_planet_id).await? else {
            return Ok(Rejection::not_found("planet", fleet.origin_planet_id).into());
        };

        state.sync(now);
        dock(&mut state, &fleet);
        state.planet.resources += Resources::new(0.0, 0.0, fleet.fuel_consumption);

        tx.save_planet(&state.planet).await?;
        tx.delete_fleet(fleet_id).await?;
        tx.commit().await?;

        info!(%fleet_id, origin_planet_id = %fleet.origin_planet_id, "Fleet recalled");
        self.emit(&GameEvent::FleetRecalled {
            fleet_id,
            origin_planet_id: fleet.origin_planet_id,
        });
        Ok(ActionOutcome::ok("fleet recalled", fleet))
    }

    /// Mark one traveling fleet as arrived and schedule its return.
    pub async fn process_arrival(&self, fleet_id: FleetId) -> Result<ActionOutcome<Fleet>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut fleet) = tx.fleet(fleet_id).await? else {
            return Ok(Rejection::not_found("fleet", fleet_id).into());
        };
        if fleet.status != FleetStatus::Traveling {
            return Ok(Rejection::invalid("the fleet has already arrived").into());
        }
        if now < fleet.arrival_time {
            return Ok(Rejection::invalid("the fleet is still traveling").into());
        }

        let return_time = add_seconds(fleet.arrival_time, fleet.flight_seconds)?;
        fleet.status = FleetStatus::Arrived;
        fleet.return_time = Some(return_time);
        tx.save_fleet(&fleet).await?;
        tx.commit().await?;

        info!(%fleet_id, target = %fleet.target_coordinates, mission = fleet.mission.key(), "Fleet arrived");
        self.emit(&GameEvent::FleetArrived {
            fleet_id,
            target: fleet.target_coordinates,
            return_time,
        });
        Ok(ActionOutcome::ok("fleet arrived", fleet))
    }

    /// Bring one arrived fleet home: ships and cargo return to the origin
    /// planet and the fleet record is deleted.
    pub async fn process_return(&self, fleet_id: FleetId) -> Result<ActionOutcome<Fleet>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(fleet) = tx.fleet(fleet_id).await? else {
            return Ok(Rejection::not_found("fleet", fleet_id).into());
        };
        if fleet.status != FleetStatus::Arrived {
            return Ok(Rejection::invalid("the fleet has not arrived yet").into());
        }
        if fleet.return_time.is_none_or(|at| now < at) {
            return Ok(Rejection::invalid("the fleet is still on its way back").into());
        }

        match PlanetState::load(&mut tx, fleet.origin_planet_id).await? {
            Some(mut state) => {
                state.sync(now);
                dock(&mut state, &fleet);
                tx.save_planet(&state.planet).await?;
            }
            None => warn!(
                %fleet_id,
                origin_planet_id = %fleet.origin_planet_id,
                "Origin planet is gone; returning fleet is lost"
            ),
        }
        tx.delete_fleet(fleet_id).await?;
        tx.commit().await?;

        info!(%fleet_id, origin_planet_id = %fleet.origin_planet_id, "Fleet returned");
        self.emit(&GameEvent::FleetReturned {
            fleet_id,
            origin_planet_id: fleet.origin_planet_id,
        });
        Ok(ActionOutcome::ok("fleet returned", fleet))
    }
}

/// Put a fleet's ships and cargo back on its planet.
fn dock(state: &mut PlanetState, fleet: &Fleet) {
    for (&ship, &count) in &fleet.ships {
        let docked = state.planet.ships.entry(ship).or_insert(0);
        *docked = docked.saturating_add(count);
    }
    state.planet.resources += fleet.cargo;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn plan_for_two_small_cargos_in_the_same_system() {
        let ships = BTreeMap::from([(ShipType::SmallCargo, 2)]);
        let plan = plan_flight(
            &Coordinates::new(1, 1, 4),
            &Coordinates::new(1, 1, 8),
            &ships,
            0,
            100.0,
        )
        .unwrap();
        assert_eq!(plan.distance, 1020);
        assert_eq!(plan.capacity, 10_000.0);
        assert!(plan.fuel >= 2.0);
        assert!(plan.seconds > 10);
    }

    #[test]
    fn plan_rejects_stationary_ships() {
        let ships = BTreeMap::from([(ShipType::SolarSatellite, 1)]);
        assert!(
            plan_flight(
                &Coordinates::new(1, 1, 4),
                &Coordinates::new(1, 1, 8),
                &ships,
                0,
                100.0,
            )
            .is_err()
        );
    }
}
