//! Batch discovery and application of everything that has come due.
//!
//! A sweep lists due items in one read transaction, then completes each in
//! its own transaction through the same operation a player would call.
//! An item completed concurrently by someone else is simply rejected as
//! "nothing in progress", so overlapping sweeps never apply anything twice.

use lunaris_types::{AccountId, BuildingType, FleetId, PlanetId, ResearchType, ShipType};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::GameError;
use crate::game::Game;
use crate::outcome::ActionOutcome;
use crate::store::{GameStore, StoreTx};

/// One state transition applied by a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Completion {
    /// A building reached its next level.
    Building {
        /// The planet.
        planet_id: PlanetId,
        /// The building.
        building_type: BuildingType,
        /// The new level.
        level: u32,
    },
    /// A research reached its next level.
    Research {
        /// The account.
        account_id: AccountId,
        /// The technology.
        research_type: ResearchType,
        /// The new level.
        level: u32,
    },
    /// A ship batch was delivered.
    Ships {
        /// The planet.
        planet_id: PlanetId,
        /// The ship class.
        ship_type: ShipType,
        /// Ships delivered.
        quantity: u64,
    },
    /// A fleet reached its target.
    FleetArrived {
        /// The fleet.
        fleet_id: FleetId,
    },
    /// A fleet came home.
    FleetReturned {
        /// The fleet.
        fleet_id: FleetId,
    },
}

/// Keep successful outcomes, log errors, and move on to the next item.
fn collect<T>(
    result: Result<ActionOutcome<T>, GameError>,
    what: &str,
    id: &dyn std::fmt::Display,
) -> Option<T> {
    match result {
        Ok(outcome) if outcome.success => outcome.entity,
        Ok(outcome) => {
            debug!(%id, what, reason = %outcome.message, "Skipped during sweep");
            None
        }
        Err(e) => {
            warn!(%id, what, error = %e, "Sweep item failed");
            None
        }
    }
}

impl<S: GameStore, C: Clock> Game<S, C> {
    /// Complete every building upgrade that is due.
    pub async fn sweep_buildings(&self) -> Result<Vec<Completion>, GameError> {
        let due = {
            let mut tx = self.store.begin().await?;
            tx.due_buildings(self.clock.now()).await?
        };
        let mut done = Vec::new();
        for planet_id in due {
            let result = self.complete_building(planet_id).await;
            if let Some(building) = collect(result, "building", &planet_id) {
                done.push(Completion::Building {
                    planet_id,
                    building_type: building.building_type,
                    level: building.level,
                });
            }
        }
        Ok(done)
    }

    /// Complete every research that is due.
    pub async fn sweep_research(&self) -> Result<Vec<Completion>, GameError> {
        let due = {
            let mut tx = self.store.begin().await?;
            tx.due_research(self.clock.now()).await?
        };
        let mut done = Vec::new();
        for account_id in due {
            let result = self.complete_research(account_id).await;
            if let Some(finished) = collect(result, "research", &account_id) {
                done.push(Completion::Research {
                    account_id,
                    research_type: finished.research_type,
                    level: finished.level,
                });
            }
        }
        Ok(done)
    }

    /// Deliver every ship batch that is due.
    pub async fn sweep_ship_production(&self) -> Result<Vec<Completion>, GameError> {
        let due = {
            let mut tx = self.store.begin().await?;
            tx.due_ship_queues(self.clock.now()).await?
        };
        let mut done = Vec::new();
        for planet_id in due {
            let queued = {
                let mut tx = self.store.begin().await?;
                tx.planet(planet_id).await?.and_then(|p| p.ship_queue)
            };
            let result = self.complete_ship_production(planet_id).await;
            if let (Some(_), Some(queue)) = (collect(result, "ships", &planet_id), queued) {
                done.push(Completion::Ships {
                    planet_id,
                    ship_type: queue.ship_type,
                    quantity: queue.quantity,
                });
            }
        }
        Ok(done)
    }

    /// Mark every fleet whose arrival time has passed as arrived.
    pub async fn process_arrivals(&self) -> Result<Vec<Completion>, GameError> {
        let due = {
            let mut tx = self.store.begin().await?;
            tx.fleets_arriving(self.clock.now()).await?
        };
        let mut done = Vec::new();
        for fleet_id in due {
            let result = self.process_arrival(fleet_id).await;
            if collect(result, "arrival", &fleet_id).is_some() {
                done.push(Completion::FleetArrived { fleet_id });
            }
        }
        Ok(done)
    }

    /// Bring home every fleet whose return time has passed.
    pub async fn process_returns(&self) -> Result<Vec<Completion>, GameError> {
        let due = {
            let mut tx = self.store.begin().await?;
            tx.fleets_returning(self.clock.now()).await?
        };
        let mut done = Vec::new();
        for fleet_id in due {
            let result = self.process_return(fleet_id).await;
            if collect(result, "return", &fleet_id).is_some() {
                done.push(Completion::FleetReturned { fleet_id });
            }
        }
        Ok(done)
    }

    /// Run every sweep once: buildings, research, ships, arrivals, returns.
    pub async fn sweep_completions(&self) -> Result<Vec<Completion>, GameError> {
        let mut done = self.sweep_buildings().await?;
        done.extend(self.sweep_research().await?);
        done.extend(self.sweep_ship_production().await?);
        done.extend(self.process_arrivals().await?);
        done.extend(self.process_returns().await?);
        if !done.is_empty() {
            info!(count = done.len(), "Sweep applied completions");
        }
        Ok(done)
    }
}
