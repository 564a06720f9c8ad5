//! Notification payloads emitted after each successful state transition.
//!
//! Events are best-effort: they are emitted after the transaction commits
//! and a failed delivery never rolls the mutation back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BuildingType, MissionKind, ResearchType, ShipType};
use crate::ids::{AccountId, FleetId, PlanetId};
use crate::structs::{Coordinates, Resources};

/// A state transition worth pushing to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameEvent {
    /// A homeworld was created for a new account.
    PlanetCreated {
        /// The new planet.
        planet_id: PlanetId,
        /// Its owner.
        account_id: AccountId,
        /// Where it was placed.
        coordinates: Coordinates,
    },
    /// A building upgrade started.
    BuildingStarted {
        /// The planet.
        planet_id: PlanetId,
        /// The building being upgraded.
        building_type: BuildingType,
        /// The level reached on completion.
        target_level: u32,
        /// Completion time.
        end_time: DateTime<Utc>,
    },
    /// A building upgrade completed.
    BuildingCompleted {
        /// The planet.
        planet_id: PlanetId,
        /// The upgraded building.
        building_type: BuildingType,
        /// The new level.
        level: u32,
    },
    /// A building upgrade was cancelled and refunded.
    BuildingCancelled {
        /// The planet.
        planet_id: PlanetId,
        /// The building whose upgrade was cancelled.
        building_type: BuildingType,
        /// Resources returned to the planet.
        refund: Resources,
    },
    /// A research started.
    ResearchStarted {
        /// The researching account.
        account_id: AccountId,
        /// The planet that paid.
        planet_id: PlanetId,
        /// The technology.
        research_type: ResearchType,
        /// The level reached on completion.
        target_level: u32,
        /// Completion time.
        end_time: DateTime<Utc>,
    },
    /// A research completed.
    ResearchCompleted {
        /// The researching account.
        account_id: AccountId,
        /// The technology.
        research_type: ResearchType,
        /// The new level.
        level: u32,
    },
    /// A research was cancelled and refunded.
    ResearchCancelled {
        /// The researching account.
        account_id: AccountId,
        /// The planet that received the refund.
        planet_id: PlanetId,
        /// The technology.
        research_type: ResearchType,
        /// Resources returned.
        refund: Resources,
    },
    /// A ship production batch started.
    ShipProductionStarted {
        /// The planet.
        planet_id: PlanetId,
        /// The ship class.
        ship_type: ShipType,
        /// Batch size.
        quantity: u64,
        /// Delivery time.
        end_time: DateTime<Utc>,
    },
    /// A ship production batch was delivered.
    ShipProductionCompleted {
        /// The planet.
        planet_id: PlanetId,
        /// The ship class.
        ship_type: ShipType,
        /// Ships delivered.
        quantity: u64,
    },
    /// A ship production batch was cancelled and refunded.
    ShipProductionCancelled {
        /// The planet.
        planet_id: PlanetId,
        /// The ship class.
        ship_type: ShipType,
        /// Batch size that was cancelled.
        quantity: u64,
        /// Resources returned.
        refund: Resources,
    },
    /// A fleet left its origin planet.
    FleetDispatched {
        /// The fleet.
        fleet_id: FleetId,
        /// Origin planet.
        origin_planet_id: PlanetId,
        /// Target coordinates.
        target: Coordinates,
        /// Mission flown.
        mission: MissionKind,
        /// Arrival time.
        arrival_time: DateTime<Utc>,
    },
    /// A fleet reached its target.
    FleetArrived {
        /// The fleet.
        fleet_id: FleetId,
        /// Target coordinates.
        target: Coordinates,
        /// When the fleet will be back home.
        return_time: DateTime<Utc>,
    },
    /// A fleet returned home and was disbanded into the origin planet.
    FleetReturned {
        /// The fleet.
        fleet_id: FleetId,
        /// Origin planet.
        origin_planet_id: PlanetId,
    },
    /// A traveling fleet was recalled and fully refunded.
    FleetRecalled {
        /// The fleet.
        fleet_id: FleetId,
        /// Origin planet.
        origin_planet_id: PlanetId,
    },
}

impl GameEvent {
    /// Event name in `family:transition` form, e.g. `building:started`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlanetCreated { .. } => "planet:created",
            Self::BuildingStarted { .. } => "building:started",
            Self::BuildingCompleted { .. } => "building:completed",
            Self::BuildingCancelled { .. } => "building:cancelled",
            Self::ResearchStarted { .. } => "research:started",
            Self::ResearchCompleted { .. } => "research:completed",
            Self::ResearchCancelled { .. } => "research:cancelled",
            Self::ShipProductionStarted { .. } => "ship:production:started",
            Self::ShipProductionCompleted { .. } => "ship:production:completed",
            Self::ShipProductionCancelled { .. } => "ship:production:cancelled",
            Self::FleetDispatched { .. } => "fleet:dispatched",
            Self::FleetArrived { .. } => "fleet:arrived",
            Self::FleetReturned { .. } => "fleet:returned",
            Self::FleetRecalled { .. } => "fleet:recalled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_follow_family_transition_form() {
        let event = GameEvent::ShipProductionCompleted {
            planet_id: PlanetId::new(),
            ship_type: ShipType::SmallCargo,
            quantity: 3,
        };
        assert_eq!(event.name(), "ship:production:completed");
    }

    #[test]
    fn event_serializes_with_tag_and_payload() {
        let event = GameEvent::FleetRecalled {
            fleet_id: FleetId::new(),
            origin_planet_id: PlanetId::new(),
        };
        let value = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(value["event"], "fleet_recalled");
        assert!(value["payload"]["fleet_id"].is_string());
    }
}
