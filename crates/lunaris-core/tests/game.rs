//! Service-level tests for the `lunaris-core` game engine.
//!
//! Every test runs against a fresh [`MemoryStore`] and a [`ManualClock`]
//! frozen at a fixed instant, so balances only change when a test moves
//! the clock.

// Tests use expect/unwrap extensively for clarity -- panicking on failure
// is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::too_many_lines,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lunaris_core::{
    ActionOutcome, Completion, DispatchRequest, Game, GameConfig, GameStore, ManualClock,
    MemoryStore, RecordingSink, Rejection, StoreTx,
};
use lunaris_types::{
    AccountId, Building, BuildingType, Coordinates, FleetStatus, MissionKind, Planet, PlanetId,
    ResearchType, Resources, ShipType,
};

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    game: Game<MemoryStore, ManualClock>,
    store: MemoryStore,
    clock: ManualClock,
    sink: Arc<RecordingSink>,
    account: AccountId,
    planet: PlanetId,
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

async fn harness() -> Harness {
    let store = MemoryStore::new();
    let clock = ManualClock::new(start_time());
    let sink = Arc::new(RecordingSink::new());
    let game = Game::new(
        store.clone(),
        clock.clone(),
        Arc::clone(&sink) as Arc<dyn lunaris_core::EventSink>,
        GameConfig::default(),
    )
    .unwrap();
    let account = AccountId::new();
    let planet = game
        .register_homeworld(account)
        .await
        .unwrap()
        .into_entity()
        .expect("homeworld registration succeeds")
        .id;
    Harness {
        game,
        store,
        clock,
        sink,
        account,
        planet,
    }
}

impl Harness {
    async fn planet(&self) -> Planet {
        let mut tx = self.store.begin().await.unwrap();
        tx.planet(self.planet).await.unwrap().unwrap()
    }

    async fn edit_planet(&self, edit: impl FnOnce(&mut Planet)) {
        let mut tx = self.store.begin().await.unwrap();
        let mut planet = tx.planet(self.planet).await.unwrap().unwrap();
        edit(&mut planet);
        tx.save_planet(&planet).await.unwrap();
        tx.commit().await.unwrap();
    }

    async fn set_resources(&self, resources: Resources) {
        self.edit_planet(|p| p.resources = resources).await;
    }

    async fn set_building(&self, building_type: BuildingType, level: u32) {
        let mut tx = self.store.begin().await.unwrap();
        let mut building = Building::new(self.planet, building_type);
        building.level = level;
        tx.save_building(&building).await.unwrap();
        tx.commit().await.unwrap();
    }

    async fn building(&self, building_type: BuildingType) -> Building {
        let mut tx = self.store.begin().await.unwrap();
        tx.buildings(self.planet)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.building_type == building_type)
            .unwrap()
    }

    async fn set_research(&self, research_type: ResearchType, level: u32) {
        let mut tx = self.store.begin().await.unwrap();
        let mut research = tx.research(self.account).await.unwrap().unwrap();
        research.levels.insert(research_type, level);
        tx.save_research(&research).await.unwrap();
        tx.commit().await.unwrap();
    }

    fn advance(&self, seconds: i64) {
        self.clock.advance(Duration::seconds(seconds));
    }
}

fn rejection<T>(outcome: &ActionOutcome<T>) -> &Rejection {
    assert!(!outcome.success, "expected a rejection, got: {}", outcome.message);
    outcome.rejection.as_ref().unwrap()
}

// =============================================================================
// Homeworld and sync
// =============================================================================

#[tokio::test]
async fn homeworld_starts_with_default_resources() {
    let h = harness().await;
    let planet = h.planet().await;
    assert_eq!(planet.owner, h.account);
    assert_eq!(planet.resources, Resources::new(500.0, 500.0, 0.0));
    assert_eq!(planet.resources_updated_at, start_time());
    assert!((1..=15).contains(&planet.coordinates.position));
    assert_eq!(
        planet.temperature,
        240 - 25 * (i32::try_from(planet.coordinates.position).unwrap() - 1)
    );
    assert_eq!(h.building(BuildingType::MetalMine).await.level, 0);
    assert_eq!(h.sink.names(), vec!["planet:created"]);
}

#[tokio::test]
async fn second_registration_is_rejected() {
    let h = harness().await;
    let again = h.game.register_homeworld(h.account).await.unwrap();
    assert!(matches!(rejection(&again), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn sync_after_one_hour_adds_base_production() {
    let h = harness().await;
    h.advance(3600);
    let snapshot = h
        .game
        .sync_resources(h.planet)
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    assert_eq!(snapshot.resources, Resources::new(530.0, 515.0, 0.0));
    assert_eq!(snapshot.last_update, start_time() + Duration::hours(1));

    // Redundant sync at the same instant changes nothing.
    let again = h
        .game
        .sync_resources(h.planet)
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    assert_eq!(again.resources, snapshot.resources);
}

#[tokio::test]
async fn sync_unknown_planet_is_not_found() {
    let h = harness().await;
    let outcome = h.game.sync_resources(PlanetId::new()).await.unwrap();
    assert!(matches!(rejection(&outcome), Rejection::NotFound { .. }));
}

#[tokio::test]
async fn overview_reports_energy_and_caps() {
    let h = harness().await;
    h.set_building(BuildingType::SolarPlant, 5).await;
    h.set_building(BuildingType::MetalMine, 1).await;
    h.set_building(BuildingType::CrystalMine, 1).await;
    let overview = h
        .game
        .planet_overview(h.planet)
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    assert_eq!(overview.energy.efficiency, 1.0);
    assert!(overview.energy.available > 0.0);
    assert_eq!(overview.capacity, Resources::new(10_000.0, 10_000.0, 10_000.0));
    assert_eq!(overview.production.metal, 33.0);
}

// =============================================================================
// Building queue
// =============================================================================

#[tokio::test]
async fn start_then_cancel_building_refunds_exactly() {
    let h = harness().await;
    let before = h.planet().await.resources;

    let started = h
        .game
        .start_building(h.planet, BuildingType::MetalMine)
        .await
        .unwrap();
    assert!(started.success, "{}", started.message);
    assert_eq!(
        h.planet().await.resources,
        before - Resources::new(60.0, 15.0, 0.0)
    );

    let cancelled = h.game.cancel_building(h.planet).await.unwrap();
    assert!(cancelled.success);
    assert_eq!(h.planet().await.resources, before);
    assert!(!h.building(BuildingType::MetalMine).await.upgrading);
    assert_eq!(
        h.sink.names(),
        vec!["planet:created", "building:started", "building:cancelled"]
    );
}

#[tokio::test]
async fn second_building_start_is_invalid_state() {
    let h = harness().await;
    h.set_resources(Resources::new(1e6, 1e6, 1e6)).await;
    assert!(
        h.game
            .start_building(h.planet, BuildingType::MetalMine)
            .await
            .unwrap()
            .success
    );
    let second = h
        .game
        .start_building(h.planet, BuildingType::CrystalMine)
        .await
        .unwrap();
    assert!(matches!(rejection(&second), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn building_completes_only_once_and_only_when_due() {
    let h = harness().await;
    h.game
        .start_building(h.planet, BuildingType::MetalMine)
        .await
        .unwrap();

    let early = h.game.complete_building(h.planet).await.unwrap();
    assert!(matches!(rejection(&early), Rejection::InvalidState { .. }));

    // 75 metal + crystal at robotics 0 is 108 seconds.
    h.advance(108);
    let done = h.game.complete_building(h.planet).await.unwrap();
    assert!(done.success);
    assert_eq!(done.entity.unwrap().level, 1);

    let again = h.game.complete_building(h.planet).await.unwrap();
    assert!(matches!(rejection(&again), Rejection::InvalidState { .. }));
    assert_eq!(h.building(BuildingType::MetalMine).await.level, 1);
}

#[tokio::test]
async fn cancel_without_upgrade_is_invalid_state() {
    let h = harness().await;
    let outcome = h.game.cancel_building(h.planet).await.unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn unaffordable_building_reports_insufficient_resources() {
    let h = harness().await;
    let outcome = h
        .game
        .start_building(h.planet, BuildingType::RoboticsFactory)
        .await
        .unwrap();
    match rejection(&outcome) {
        Rejection::InsufficientResources {
            required,
            available,
        } => {
            assert_eq!(*required, Resources::new(400.0, 120.0, 200.0));
            assert_eq!(available.deuterium, 0.0);
        }
        other => panic!("unexpected rejection: {other:?}"),
    }
    assert_eq!(h.planet().await.resources, Resources::new(500.0, 500.0, 0.0));
}

#[tokio::test]
async fn upgrade_info_prices_the_next_level() {
    let h = harness().await;
    h.set_building(BuildingType::MetalMine, 2).await;
    let info = h
        .game
        .building_upgrade_info(h.planet, BuildingType::MetalMine)
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    assert_eq!((info.metal, info.crystal), (240.0, 60.0));
    assert!(info.can_afford);
    assert!(info.meets_prerequisites);

    let fusion = h
        .game
        .building_upgrade_info(h.planet, BuildingType::FusionReactor)
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    assert!(!fusion.meets_prerequisites);
    assert_eq!(fusion.missing_prerequisites.len(), 2);
}

#[tokio::test]
async fn sweep_completes_due_buildings_once() {
    let h = harness().await;
    h.game
        .start_building(h.planet, BuildingType::CrystalMine)
        .await
        .unwrap();
    assert!(h.game.sweep_completions().await.unwrap().is_empty());

    h.advance(3600);
    let done = h.game.sweep_completions().await.unwrap();
    assert_eq!(
        done,
        vec![Completion::Building {
            planet_id: h.planet,
            building_type: BuildingType::CrystalMine,
            level: 1,
        }]
    );
    assert!(h.game.sweep_completions().await.unwrap().is_empty());
}

// =============================================================================
// Research queue
// =============================================================================

#[tokio::test]
async fn research_without_lab_lists_missing_prerequisites() {
    let h = harness().await;
    let outcome = h
        .game
        .start_research(h.account, h.planet, ResearchType::Energy)
        .await
        .unwrap();
    match rejection(&outcome) {
        Rejection::PrerequisiteUnmet { missing } => assert_eq!(
            missing,
            &vec!["Research Lab level 1 required (current: 0)".to_owned()]
        ),
        other => panic!("unexpected rejection: {other:?}"),
    }
}

#[tokio::test]
async fn research_start_cancel_and_complete() {
    let h = harness().await;
    h.set_building(BuildingType::ResearchLab, 1).await;
    h.set_resources(Resources::new(5000.0, 5000.0, 5000.0)).await;

    let started = h
        .game
        .start_research(h.account, h.planet, ResearchType::Energy)
        .await
        .unwrap();
    assert!(started.success, "{}", started.message);
    assert_eq!(
        h.planet().await.resources,
        Resources::new(5000.0, 4200.0, 4600.0)
    );

    let busy = h
        .game
        .start_research(h.account, h.planet, ResearchType::Computer)
        .await
        .unwrap();
    assert!(matches!(rejection(&busy), Rejection::InvalidState { .. }));

    assert!(h.game.cancel_research(h.account).await.unwrap().success);
    assert_eq!(
        h.planet().await.resources,
        Resources::new(5000.0, 5000.0, 5000.0)
    );

    h.game
        .start_research(h.account, h.planet, ResearchType::Energy)
        .await
        .unwrap();
    // 800 crystal at lab 1: 800 / 2000 * 3600 = 1440 seconds.
    h.advance(1440);
    let done = h.game.sweep_completions().await.unwrap();
    assert_eq!(
        done,
        vec![Completion::Research {
            account_id: h.account,
            research_type: ResearchType::Energy,
            level: 1,
        }]
    );
    let again = h.game.complete_research(h.account).await.unwrap();
    assert!(matches!(rejection(&again), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn research_on_foreign_planet_is_not_found() {
    let h = harness().await;
    let outcome = h
        .game
        .start_research(AccountId::new(), h.planet, ResearchType::Energy)
        .await
        .unwrap();
    assert!(matches!(rejection(&outcome), Rejection::NotFound { .. }));
}

#[tokio::test]
async fn research_slot_is_shared_by_all_planets_of_an_account() {
    let h = harness().await;
    h.set_building(BuildingType::ResearchLab, 1).await;
    h.set_resources(Resources::new(5000.0, 5000.0, 5000.0)).await;

    let mut colony = h.planet().await;
    colony.id = PlanetId::new();
    colony.name = "Colony".to_owned();
    colony.coordinates = Coordinates::new(
        colony.coordinates.galaxy,
        colony.coordinates.system,
        if colony.coordinates.position == 1 { 2 } else { 1 },
    );
    {
        let mut tx = h.store.begin().await.unwrap();
        tx.save_planet(&colony).await.unwrap();
        let mut lab = Building::new(colony.id, BuildingType::ResearchLab);
        lab.level = 1;
        tx.save_building(&lab).await.unwrap();
        tx.commit().await.unwrap();
    }

    assert!(
        h.game
            .start_research(h.account, h.planet, ResearchType::Energy)
            .await
            .unwrap()
            .success
    );
    let outcome = h
        .game
        .start_research(h.account, colony.id, ResearchType::Computer)
        .await
        .unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));

    let mut tx = h.store.begin().await.unwrap();
    assert_eq!(tx.planet(colony.id).await.unwrap().unwrap(), colony);
    let research = tx.research(h.account).await.unwrap().unwrap();
    assert_eq!(research.current_research, Some(ResearchType::Energy));
    assert_eq!(research.research_planet_id, Some(h.planet));
}

/// Raise the metal mine far above what the fusion reactor can power, so that
/// any extra fusion energy from Energy Technology shows up as metal.
async fn energy_starved(h: &Harness) {
    h.set_building(BuildingType::ResearchLab, 1).await;
    h.set_building(BuildingType::MetalMine, 10).await;
    h.set_building(BuildingType::FusionReactor, 1).await;
    h.set_resources(Resources::new(5000.0, 5000.0, 5000.0)).await;
    assert!(
        h.game
            .start_research(h.account, h.planet, ResearchType::Energy)
            .await
            .unwrap()
            .success
    );
}

#[tokio::test]
async fn late_research_completion_does_not_backdate_production() {
    let on_time = harness().await;
    energy_starved(&on_time).await;
    on_time.advance(1440);
    assert_eq!(on_time.game.sweep_completions().await.unwrap().len(), 1);
    on_time.advance(3600);
    on_time.game.sync_resources(on_time.planet).await.unwrap();

    let late = harness().await;
    energy_starved(&late).await;
    late.advance(1440 + 3600);
    let done = late.game.sweep_completions().await.unwrap();
    assert_eq!(
        done,
        vec![Completion::Research {
            account_id: late.account,
            research_type: ResearchType::Energy,
            level: 1,
        }]
    );

    let expected = on_time.planet().await;
    let actual = late.planet().await;
    assert_eq!(actual.resources_updated_at, expected.resources_updated_at);
    assert!((actual.resources.metal - expected.resources.metal).abs() < 1e-6);
    assert!((actual.resources.crystal - expected.resources.crystal).abs() < 1e-6);
    assert!((actual.resources.deuterium - expected.resources.deuterium).abs() < 1e-6);
}

// =============================================================================
// Ship production
// =============================================================================

async fn shipyard_ready(h: &Harness) {
    h.set_building(BuildingType::Shipyard, 2).await;
    h.set_research(ResearchType::CombustionDrive, 2).await;
    h.set_resources(Resources::new(10_000.0, 10_000.0, 1000.0)).await;
}

#[tokio::test]
async fn ship_batch_start_cancel_and_deliver() {
    let h = harness().await;
    shipyard_ready(&h).await;

    let started = h
        .game
        .start_ship_production(h.planet, ShipType::SmallCargo, 2)
        .await
        .unwrap();
    assert!(started.success, "{}", started.message);
    let queue = started.entity.unwrap();
    assert_eq!(
        h.planet().await.resources,
        Resources::new(6000.0, 6000.0, 1000.0)
    );

    let busy = h
        .game
        .start_ship_production(h.planet, ShipType::SmallCargo, 1)
        .await
        .unwrap();
    assert!(matches!(rejection(&busy), Rejection::InvalidState { .. }));
    let upgrade = h
        .game
        .start_building(h.planet, BuildingType::Shipyard)
        .await
        .unwrap();
    assert!(matches!(rejection(&upgrade), Rejection::InvalidState { .. }));

    assert!(h.game.cancel_ship_production(h.planet).await.unwrap().success);
    assert_eq!(
        h.planet().await.resources,
        Resources::new(10_000.0, 10_000.0, 1000.0)
    );

    h.game
        .start_ship_production(h.planet, ShipType::SmallCargo, 2)
        .await
        .unwrap();
    let seconds = (queue.end_time - queue.start_time).num_seconds();
    h.advance(seconds);
    let done = h.game.sweep_completions().await.unwrap();
    assert_eq!(
        done,
        vec![Completion::Ships {
            planet_id: h.planet,
            ship_type: ShipType::SmallCargo,
            quantity: 2,
        }]
    );
    let planet = h.planet().await;
    assert_eq!(planet.ship_count(ShipType::SmallCargo), 2);
    assert!(planet.ship_queue.is_none());
}

#[tokio::test]
async fn ship_batch_cannot_complete_early() {
    let h = harness().await;
    shipyard_ready(&h).await;
    let queue = h
        .game
        .start_ship_production(h.planet, ShipType::SmallCargo, 2)
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    h.advance((queue.end_time - queue.start_time).num_seconds() - 1);
    let before = h.planet().await;

    let outcome = h.game.complete_ship_production(h.planet).await.unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
    let after = h.planet().await;
    assert_eq!(after, before);
    assert_eq!(after.ship_queue, Some(queue));
    assert_eq!(after.ship_count(ShipType::SmallCargo), 0);
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let h = harness().await;
    shipyard_ready(&h).await;
    let outcome = h
        .game
        .start_ship_production(h.planet, ShipType::SmallCargo, 0)
        .await
        .unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn shipyard_upgrade_blocks_production() {
    let h = harness().await;
    shipyard_ready(&h).await;
    h.set_building(BuildingType::RoboticsFactory, 2).await;
    assert!(
        h.game
            .start_building(h.planet, BuildingType::Shipyard)
            .await
            .unwrap()
            .success
    );
    let outcome = h
        .game
        .start_ship_production(h.planet, ShipType::SmallCargo, 1)
        .await
        .unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
}

// =============================================================================
// Fleets
// =============================================================================

async fn fleet_ready(h: &Harness) -> Coordinates {
    h.set_resources(Resources::new(5000.0, 5000.0, 1000.0)).await;
    h.edit_planet(|p| {
        p.ships = BTreeMap::from([(ShipType::SmallCargo, 3), (ShipType::SolarSatellite, 4)]);
    })
    .await;
    let home = h.planet().await.coordinates;
    let position = if home.position == 1 { 2 } else { 1 };
    Coordinates::new(home.galaxy, home.system, position)
}

fn transport(origin: PlanetId, target: Coordinates, cargo: u64) -> DispatchRequest {
    DispatchRequest {
        origin_planet_id: origin,
        target,
        mission: MissionKind::Transport,
        ships: BTreeMap::from([(ShipType::SmallCargo, cargo)]),
        cargo: Resources::new(1000.0, 0.0, 0.0),
        speed_percent: 100.0,
    }
}

#[tokio::test]
async fn dispatching_more_ships_than_owned_fails_without_mutation() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let before = h.planet().await;
    let events_before = h.sink.names().len();

    let outcome = h
        .game
        .dispatch_fleet(transport(h.planet, target, 5))
        .await
        .unwrap();
    match rejection(&outcome) {
        Rejection::InvalidState { reason } => {
            assert!(reason.contains("not enough Small Cargo"), "{reason}");
        }
        other => panic!("unexpected rejection: {other:?}"),
    }
    assert_eq!(h.planet().await, before);
    assert_eq!(h.sink.names().len(), events_before);
}

#[tokio::test]
async fn satellites_cannot_be_dispatched() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let mut request = transport(h.planet, target, 1);
    request.ships.insert(ShipType::SolarSatellite, 1);
    let outcome = h.game.dispatch_fleet(request).await.unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn dispatch_then_recall_restores_everything() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let before = h.planet().await;

    let receipt = h
        .game
        .dispatch_fleet(transport(h.planet, target, 2))
        .await
        .unwrap()
        .into_entity()
        .unwrap();
    let fleet = receipt.fleet;
    assert_eq!(fleet.status, FleetStatus::Traveling);
    assert!(fleet.return_time.is_none());
    assert!(fleet.fuel_consumption > 0.0);
    assert_eq!(
        receipt.planned_return_time,
        fleet.arrival_time + Duration::seconds(i64::try_from(fleet.flight_seconds).unwrap())
    );

    let after = h.planet().await;
    assert_eq!(after.ship_count(ShipType::SmallCargo), 1);
    assert_eq!(after.resources.metal, before.resources.metal - 1000.0);
    assert_eq!(
        after.resources.deuterium,
        before.resources.deuterium - fleet.fuel_consumption
    );

    let recalled = h.game.recall_fleet(fleet.id).await.unwrap();
    assert!(recalled.success, "{}", recalled.message);
    assert_eq!(h.planet().await, before);
    assert!(h.sink.names().ends_with(&["fleet:dispatched", "fleet:recalled"]));
}

#[tokio::test]
async fn recall_after_arrival_time_is_invalid_and_refunds_nothing() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let fleet = h
        .game
        .dispatch_fleet(transport(h.planet, target, 2))
        .await
        .unwrap()
        .into_entity()
        .unwrap()
        .fleet;
    let before = h.planet().await;

    h.advance(i64::try_from(fleet.flight_seconds).unwrap());
    let outcome = h.game.recall_fleet(fleet.id).await.unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
    assert_eq!(h.planet().await, before);

    let mut tx = h.store.begin().await.unwrap();
    assert!(tx.fleet(fleet.id).await.unwrap().is_some());
}

#[tokio::test]
async fn fleet_arrives_then_returns_ships_and_cargo() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let fleet = h
        .game
        .dispatch_fleet(transport(h.planet, target, 2))
        .await
        .unwrap()
        .into_entity()
        .unwrap()
        .fleet;
    let flight = i64::try_from(fleet.flight_seconds).unwrap();

    h.advance(flight);
    let arrived = h.game.sweep_completions().await.unwrap();
    assert_eq!(arrived, vec![Completion::FleetArrived { fleet_id: fleet.id }]);
    {
        let mut tx = h.store.begin().await.unwrap();
        let stored = tx.fleet(fleet.id).await.unwrap().unwrap();
        assert_eq!(stored.status, FleetStatus::Arrived);
        assert_eq!(
            stored.return_time,
            Some(fleet.arrival_time + Duration::seconds(flight))
        );
    }

    h.advance(flight);
    let returned = h.game.sweep_completions().await.unwrap();
    assert_eq!(returned, vec![Completion::FleetReturned { fleet_id: fleet.id }]);

    let planet = h.planet().await;
    assert_eq!(planet.ship_count(ShipType::SmallCargo), 3);
    // Cargo came back on top of what the mines produced meanwhile.
    assert!(planet.resources.metal >= 5000.0);
    // Fuel was burnt.
    assert!(planet.resources.deuterium < 1000.0);

    let mut tx = h.store.begin().await.unwrap();
    assert!(tx.fleet(fleet.id).await.unwrap().is_none());
}

#[tokio::test]
async fn cargo_beyond_capacity_is_rejected() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let mut request = transport(h.planet, target, 1);
    request.cargo = Resources::new(3000.0, 3000.0, 0.0);
    let outcome = h.game.dispatch_fleet(request).await.unwrap();
    assert!(matches!(rejection(&outcome), Rejection::InvalidState { .. }));
}

#[tokio::test]
async fn cargo_beyond_planet_stock_is_insufficient_resources() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let before = h.planet().await;
    let mut request = transport(h.planet, target, 3);
    request.cargo = Resources::new(6000.0, 0.0, 0.0);

    let outcome = h.game.dispatch_fleet(request).await.unwrap();
    assert!(matches!(
        rejection(&outcome),
        Rejection::InsufficientResources { .. }
    ));
    assert_eq!(h.planet().await, before);
}

#[tokio::test]
async fn deuterium_must_cover_cargo_and_fuel() {
    let h = harness().await;
    let target = fleet_ready(&h).await;
    let before = h.planet().await;
    let mut request = transport(h.planet, target, 2);
    // All of the planet's deuterium as cargo leaves nothing to burn.
    request.cargo = Resources::new(0.0, 0.0, before.resources.deuterium);

    let outcome = h.game.dispatch_fleet(request).await.unwrap();
    match rejection(&outcome) {
        Rejection::InsufficientResources { required, .. } => {
            assert!(required.deuterium > before.resources.deuterium);
        }
        other => panic!("unexpected rejection: {other:?}"),
    }
    assert_eq!(h.planet().await, before);
    let mut tx = h.store.begin().await.unwrap();
    let far_future = start_time() + Duration::days(3650);
    assert!(tx.fleets_arriving(far_future).await.unwrap().is_empty());
}
