//! Static game data: base costs, ship statistics, prerequisite lists.
//!
//! Every table is an exhaustive `match`, so adding a variant to one of the
//! enums in `lunaris-types` fails to compile until its data is filled in.

use lunaris_types::{BuildingType, ResearchType, Resources, ShipType};

use crate::prerequisites::Requirement;
use crate::prerequisites::Requirement::{Building as Bld, Research as Res};
use lunaris_types::BuildingType as B;
use lunaris_types::ResearchType as R;

// ---------------------------------------------------------------------------
// Base costs
// ---------------------------------------------------------------------------

/// Cost of the first level of a building.
#[allow(clippy::match_same_arms)] // Each building has its own price; keeping them separate for readability.
pub const fn building_base_cost(building: BuildingType) -> Resources {
    match building {
        BuildingType::MetalMine => Resources::new(60.0, 15.0, 0.0),
        BuildingType::CrystalMine => Resources::new(48.0, 24.0, 0.0),
        BuildingType::DeuteriumSynthesizer => Resources::new(225.0, 75.0, 0.0),
        BuildingType::SolarPlant => Resources::new(75.0, 30.0, 0.0),
        BuildingType::FusionReactor => Resources::new(900.0, 360.0, 180.0),
        BuildingType::RoboticsFactory => Resources::new(400.0, 120.0, 200.0),
        BuildingType::NaniteFactory => Resources::new(1_000_000.0, 500_000.0, 100_000.0),
        BuildingType::Shipyard => Resources::new(400.0, 200.0, 100.0),
        BuildingType::ResearchLab => Resources::new(200.0, 400.0, 200.0),
        BuildingType::MetalStorage => Resources::new(1000.0, 0.0, 0.0),
        BuildingType::CrystalStorage => Resources::new(1000.0, 500.0, 0.0),
        BuildingType::DeuteriumTank => Resources::new(1000.0, 1000.0, 0.0),
    }
}

/// Cost of the first level of a technology.
#[allow(clippy::match_same_arms)]
pub const fn research_base_cost(research: ResearchType) -> Resources {
    match research {
        ResearchType::Energy => Resources::new(0.0, 800.0, 400.0),
        ResearchType::Laser => Resources::new(200.0, 100.0, 0.0),
        ResearchType::Ion => Resources::new(1000.0, 300.0, 100.0),
        ResearchType::Hyperspace => Resources::new(0.0, 4000.0, 2000.0),
        ResearchType::Plasma => Resources::new(2000.0, 4000.0, 1000.0),
        ResearchType::CombustionDrive => Resources::new(400.0, 0.0, 600.0),
        ResearchType::ImpulseDrive => Resources::new(2000.0, 4000.0, 600.0),
        ResearchType::HyperspaceDrive => Resources::new(10_000.0, 20_000.0, 6000.0),
        ResearchType::Espionage => Resources::new(200.0, 1000.0, 200.0),
        ResearchType::Computer => Resources::new(0.0, 400.0, 600.0),
        ResearchType::Astrophysics => Resources::new(4000.0, 8000.0, 4000.0),
        ResearchType::IntergalacticResearchNetwork => {
            Resources::new(240_000.0, 400_000.0, 160_000.0)
        }
        ResearchType::Graviton => Resources::ZERO,
        ResearchType::Weapons => Resources::new(800.0, 200.0, 0.0),
        ResearchType::Shielding => Resources::new(200.0, 600.0, 0.0),
        ResearchType::Armour => Resources::new(1000.0, 0.0, 0.0),
        ResearchType::Expedition => Resources::new(4000.0, 8000.0, 4000.0),
    }
}

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

/// Static statistics of a ship class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipStats {
    /// Cost of a single unit.
    pub cost: Resources,
    /// Base speed before drive bonuses. Zero for stationary ships.
    pub speed: f64,
    /// Cargo capacity per unit.
    pub cargo: f64,
    /// Base deuterium consumption per unit.
    pub fuel: f64,
}

impl ShipStats {
    /// Whether the ship can leave its planet at all.
    pub fn is_stationary(&self) -> bool {
        self.speed <= 0.0
    }
}

/// Return the static statistics for a ship class.
#[allow(clippy::too_many_lines)] // One arm per ship class; splitting would obscure the table.
pub const fn ship_stats(ship: ShipType) -> ShipStats {
    match ship {
        ShipType::SmallCargo => ShipStats {
            cost: Resources::new(2000.0, 2000.0, 0.0),
            speed: 5000.0,
            cargo: 5000.0,
            fuel: 10.0,
        },
        ShipType::LargeCargo => ShipStats {
            cost: Resources::new(6000.0, 6000.0, 0.0),
            speed: 7500.0,
            cargo: 25_000.0,
            fuel: 50.0,
        },
        ShipType::Recycler => ShipStats {
            cost: Resources::new(10_000.0, 6000.0, 2000.0),
            speed: 2000.0,
            cargo: 20_000.0,
            fuel: 300.0,
        },
        ShipType::EspionageProbe => ShipStats {
            cost: Resources::new(0.0, 1000.0, 0.0),
            speed: 100_000_000.0,
            cargo: 5.0,
            fuel: 1.0,
        },
        ShipType::SolarSatellite => ShipStats {
            cost: Resources::new(0.0, 2000.0, 500.0),
            speed: 0.0,
            cargo: 0.0,
            fuel: 0.0,
        },
        ShipType::ColonyShip => ShipStats {
            cost: Resources::new(10_000.0, 20_000.0, 10_000.0),
            speed: 2500.0,
            cargo: 7500.0,
            fuel: 1000.0,
        },
        ShipType::LightFighter => ShipStats {
            cost: Resources::new(3000.0, 1000.0, 0.0),
            speed: 12_500.0,
            cargo: 50.0,
            fuel: 20.0,
        },
        ShipType::HeavyFighter => ShipStats {
            cost: Resources::new(6000.0, 4000.0, 0.0),
            speed: 10_000.0,
            cargo: 100.0,
            fuel: 75.0,
        },
        ShipType::Cruiser => ShipStats {
            cost: Resources::new(20_000.0, 7000.0, 2000.0),
            speed: 15_000.0,
            cargo: 800.0,
            fuel: 300.0,
        },
        ShipType::Battleship => ShipStats {
            cost: Resources::new(45_000.0, 15_000.0, 0.0),
            speed: 10_000.0,
            cargo: 1500.0,
            fuel: 500.0,
        },
        ShipType::Battlecruiser => ShipStats {
            cost: Resources::new(30_000.0, 40_000.0, 15_000.0),
            speed: 10_000.0,
            cargo: 750.0,
            fuel: 250.0,
        },
        ShipType::Bomber => ShipStats {
            cost: Resources::new(50_000.0, 25_000.0, 15_000.0),
            speed: 4000.0,
            cargo: 500.0,
            fuel: 700.0,
        },
        ShipType::Destroyer => ShipStats {
            cost: Resources::new(60_000.0, 50_000.0, 15_000.0),
            speed: 5000.0,
            cargo: 2000.0,
            fuel: 1000.0,
        },
        ShipType::Deathstar => ShipStats {
            cost: Resources::new(5_000_000.0, 4_000_000.0, 1_000_000.0),
            speed: 100.0,
            cargo: 1_000_000.0,
            fuel: 1.0,
        },
    }
}

// ---------------------------------------------------------------------------
// Prerequisites
// ---------------------------------------------------------------------------

/// Prerequisites for upgrading a building.
pub const fn building_requirements(building: BuildingType) -> &'static [Requirement] {
    match building {
        B::FusionReactor => &[Bld(B::DeuteriumSynthesizer, 5), Res(R::Energy, 3)],
        B::NaniteFactory => &[Bld(B::RoboticsFactory, 10), Res(R::Computer, 10)],
        B::Shipyard => &[Bld(B::RoboticsFactory, 2)],
        B::MetalMine
        | B::CrystalMine
        | B::DeuteriumSynthesizer
        | B::SolarPlant
        | B::RoboticsFactory
        | B::ResearchLab
        | B::MetalStorage
        | B::CrystalStorage
        | B::DeuteriumTank => &[],
    }
}

/// Prerequisites for researching a technology.
pub const fn research_requirements(research: ResearchType) -> &'static [Requirement] {
    match research {
        R::Energy => &[Bld(B::ResearchLab, 1)],
        R::Laser => &[Bld(B::ResearchLab, 1), Res(R::Energy, 2)],
        R::Ion => &[Bld(B::ResearchLab, 4), Res(R::Laser, 5), Res(R::Energy, 4)],
        R::Hyperspace => &[Bld(B::ResearchLab, 7), Res(R::Energy, 5), Res(R::Shielding, 5)],
        R::Plasma => &[
            Bld(B::ResearchLab, 4),
            Res(R::Energy, 8),
            Res(R::Laser, 10),
            Res(R::Ion, 5),
        ],
        R::CombustionDrive => &[Bld(B::ResearchLab, 1), Res(R::Energy, 1)],
        R::ImpulseDrive => &[Bld(B::ResearchLab, 2), Res(R::Energy, 1)],
        R::HyperspaceDrive => &[Bld(B::ResearchLab, 7), Res(R::Hyperspace, 3)],
        R::Espionage => &[Bld(B::ResearchLab, 3)],
        R::Computer => &[Bld(B::ResearchLab, 1)],
        R::Astrophysics => &[
            Bld(B::ResearchLab, 3),
            Res(R::Espionage, 4),
            Res(R::ImpulseDrive, 3),
        ],
        R::IntergalacticResearchNetwork => &[
            Bld(B::ResearchLab, 10),
            Res(R::Computer, 8),
            Res(R::Hyperspace, 8),
        ],
        R::Graviton => &[Bld(B::ResearchLab, 12)],
        R::Weapons => &[Bld(B::ResearchLab, 4)],
        R::Shielding => &[Bld(B::ResearchLab, 6), Res(R::Energy, 3)],
        R::Armour => &[Bld(B::ResearchLab, 2)],
        R::Expedition => &[Bld(B::ResearchLab, 3), Res(R::Computer, 4), Res(R::ImpulseDrive, 3)],
    }
}

/// Prerequisites for producing a ship class.
pub const fn ship_requirements(ship: ShipType) -> &'static [Requirement] {
    match ship {
        ShipType::SmallCargo => &[Bld(B::Shipyard, 2), Res(R::CombustionDrive, 2)],
        ShipType::LargeCargo => &[Bld(B::Shipyard, 4), Res(R::CombustionDrive, 6)],
        ShipType::Recycler => &[
            Bld(B::Shipyard, 4),
            Res(R::CombustionDrive, 6),
            Res(R::Shielding, 2),
        ],
        ShipType::EspionageProbe => &[
            Bld(B::Shipyard, 3),
            Res(R::CombustionDrive, 3),
            Res(R::Espionage, 2),
        ],
        ShipType::SolarSatellite => &[Bld(B::Shipyard, 1)],
        ShipType::ColonyShip => &[Bld(B::Shipyard, 4), Res(R::ImpulseDrive, 3)],
        ShipType::LightFighter => &[Bld(B::Shipyard, 1), Res(R::CombustionDrive, 1)],
        ShipType::HeavyFighter => &[
            Bld(B::Shipyard, 3),
            Res(R::Armour, 2),
            Res(R::ImpulseDrive, 2),
        ],
        ShipType::Cruiser => &[Bld(B::Shipyard, 5), Res(R::ImpulseDrive, 4), Res(R::Ion, 2)],
        ShipType::Battleship => &[Bld(B::Shipyard, 7), Res(R::HyperspaceDrive, 4)],
        ShipType::Battlecruiser => &[
            Bld(B::Shipyard, 8),
            Res(R::Hyperspace, 5),
            Res(R::Laser, 12),
            Res(R::HyperspaceDrive, 5),
        ],
        ShipType::Bomber => &[Bld(B::Shipyard, 8), Res(R::ImpulseDrive, 6), Res(R::Plasma, 5)],
        ShipType::Destroyer => &[
            Bld(B::Shipyard, 9),
            Res(R::HyperspaceDrive, 6),
            Res(R::Hyperspace, 5),
        ],
        ShipType::Deathstar => &[
            Bld(B::Shipyard, 12),
            Res(R::HyperspaceDrive, 7),
            Res(R::Hyperspace, 6),
            Res(R::Graviton, 1),
        ],
    }
}

// ---------------------------------------------------------------------------
// Planet climate
// ---------------------------------------------------------------------------

/// Maximum temperature of the innermost orbital position.
const INNERMOST_TEMPERATURE: i32 = 240;

/// Temperature drop per orbital position outward.
const TEMPERATURE_STEP: i32 = 25;

/// Maximum surface temperature for an orbital position (1 is innermost).
///
/// Positions below 1 are treated as 1.
pub fn temperature_for_position(position: u32) -> i32 {
    let steps = i32::try_from(position.saturating_sub(1)).unwrap_or(i32::MAX);
    INNERMOST_TEMPERATURE.saturating_sub(steps.saturating_mul(TEMPERATURE_STEP))
}
