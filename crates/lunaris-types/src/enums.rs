//! Enumeration types for the Lunaris game engine.
//!
//! Every enum has a stable snake_case key used for persistence and for the
//! browser API. Parsing an unknown key is a programming or data error and
//! yields [`UnknownTypeError`] rather than a soft rejection.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An unrecognised building, research, ship, mission, or status key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} type: {key:?}")]
pub struct UnknownTypeError {
    /// Which family of types was being parsed (e.g. `"building"`).
    pub kind: &'static str,
    /// The key that failed to parse.
    pub key: String,
}

/// Implements `ALL`, `key()`, `label()`, [`core::fmt::Display`] and
/// [`core::str::FromStr`] for a fieldless enum.
macro_rules! keyed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $key:literal, $label:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable snake_case key used in storage and over the wire.
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            /// Human-readable name shown to players.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.key())
            }
        }

        impl core::str::FromStr for $name {
            type Err = UnknownTypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(Self::$variant),)+
                    other => Err(UnknownTypeError {
                        kind: $kind,
                        key: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A storable planetary resource. Energy is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Metal, the basic construction material.
    Metal,
    /// Crystal, used for electronics and research.
    Crystal,
    /// Deuterium, fuel for fusion reactors and fleets.
    Deuterium,
}

keyed_enum!(ResourceKind, "resource", {
    Metal => "metal", "Metal",
    Crystal => "crystal", "Crystal",
    Deuterium => "deuterium", "Deuterium",
});

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A building that can exist on a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BuildingType {
    // --- Resource producers ---
    /// Extracts metal; consumes energy.
    MetalMine,
    /// Extracts crystal; consumes energy.
    CrystalMine,
    /// Extracts deuterium; yield rises on colder planets.
    DeuteriumSynthesizer,

    // --- Power ---
    /// Produces energy from sunlight.
    SolarPlant,
    /// Produces energy by burning deuterium.
    FusionReactor,

    // --- Facilities ---
    /// Speeds up building construction.
    RoboticsFactory,
    /// Halves construction and ship production time per level.
    NaniteFactory,
    /// Builds ships; speeds up ship production.
    Shipyard,
    /// Enables and speeds up research.
    ResearchLab,

    // --- Storage ---
    /// Raises the metal storage cap.
    MetalStorage,
    /// Raises the crystal storage cap.
    CrystalStorage,
    /// Raises the deuterium storage cap.
    DeuteriumTank,
}

keyed_enum!(BuildingType, "building", {
    MetalMine => "metal_mine", "Metal Mine",
    CrystalMine => "crystal_mine", "Crystal Mine",
    DeuteriumSynthesizer => "deuterium_synthesizer", "Deuterium Synthesizer",
    SolarPlant => "solar_plant", "Solar Plant",
    FusionReactor => "fusion_reactor", "Fusion Reactor",
    RoboticsFactory => "robotics_factory", "Robotics Factory",
    NaniteFactory => "nanite_factory", "Nanite Factory",
    Shipyard => "shipyard", "Shipyard",
    ResearchLab => "research_lab", "Research Lab",
    MetalStorage => "metal_storage", "Metal Storage",
    CrystalStorage => "crystal_storage", "Crystal Storage",
    DeuteriumTank => "deuterium_tank", "Deuterium Tank",
});

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// A technology researched once per account and shared by all its planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResearchType {
    /// Raises fusion reactor output.
    Energy,
    /// Laser technology.
    Laser,
    /// Ion technology.
    Ion,
    /// Hyperspace technology.
    Hyperspace,
    /// Plasma technology.
    Plasma,
    /// Combustion drive; also the drive bonus applied to every ship.
    CombustionDrive,
    /// Impulse drive.
    ImpulseDrive,
    /// Hyperspace drive.
    HyperspaceDrive,
    /// Espionage technology.
    Espionage,
    /// Computer technology.
    Computer,
    /// Astrophysics.
    Astrophysics,
    /// Intergalactic research network.
    IntergalacticResearchNetwork,
    /// Graviton technology.
    Graviton,
    /// Weapons technology.
    Weapons,
    /// Shielding technology.
    Shielding,
    /// Armour technology.
    Armour,
    /// Expedition technology.
    Expedition,
}

keyed_enum!(ResearchType, "research", {
    Energy => "energy", "Energy Technology",
    Laser => "laser", "Laser Technology",
    Ion => "ion", "Ion Technology",
    Hyperspace => "hyperspace", "Hyperspace Technology",
    Plasma => "plasma", "Plasma Technology",
    CombustionDrive => "combustion_drive", "Combustion Drive",
    ImpulseDrive => "impulse_drive", "Impulse Drive",
    HyperspaceDrive => "hyperspace_drive", "Hyperspace Drive",
    Espionage => "espionage", "Espionage Technology",
    Computer => "computer", "Computer Technology",
    Astrophysics => "astrophysics", "Astrophysics",
    IntergalacticResearchNetwork => "intergalactic_research_network", "Intergalactic Research Network",
    Graviton => "graviton", "Graviton Technology",
    Weapons => "weapons", "Weapons Technology",
    Shielding => "shielding", "Shielding Technology",
    Armour => "armour", "Armour Technology",
    Expedition => "expedition", "Expedition Technology",
});

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

/// A ship class produced by the shipyard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ShipType {
    // --- Civil ---
    /// Small cargo transporter.
    SmallCargo,
    /// Large cargo transporter.
    LargeCargo,
    /// Collects debris fields.
    Recycler,
    /// Fast scouting probe.
    EspionageProbe,
    /// Stationary energy satellite; never leaves its planet.
    SolarSatellite,
    /// Settles new planets.
    ColonyShip,

    // --- Military ---
    /// Light fighter.
    LightFighter,
    /// Heavy fighter.
    HeavyFighter,
    /// Cruiser.
    Cruiser,
    /// Battleship.
    Battleship,
    /// Battlecruiser.
    Battlecruiser,
    /// Bomber.
    Bomber,
    /// Destroyer.
    Destroyer,
    /// Deathstar.
    Deathstar,
}

keyed_enum!(ShipType, "ship", {
    SmallCargo => "small_cargo", "Small Cargo",
    LargeCargo => "large_cargo", "Large Cargo",
    Recycler => "recycler", "Recycler",
    EspionageProbe => "espionage_probe", "Espionage Probe",
    SolarSatellite => "solar_satellite", "Solar Satellite",
    ColonyShip => "colony_ship", "Colony Ship",
    LightFighter => "light_fighter", "Light Fighter",
    HeavyFighter => "heavy_fighter", "Heavy Fighter",
    Cruiser => "cruiser", "Cruiser",
    Battleship => "battleship", "Battleship",
    Battlecruiser => "battlecruiser", "Battlecruiser",
    Bomber => "bomber", "Bomber",
    Destroyer => "destroyer", "Destroyer",
    Deathstar => "deathstar", "Deathstar",
});

// ---------------------------------------------------------------------------
// Fleets
// ---------------------------------------------------------------------------

/// The purpose of a fleet movement.
///
/// Arrival effects are not simulated for any mission: fleets are marked
/// arrived and later return with their cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MissionKind {
    /// Attack the target planet.
    Attack,
    /// Deliver cargo to the target planet.
    Transport,
    /// Station the fleet at an owned planet.
    Deploy,
    /// Spy on the target planet.
    Espionage,
    /// Settle an empty position.
    Colonize,
    /// Harvest a debris field.
    Recycle,
    /// Explore deep space.
    Expedition,
}

keyed_enum!(MissionKind, "mission", {
    Attack => "attack", "Attack",
    Transport => "transport", "Transport",
    Deploy => "deploy", "Deploy",
    Espionage => "espionage", "Espionage",
    Colonize => "colonize", "Colonize",
    Recycle => "recycle", "Recycle",
    Expedition => "expedition", "Expedition",
});

/// Lifecycle state of a dispatched fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FleetStatus {
    /// Outbound and still recallable before its arrival time.
    Traveling,
    /// Reached the target; awaiting its return time.
    Arrived,
}

keyed_enum!(FleetStatus, "fleet status", {
    Traveling => "traveling", "Traveling",
    Arrived => "arrived", "Arrived",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seventeen_research_types() {
        assert_eq!(ResearchType::ALL.len(), 17);
    }

    #[test]
    fn keys_roundtrip_through_from_str() {
        for &b in BuildingType::ALL {
            assert_eq!(b.key().parse::<BuildingType>(), Ok(b));
        }
        for &r in ResearchType::ALL {
            assert_eq!(r.key().parse::<ResearchType>(), Ok(r));
        }
        for &s in ShipType::ALL {
            assert_eq!(s.key().parse::<ShipType>(), Ok(s));
        }
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = "warp_gate".parse::<BuildingType>();
        assert_eq!(
            err,
            Err(UnknownTypeError {
                kind: "building",
                key: "warp_gate".to_owned(),
            })
        );
    }

    #[test]
    fn serde_uses_the_same_keys() {
        let json = serde_json::to_string(&ShipType::SmallCargo).unwrap_or_default();
        assert_eq!(json, "\"small_cargo\"");
        let json = serde_json::to_string(&ResearchType::IntergalacticResearchNetwork)
            .unwrap_or_default();
        assert_eq!(json, "\"intergalactic_research_network\"");
    }
}
