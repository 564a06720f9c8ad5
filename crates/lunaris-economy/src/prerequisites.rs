//! Prerequisite checking against building and research levels.
//!
//! Every requirement in a list is evaluated, in order, so callers can show
//! the player the full list of deficits rather than only the first one.

use std::collections::BTreeMap;

use lunaris_types::{BuildingLevels, BuildingType, ResearchType, ShipType};
use serde::Serialize;

use crate::catalog;

/// A minimum level of a building or technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Requirement {
    /// The planet must have this building at this level or higher.
    Building(BuildingType, u32),
    /// The account must have this technology at this level or higher.
    Research(ResearchType, u32),
}

impl Requirement {
    /// Human-readable deficit, e.g. `Research Lab level 1 required (current: 0)`.
    pub fn describe(&self, current: u32) -> String {
        let (label, required) = match *self {
            Self::Building(building, level) => (building.label(), level),
            Self::Research(research, level) => (research.label(), level),
        };
        format!("{label} level {required} required (current: {current})")
    }
}

/// Outcome of a prerequisite check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PrerequisiteCheck {
    /// Whether every requirement is satisfied.
    pub met: bool,
    /// One entry per unmet requirement, in declaration order.
    pub missing: Vec<String>,
}

/// The levels prerequisites are checked against.
#[derive(Debug, Clone, Copy)]
pub struct Levels<'a> {
    /// Building levels on the planet performing the action.
    pub buildings: &'a BuildingLevels,
    /// Technology levels of the account.
    pub research: &'a BTreeMap<ResearchType, u32>,
}

impl Levels<'_> {
    fn current(&self, requirement: Requirement) -> u32 {
        match requirement {
            Requirement::Building(building, _) => {
                self.buildings.get(&building).copied().unwrap_or(0)
            }
            Requirement::Research(research, _) => {
                self.research.get(&research).copied().unwrap_or(0)
            }
        }
    }
}

/// Check a list of requirements without short-circuiting.
pub fn check(requirements: &[Requirement], levels: Levels<'_>) -> PrerequisiteCheck {
    let missing: Vec<String> = requirements
        .iter()
        .filter_map(|&requirement| {
            let required = match requirement {
                Requirement::Building(_, level) | Requirement::Research(_, level) => level,
            };
            let current = levels.current(requirement);
            (current < required).then(|| requirement.describe(current))
        })
        .collect();
    PrerequisiteCheck {
        met: missing.is_empty(),
        missing,
    }
}

/// Check the prerequisites of a building upgrade.
pub fn check_building(building: BuildingType, levels: Levels<'_>) -> PrerequisiteCheck {
    check(catalog::building_requirements(building), levels)
}

/// Check the prerequisites of a research.
pub fn check_research(research: ResearchType, levels: Levels<'_>) -> PrerequisiteCheck {
    check(catalog::research_requirements(research), levels)
}

/// Check the prerequisites of a ship class.
pub fn check_ship(ship: ShipType, levels: Levels<'_>) -> PrerequisiteCheck {
    check(catalog::ship_requirements(ship), levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> (BuildingLevels, BTreeMap<ResearchType, u32>) {
        (BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn no_requirements_is_trivially_met() {
        let (buildings, research) = empty();
        let result = check_building(
            BuildingType::MetalMine,
            Levels {
                buildings: &buildings,
                research: &research,
            },
        );
        assert!(result.met);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn lists_every_missing_requirement_in_order() {
        let (buildings, research) = empty();
        let result = check_research(
            ResearchType::Ion,
            Levels {
                buildings: &buildings,
                research: &research,
            },
        );
        assert!(!result.met);
        assert_eq!(
            result.missing,
            vec![
                "Research Lab level 4 required (current: 0)".to_owned(),
                "Laser Technology level 5 required (current: 0)".to_owned(),
                "Energy Technology level 4 required (current: 0)".to_owned(),
            ]
        );
    }

    #[test]
    fn partially_met_reports_only_the_gaps() {
        let buildings = BTreeMap::from([(BuildingType::Shipyard, 2)]);
        let research = BTreeMap::from([(ResearchType::CombustionDrive, 1)]);
        let result = check_ship(
            ShipType::SmallCargo,
            Levels {
                buildings: &buildings,
                research: &research,
            },
        );
        assert_eq!(
            result.missing,
            vec!["Combustion Drive level 2 required (current: 1)".to_owned()]
        );
    }

    #[test]
    fn higher_levels_satisfy_requirements() {
        let buildings = BTreeMap::from([(BuildingType::ResearchLab, 9)]);
        let (_, research) = empty();
        let result = check_research(
            ResearchType::Energy,
            Levels {
                buildings: &buildings,
                research: &research,
            },
        );
        assert!(result.met);
    }
}
