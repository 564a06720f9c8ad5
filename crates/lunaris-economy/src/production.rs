//! Energy balance, production rates, and storage caps of a planet.
//!
//! Energy starvation throttles what the mines produce, never what the
//! fusion reactor burns: metal, crystal, and gross deuterium are scaled by
//! the efficiency, then fusion consumption is subtracted at full rate.

use lunaris_types::{BuildingLevels, BuildingType, EnergyBalance, ProductionRates, Resources};
use tracing::debug;

use crate::formulas;

/// Everything on a planet that affects its economy.
#[derive(Debug, Clone, Copy)]
pub struct PlanetEconomy<'a> {
    /// Building levels; missing types are level 0.
    pub buildings: &'a BuildingLevels,
    /// Maximum surface temperature.
    pub temperature: i32,
    /// Docked solar satellites.
    pub solar_satellites: u64,
    /// Energy technology level of the owning account.
    pub energy_tech: u32,
}

impl PlanetEconomy<'_> {
    fn level(&self, building: BuildingType) -> u32 {
        self.buildings.get(&building).copied().unwrap_or(0)
    }
}

/// Compute energy production, consumption, and the resulting efficiency.
///
/// Efficiency is 1 whenever available energy is non-negative, otherwise
/// `production / consumption` clamped to `[0, 1]`.
pub fn energy_balance(planet: &PlanetEconomy<'_>) -> EnergyBalance {
    #[allow(clippy::cast_precision_loss)] // Satellite counts stay far below 2^52.
    let satellites = planet.solar_satellites as f64;

    let production = formulas::solar_plant_energy(planet.level(BuildingType::SolarPlant))
        + formulas::fusion_reactor_energy(
            planet.level(BuildingType::FusionReactor),
            planet.energy_tech,
        )
        + formulas::solar_satellite_energy(planet.temperature) * satellites;

    let consumption = formulas::mine_energy_consumption(planet.level(BuildingType::MetalMine))
        + formulas::mine_energy_consumption(planet.level(BuildingType::CrystalMine))
        + formulas::synthesizer_energy_consumption(
            planet.level(BuildingType::DeuteriumSynthesizer),
        );

    let available = production - consumption;
    let efficiency = if available >= 0.0 || consumption <= 0.0 {
        1.0
    } else {
        (production / consumption).clamp(0.0, 1.0)
    };

    EnergyBalance {
        production,
        consumption,
        available,
        efficiency,
    }
}

/// Compute per-hour production rates.
pub fn production_rates(planet: &PlanetEconomy<'_>) -> ProductionRates {
    let balance = energy_balance(planet);
    let efficiency = balance.efficiency;

    let metal = formulas::metal_production(planet.level(BuildingType::MetalMine)) * efficiency;
    let crystal =
        formulas::crystal_production(planet.level(BuildingType::CrystalMine)) * efficiency;
    let gross_deuterium = formulas::deuterium_production(
        planet.level(BuildingType::DeuteriumSynthesizer),
        planet.temperature,
    ) * efficiency;
    let fusion_burn = formulas::fusion_reactor_deuterium_consumption(
        planet.level(BuildingType::FusionReactor),
    );

    debug!(
        efficiency,
        metal, crystal, gross_deuterium, fusion_burn, "Computed production rates"
    );

    ProductionRates {
        metal,
        crystal,
        deuterium: gross_deuterium - fusion_burn,
        energy: balance.available,
    }
}

/// Storage cap for each resource.
pub fn storage_capacity(buildings: &BuildingLevels) -> Resources {
    let cap = |building| formulas::storage_capacity(buildings.get(&building).copied().unwrap_or(0));
    Resources::new(
        cap(BuildingType::MetalStorage),
        cap(BuildingType::CrystalStorage),
        cap(BuildingType::DeuteriumTank),
    )
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn economy(buildings: &BuildingLevels) -> PlanetEconomy<'_> {
        PlanetEconomy {
            buildings,
            temperature: 20,
            solar_satellites: 0,
            energy_tech: 0,
        }
    }

    #[test]
    fn solar_plant_covers_two_small_mines() {
        let buildings = BTreeMap::from([
            (BuildingType::SolarPlant, 5),
            (BuildingType::MetalMine, 1),
            (BuildingType::CrystalMine, 1),
        ]);
        let balance = energy_balance(&economy(&buildings));
        assert_eq!(balance.efficiency, 1.0);
        assert!(balance.available > 0.0);
    }

    #[test]
    fn no_buildings_means_full_efficiency() {
        let buildings = BTreeMap::new();
        let balance = energy_balance(&economy(&buildings));
        assert_eq!(balance.consumption, 0.0);
        assert_eq!(balance.efficiency, 1.0);
    }

    #[test]
    fn starvation_scales_every_mine_by_the_same_factor() {
        // Solar 1 = 22 energy; metal 5 + crystal 5 = 2 * 81 = 162 consumed.
        let buildings = BTreeMap::from([
            (BuildingType::SolarPlant, 1),
            (BuildingType::MetalMine, 5),
            (BuildingType::CrystalMine, 5),
            (BuildingType::DeuteriumSynthesizer, 2),
        ]);
        let planet = economy(&buildings);
        let balance = energy_balance(&planet);
        assert!(balance.efficiency > 0.0 && balance.efficiency < 1.0);
        assert_eq!(balance.efficiency, balance.production / balance.consumption);

        let rates = production_rates(&planet);
        assert_eq!(rates.metal, formulas::metal_production(5) * balance.efficiency);
        assert_eq!(
            rates.crystal,
            formulas::crystal_production(5) * balance.efficiency
        );
        assert_eq!(
            rates.deuterium,
            formulas::deuterium_production(2, 20) * balance.efficiency
        );
        assert!(rates.energy < 0.0);
    }

    #[test]
    fn fusion_burn_is_not_throttled() {
        let buildings = BTreeMap::from([
            (BuildingType::FusionReactor, 2),
            (BuildingType::MetalMine, 10),
        ]);
        let rates = production_rates(&economy(&buildings));
        // No synthesizer: net deuterium is exactly minus the reactor's burn.
        assert_eq!(
            rates.deuterium,
            -formulas::fusion_reactor_deuterium_consumption(2)
        );
    }

    #[test]
    fn satellites_add_energy() {
        let buildings = BTreeMap::from([(BuildingType::MetalMine, 1)]);
        let mut planet = economy(&buildings);
        let without = energy_balance(&planet);
        planet.solar_satellites = 2;
        let with = energy_balance(&planet);
        assert_eq!(with.production - without.production, 2.0 * 26.0);
    }

    #[test]
    fn base_production_without_mines() {
        let buildings = BTreeMap::new();
        let rates = production_rates(&economy(&buildings));
        assert_eq!(rates.metal, 30.0);
        assert_eq!(rates.crystal, 15.0);
        assert_eq!(rates.deuterium, 0.0);
    }

    #[test]
    fn storage_follows_each_building() {
        let buildings = BTreeMap::from([(BuildingType::CrystalStorage, 1)]);
        assert_eq!(
            storage_capacity(&buildings),
            Resources::new(10_000.0, 30_000.0, 10_000.0)
        );
    }
}
