//! Account registration: the research record and a first planet.

use std::collections::BTreeMap;

use lunaris_economy::catalog::temperature_for_position;
use lunaris_types::{AccountId, Building, BuildingType, Coordinates, GameEvent, Planet, PlanetId, Research};
use rand::Rng;
use tracing::info;

use crate::clock::Clock;
use crate::config::UniverseConfig;
use crate::error::GameError;
use crate::game::Game;
use crate::outcome::{ActionOutcome, Rejection};
use crate::store::{GameStore, StoreTx};

/// How many random coordinates to try before giving up.
const PLACEMENT_ATTEMPTS: usize = 64;

/// Draw candidate homeworld coordinates uniformly from the universe.
pub fn candidate_coordinates<R: Rng + ?Sized>(
    universe: &UniverseConfig,
    rng: &mut R,
    count: usize,
) -> Vec<Coordinates> {
    (0..count)
        .map(|_| {
            Coordinates::new(
                rng.random_range(1..=universe.galaxies),
                rng.random_range(1..=universe.systems),
                rng.random_range(1..=universe.positions),
            )
        })
        .collect()
}

impl<S: GameStore, C: Clock> Game<S, C> {
    /// Create the research record and homeworld of a new account.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UniverseFull`] if no free coordinate was found.
    pub async fn register_homeworld(
        &self,
        account_id: AccountId,
    ) -> Result<ActionOutcome<Planet>, GameError> {
        // Drawn before the first await: the thread-local generator is not Send.
        let candidates = candidate_coordinates(&self.config.universe, &mut rand::rng(), PLACEMENT_ATTEMPTS);

        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        // The research record doubles as the registration marker.
        if !tx.create_research(&Research::new(account_id)).await? {
            return Ok(Rejection::invalid("the account already has a homeworld").into());
        }

        let mut coordinates = None;
        for candidate in candidates {
            if tx.planet_at(candidate).await?.is_none() {
                coordinates = Some(candidate);
                break;
            }
        }
        let coordinates = coordinates.ok_or(GameError::UniverseFull)?;

        let planet = Planet {
            id: PlanetId::new(),
            owner: account_id,
            name: self.config.homeworld.name.clone(),
            coordinates,
            temperature: temperature_for_position(coordinates.position),
            resources: self.config.homeworld.starting_resources(),
            resources_updated_at: now,
            ships: BTreeMap::new(),
            ship_queue: None,
            created_at: now,
        };

        tx.save_planet(&planet).await?;
        for &building_type in BuildingType::ALL {
            tx.save_building(&Building::new(planet.id, building_type))
                .await?;
        }
        tx.commit().await?;

        info!(%account_id, planet_id = %planet.id, %coordinates, "Homeworld created");
        self.emit(&GameEvent::PlanetCreated {
            planet_id: planet.id,
            account_id,
            coordinates,
        });
        Ok(ActionOutcome::ok(format!("homeworld created at {coordinates}"), planet))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn candidates_stay_inside_the_universe() {
        let universe = UniverseConfig {
            speed: 1.0,
            galaxies: 2,
            systems: 3,
            positions: 4,
        };
        let mut rng = StdRng::seed_from_u64(7);
        for c in candidate_coordinates(&universe, &mut rng, 500) {
            assert!((1..=2).contains(&c.galaxy));
            assert!((1..=3).contains(&c.system));
            assert!((1..=4).contains(&c.position));
        }
    }

    #[test]
    fn same_seed_same_candidates() {
        let universe = UniverseConfig::default();
        let a = candidate_coordinates(&universe, &mut StdRng::seed_from_u64(42), 8);
        let b = candidate_coordinates(&universe, &mut StdRng::seed_from_u64(42), 8);
        assert_eq!(a, b);
    }
}
