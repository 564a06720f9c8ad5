//! Research queue: one research at a time per account.
//!
//! Research is paid for by one planet but its levels belong to the account
//! and apply on every planet. The paying planet is remembered so a cancel
//! refunds the same planet.

use lunaris_economy::{formulas, prerequisites};
use lunaris_types::{AccountId, BuildingType, CostInfo, GameEvent, PlanetId, Research, ResearchType};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{GameError, StoreError};
use crate::game::{Game, PlanetState, add_seconds};
use crate::outcome::{ActionOutcome, Rejection};
use crate::store::{GameStore, StoreTx};

impl<S: GameStore, C: Clock> Game<S, C> {
    /// Price, duration, and eligibility of the next level of a technology,
    /// paid from `planet_id`.
    pub async fn research_upgrade_info(
        &self,
        planet_id: PlanetId,
        research_type: ResearchType,
    ) -> Result<ActionOutcome<CostInfo>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        state.sync(now);

        let current = state.research_level(research_type);
        let cost = formulas::research_cost(research_type, current);
        let time = formulas::research_time(
            &cost,
            state.level(BuildingType::ResearchLab),
            self.universe_speed(),
        )?;
        let check = prerequisites::check_research(research_type, state.prerequisite_levels());

        Ok(ActionOutcome::ok(
            format!("{} level {}", research_type.label(), current.saturating_add(1)),
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

    /// Start researching the next level of a technology, paid by
    /// `planet_id`, which must belong to `account_id`.
    pub async fn start_research(
        &self,
        account_id: AccountId,
        planet_id: PlanetId,
        research_type: ResearchType,
    ) -> Result<ActionOutcome<Research>, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            return Ok(Rejection::not_found("planet", planet_id).into());
        };
        if state.planet.owner != account_id {
            return Ok(Rejection::not_found("planet", planet_id).into());
        }

        if state.research.researching {
            let busy = state
                .research
                .current_research
                .map_or("another technology", ResearchType::label);
            return Ok(Rejection::invalid(format!("{busy} is already being researched")).into());
        }

        let check = prerequisites::check_research(research_type, state.prerequisite_levels());
        if !check.met {
            return Ok(Rejection::PrerequisiteUnmet {
                missing: check.missing,
            }
            .into());
        }

        state.sync(now);
        let current = state.research_level(research_type);
        let cost = formulas::research_cost(research_type, current);
        if !state.planet.resources.covers(&cost) {
            return Ok(Rejection::InsufficientResources {
                required: cost,
                available: state.planet.resources,
            }
            .into());
        }

        let seconds = formulas::research_time(
            &cost,
            state.level(BuildingType::ResearchLab),
            self.universe_speed(),
        )?;
        let end_time = add_seconds(now, seconds)?;

        state.planet.resources = state.planet.resources - cost;
        let research = &mut state.research;
        research.researching = true;
        research.current_research = Some(research_type);
        research.research_planet_id = Some(planet_id);
        research.research_end_time = Some(end_time);

        tx.save_planet(&state.planet).await?;
        tx.save_research(&state.research).await?;
        tx.commit().await?;

        let target_level = current.saturating_add(1);
        info!(
            %account_id,
            %planet_id,
            research = research_type.key(),
            target_level,
            seconds,
            "Research started"
        );
        self.emit(&GameEvent::ResearchStarted {
            account_id,
            planet_id,
            research_type,
            target_level,
            end_time,
        });
        Ok(ActionOutcome::ok(
            format!("{} level {target_level} research started", research_type.label()),
            state.research,
        ))
    }

    /// Cancel the account's research and refund its full cost to the
    /// planet that paid for it.
    pub async fn cancel_research(
        &self,
        account_id: AccountId,
    ) -> Result<ActionOutcome<Research>, GameError> {
        let now = self.clock.now();
        let Some(snapshot) = self.research_snapshot(account_id).await? else {
            return Ok(Rejection::not_found("research", account_id).into());
        };
        let Some(planet_id) = snapshot.research_planet_id.filter(|_| snapshot.researching) else {
            return Ok(Rejection::invalid("no research in progress").into());
        };

        let mut tx = self.store.begin().await?;
        let Some(mut state) = PlanetState::load(&mut tx, planet_id).await? else {
            warn!(%account_id, %planet_id, "Paying planet of active research is missing");
            return Err(StoreError::Corrupt {
                reason: format!("research of {account_id} references missing planet {planet_id}"),
            }
            .into());
        };
        // Re-read under lock: the research may have finished or moved since the snapshot.
        let Some(research_type) = active_on(&state.research, planet_id) else {
            return Ok(Rejection::invalid("no research in progress").into());
        };

        state.sync(now);
        let refund = formulas::research_cost(research_type, state.research_level(research_type));
        state.planet.resources += refund;

        clear_active(&mut state.research);
        tx.save_planet(&state.planet).await?;
        tx.save_research(&state.research).await?;
        tx.commit().await?;

        info!(%account_id, research = research_type.key(), "Research cancelled");
        self.emit(&GameEvent::ResearchCancelled {
            account_id,
            planet_id,
            research_type,
            refund,
        });
        Ok(ActionOutcome::ok(
            format!("{} research cancelled", research_type.label()),
            state.research,
        ))
    }

    /// Apply a finished research. Rejected (without effect) if nothing is
    /// being researched or it is not yet due.
    ///
    /// The paying planet produces at the old level until the research
    /// finished and at the new one afterwards.
    pub async fn complete_research(
        &self,
        account_id: AccountId,
    ) -> Result<ActionOutcome<FinishedResearch>, GameError> {
        let now = self.clock.now();
        let Some(snapshot) = self.research_snapshot(account_id).await? else {
            return Ok(Rejection::not_found("research", account_id).into());
        };

        let mut tx = self.store.begin().await?;
        let mut payer = match snapshot.research_planet_id {
            Some(planet_id) => PlanetState::load(&mut tx, planet_id).await?,
            None => None,
        };
        let mut research = match &payer {
            Some(state) => state.research.clone(),
            None => match tx.research(account_id).await? {
                Some(research) => research,
                None => return Ok(Rejection::not_found("research", account_id).into()),
            },
        };
        let (Some(research_type), true) = (research.current_research, research.researching) else {
            return Ok(Rejection::invalid("no research in progress").into());
        };
        if payer
            .as_ref()
            .is_some_and(|state| research.research_planet_id != Some(state.planet.id))
        {
            return Ok(Rejection::invalid("research changed while completing").into());
        }
        let end_time = research.research_end_time.unwrap_or(now);
        if now < end_time {
            return Ok(Rejection::invalid("research not yet complete").into());
        }

        let level = research.level(research_type).saturating_add(1);
        if let Some(state) = payer.as_mut() {
            state.sync(end_time);
            state.research.levels.insert(research_type, level);
            state.sync(now);
            tx.save_planet(&state.planet).await?;
        }
        research.levels.insert(research_type, level);
        clear_active(&mut research);
        tx.save_research(&research).await?;
        tx.commit().await?;

        info!(%account_id, research = research_type.key(), level, "Research completed");
        self.emit(&GameEvent::ResearchCompleted {
            account_id,
            research_type,
            level,
        });
        Ok(ActionOutcome::ok(
            format!("{} reached level {level}", research_type.label()),
            FinishedResearch {
                research_type,
                level,
                research,
            },
        ))
    }

    /// Read an account's research in a transaction of its own.
    ///
    /// Operations that end up locking the paying planet take it from here
    /// first, so that the planet is always locked before the research row.
    async fn research_snapshot(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Research>, StoreError> {
        let mut tx = self.store.begin().await?;
        tx.research(account_id).await
    }
}

/// A research level reached by [`Game::complete_research`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedResearch {
    /// The technology.
    pub research_type: ResearchType,
    /// The level it reached.
    pub level: u32,
    /// The account's research record afterwards.
    pub research: Research,
}

/// The technology being researched, if it is paid by `planet_id`.
fn active_on(research: &Research, planet_id: PlanetId) -> Option<ResearchType> {
    research
        .current_research
        .filter(|_| research.researching && research.research_planet_id == Some(planet_id))
}

fn clear_active(research: &mut Research) {
    research.researching = false;
    research.current_research = None;
    research.research_planet_id = None;
    research.research_end_time = None;
}
