//! Player actions
//!
//! Every write entry point is an `Action`. `apply_action` pumps due timers
//! first, so a collaborator that never ticks still sees buffs expire.

use rand::Rng;

use super::economy::{buy_auto_fertilizer, buy_bird, buy_instant_fertilizer, harvest_fruit};
use super::progression::{grant_experience, restart};
use super::state::{GameEvent, GameState};
use super::wildcard::{WildcardEffect, WildcardId, use_wildcard};
use crate::Millis;
use crate::error::Rejection;

/// A single player command
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TillSoil,
    WaterPlant,
    HarvestFruit(String),
    UseWildcard(WildcardId),
    BuyAutoFertilizer,
    BuyInstantFertilizer,
    BuyBird,
    Restart,
}

/// What an accepted action produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// XP was granted; `levels` gained, `critical` if the roll hit
    Grew { levels: u32, critical: bool },
    Harvested,
    Wildcard(WildcardEffect),
    FertilizerLevel(u32),
    Bird(String),
    Restarted,
}

/// Apply `action` at time `now`
pub fn apply_action(
    state: &mut GameState,
    action: &Action,
    now: Millis,
) -> Result<Outcome, Rejection> {
    match action {
        Action::TillSoil => till_soil(state, now),
        Action::WaterPlant => water_plant(state, now),
        Action::HarvestFruit(slot) => harvest_fruit(state, slot, now).map(|()| Outcome::Harvested),
        Action::UseWildcard(id) => use_wildcard(state, *id, now).map(Outcome::Wildcard),
        Action::BuyAutoFertilizer => buy_auto_fertilizer(state, now).map(Outcome::FertilizerLevel),
        Action::BuyInstantFertilizer => buy_instant_fertilizer(state, now).map(|levels| {
            Outcome::Grew {
                levels,
                critical: false,
            }
        }),
        Action::BuyBird => buy_bird(state, now).map(Outcome::Bird),
        Action::Restart => {
            restart(state, now);
            Ok(Outcome::Restarted)
        }
    }
}

/// By-value form of `apply_action`: old state in, new state out
pub fn step(
    mut state: GameState,
    action: &Action,
    now: Millis,
) -> (GameState, Result<Outcome, Rejection>) {
    let result = apply_action(&mut state, action, now);
    (state, result)
}

/// Water the plant for `water_xp`
pub fn water_plant(state: &mut GameState, now: Millis) -> Result<Outcome, Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    let base = state.tuning.water_xp;
    Ok(grow_with_crit(state, base, now))
}

/// Till the soil: small XP grant plus a short growth buff, once per cooldown
pub fn till_soil(state: &mut GameState, now: Millis) -> Result<Outcome, Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    let remaining_ms = till_cooldown_remaining(state, now);
    if remaining_ms > 0 {
        return Err(Rejection::Cooldown { remaining_ms });
    }

    state.economy.last_till = Some(now);
    let base = state.tuning.till_xp;
    let outcome = grow_with_crit(state, base, now);
    if state.is_game_over() {
        return Ok(outcome);
    }

    let (multiplier, duration_ms) = (state.tuning.till_buff_multiplier, state.tuning.till_buff_ms);
    state.apply_growth_buff(multiplier, duration_ms, now);
    Ok(outcome)
}

/// Milliseconds until tilling is allowed again (0 = ready)
pub fn till_cooldown_remaining(state: &GameState, now: Millis) -> Millis {
    state.economy.last_till.map_or(0, |last| {
        (last + state.tuning.till_cooldown_ms).saturating_sub(now)
    })
}

/// Shared critical-hit roll for manual actions
fn grow_with_crit(state: &mut GameState, base: f64, now: Millis) -> Outcome {
    let critical = state.rng.random::<f64>() < state.tuning.crit_chance;
    let amount = if critical {
        base * state.tuning.crit_multiplier
    } else {
        base
    };
    if critical {
        state.score += state.tuning.crit_score_bonus;
        log::debug!("Critical hit: {} XP", amount);
        state.push_event(GameEvent::CriticalHit { xp: amount });
    }
    let levels = grant_experience(state, amount, now);
    Outcome::Grew { levels, critical }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::TreeEntity;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn state_with(crit_chance: f64) -> GameState {
        let tuning = Tuning {
            crit_chance,
            ..Tuning::default()
        };
        GameState::with_tuning(2024, tuning, 0)
    }

    #[test]
    fn test_till_cooldown_end_to_end() {
        let mut state = state_with(0.0);

        assert!(apply_action(&mut state, &Action::TillSoil, 0).is_ok());
        let xp = state.tree.experience;
        assert_eq!(xp, 80.0);

        let second = apply_action(&mut state, &Action::TillSoil, 1_000);
        assert_eq!(
            second,
            Err(Rejection::Cooldown {
                remaining_ms: 59_000
            })
        );
        assert_eq!(state.tree.experience, xp);

        assert!(apply_action(&mut state, &Action::TillSoil, 61_000).is_ok());
        assert!(state.tree.experience > xp || state.tree.level > 1);
    }

    #[test]
    fn test_till_applies_buff_after_grant() {
        let mut state = state_with(0.0);
        till_soil(&mut state, 0).expect("first till");
        assert_eq!(state.tree.experience, 80.0);
        assert_eq!(state.economy.growth_multiplier, 2.0);

        // Buff doubles the next grant: 80 + 1600 pays levels 1..=5 (1500)
        water_plant(&mut state, 1_000).expect("watered");
        assert_eq!(state.tree.level, 6);
        assert_eq!(state.tree.experience, 180.0);

        // And is gone 5s later
        water_plant(&mut state, 5_000).expect("watered");
        assert_eq!(state.economy.growth_multiplier, 1.0);
    }

    #[test]
    fn test_till_buff_applies_on_crit() {
        let mut state = state_with(1.0);
        let outcome = till_soil(&mut state, 0).expect("first till");
        assert!(matches!(outcome, Outcome::Grew { critical: true, .. }));
        // 80 * 5 = 400: levels 1 and 2 cost 300
        assert_eq!(state.tree.level, 3);
        assert_eq!(state.tree.experience, 100.0);
        assert_eq!(state.economy.growth_multiplier, 2.0);
        assert!(state.active_buff().is_some());
    }

    #[test]
    fn test_till_that_fills_garden_skips_buff() {
        let mut state = state_with(0.0);
        let mut y = SPAWN_MIN_Y - 10;
        while y <= SPAWN_MAX_Y + 10 {
            let mut x = SPAWN_MIN_X - 10;
            while x <= SPAWN_MAX_X + 10 {
                let id = state.next_entity_id();
                state.legacy_trees.push(TreeEntity {
                    id,
                    biome_id: "plains".to_string(),
                    origin: Vec2::new(x as f32, y as f32),
                    scale: 1.0,
                    paths: Vec::new(),
                    slots: Vec::new(),
                    score: 0,
                });
                x += 20;
            }
            y += 20;
        }
        state.tree.level = MATURITY_LEVEL - 1;
        state.tree.experience = state.tree.xp_required() - state.tuning.till_xp;
        state.drain_events();

        assert!(till_soil(&mut state, 0).is_ok());
        assert!(state.is_game_over());
        assert_eq!(state.economy.growth_multiplier, 1.0);
        assert!(state.active_buff().is_none());
        let events = state.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::GardenFull));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::BuffApplied { .. }))
        );
    }

    #[test]
    fn test_guaranteed_crit() {
        let mut state = state_with(1.0);
        let outcome = water_plant(&mut state, 0).expect("watered");
        assert!(matches!(outcome, Outcome::Grew { critical: true, .. }));
        assert_eq!(state.score, 50);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::CriticalHit { xp: 4_000.0 })
        );
        // 4000 XP: levels 1..=8 cost 3600
        assert_eq!(state.tree.level, 9);
        assert_eq!(state.tree.experience, 400.0);
    }

    #[test]
    fn test_no_crit() {
        let mut state = state_with(0.0);
        let outcome = water_plant(&mut state, 0).expect("watered");
        // 800 XP: 100 + 200 + 300, 200 left
        assert_eq!(
            outcome,
            Outcome::Grew {
                levels: 3,
                critical: false
            }
        );
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_harvest_unknown_slot_is_noop() {
        let mut state = state_with(0.0);
        let result = apply_action(&mut state, &Action::HarvestFruit("tip-nope".into()), 0);
        assert_eq!(result, Err(Rejection::FruitNotActive("tip-nope".into())));
        assert_eq!(state.economy.gold, 0);
        assert!(state.economy.active_fruits.is_empty());
    }

    #[test]
    fn test_step_threads_state() {
        let state = state_with(0.0);
        let (state, result) = step(state, &Action::WaterPlant, 0);
        assert!(result.is_ok());
        assert_eq!(state.tree.level, 4);
        let (state, result) = step(state, &Action::BuyBird, 0);
        assert!(matches!(result, Err(Rejection::InsufficientGold { .. })));
        assert_eq!(state.tree.level, 4);
    }

    #[test]
    fn test_restart_action() {
        let mut state = state_with(0.0);
        state.economy.gold = 40;
        water_plant(&mut state, 0).expect("watered");
        assert_eq!(
            apply_action(&mut state, &Action::Restart, 10),
            Ok(Outcome::Restarted)
        );
        assert_eq!(state.tree.level, 1);
        assert_eq!(state.economy.gold, 0);
    }
}
