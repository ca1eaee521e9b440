//! Experience, leveling and the tree lifecycle
//!
//! seed -> sprout -> sapling -> tree -> mature (baked into the garden) -> new
//! tree elsewhere, until no room is left.

use rand::Rng;

use super::economy::try_spawn_fruit;
use super::growth::TreeShape;
use super::placement::PlacementSolver;
use super::state::{GameEvent, GamePhase, GameState, TreeEntity};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{Millis, xp_required};

/// Grant XP from any source; the growth multiplier applies
///
/// Returns the number of levels gained. No-op once the garden is full.
pub fn gain_experience(state: &mut GameState, amount: f64, now: Millis) -> u32 {
    state.advance_clock(now);
    grant_experience(state, amount, now)
}

/// `gain_experience` without pumping timers
pub(crate) fn grant_experience(state: &mut GameState, amount: f64, now: Millis) -> u32 {
    if state.is_game_over() {
        return 0;
    }
    let scaled = amount * state.economy.growth_multiplier;
    add_experience(state, scaled, now)
}

/// Add XP as-is and resolve every level-up it pays for
///
/// Reaching maturity stops the loop (leftover XP is forfeited) and completes
/// the tree.
pub(crate) fn add_experience(state: &mut GameState, amount: f64, now: Millis) -> u32 {
    if state.is_game_over() || !amount.is_finite() || amount <= 0.0 {
        return 0;
    }

    state.tree.experience += amount;
    let mut gained = 0;

    while state.tree.experience >= state.tree.xp_required() {
        state.tree.experience -= state.tree.xp_required();
        state.tree.level += 1;
        gained += 1;

        let level = state.tree.level;
        log::debug!("Tree reached level {} ({})", level, state.tree.stage());
        state.refresh_shape();
        state.start_growth_animation(now);
        state.push_event(GameEvent::LevelUp { level });

        if level >= FRUIT_MIN_LEVEL {
            let spawns = level_up_spawn_count(level, &state.tuning, &mut state.rng);
            for _ in 0..spawns {
                try_spawn_fruit(state);
            }
        }

        if level >= MATURITY_LEVEL {
            state.tree.experience = 0.0;
            break;
        }
    }

    if state.tree.level >= MATURITY_LEVEL {
        complete_tree(state, now);
    }

    gained
}

/// Fruit spawns owed for reaching `level`
///
/// The chance `base + level * per_level` pays its integer part outright and
/// rolls the fraction. A zero result gets one more roll at the full chance.
pub fn level_up_spawn_count<R: Rng + ?Sized>(level: u32, tuning: &Tuning, rng: &mut R) -> u32 {
    let chance = tuning.level_up_spawn_base + level as f64 * tuning.level_up_spawn_per_level;
    let guaranteed = chance.floor();
    let fraction = chance - guaranteed;

    let mut count = guaranteed as u32 + u32::from(rng.random::<f64>() < fraction);
    if count == 0 && rng.random::<f64>() < chance {
        count = 1;
    }
    count
}

/// XP still needed to reach `target` from the tree's current position
pub fn xp_to_level(state: &GameState, target: u32) -> f64 {
    let tree = &state.tree;
    if tree.level >= target {
        return 0.0;
    }
    let total: f64 = (tree.level..target).map(xp_required).sum();
    total - tree.experience
}

/// Score for a completed tree: a time bonus that decays 10 points per second
/// down to a floor, plus 50 per level
pub fn tree_score(elapsed_secs: u64, level: u32) -> u64 {
    let time_bonus =
        (TIME_BONUS_BASE - TIME_BONUS_PER_SECOND * elapsed_secs as f64).max(TIME_BONUS_FLOOR);
    (time_bonus + level as f64 * SCORE_PER_LEVEL).floor() as u64
}

/// Bake the active tree into the garden and plant the next one
///
/// Returns the baked tree's id. If no spawn position is left the phase
/// becomes `GameOver`.
pub fn complete_tree(state: &mut GameState, now: Millis) -> Option<u32> {
    if state.is_game_over() {
        return None;
    }

    let elapsed_secs = now.saturating_sub(state.tree.start_time) / 1000;
    let score = tree_score(elapsed_secs, state.tree.level);
    state.score += score;

    let id = state.next_entity_id();
    let biome = state.biome();
    state.legacy_trees.push(TreeEntity {
        id,
        biome_id: biome.id.to_string(),
        origin: state.tree.origin,
        scale: state.tree.scale,
        paths: state.shape.paths.clone(),
        slots: Vec::new(),
        score,
    });
    log::info!(
        "Tree {} completed in {}s at level {} ({}): +{} score",
        id,
        elapsed_secs,
        state.tree.level,
        biome.name,
        score
    );
    state.push_event(GameEvent::TreeCompleted { tree_id: id, score });

    state.biome_stage += 1;

    let solver = PlacementSolver::default();
    match solver.find_spawn_position(&state.legacy_trees, MAX_SPAWN_ATTEMPTS, &mut state.rng) {
        Some(origin) => {
            let scale = state.rng.random_range(MIN_TREE_SCALE..MAX_TREE_SCALE);
            state.reset_active_tree(origin, scale, now);
            let biome = state.biome();
            log::info!(
                "New tree planted at ({}, {}) scale {:.2} in {}",
                origin.x,
                origin.y,
                scale,
                biome.name
            );
            state.push_event(GameEvent::TreePlanted {
                origin,
                scale,
                biome: biome.id,
            });
        }
        None => {
            log::warn!(
                "Garden full after {} trees - game over (score {})",
                state.legacy_trees.len(),
                state.score
            );
            state.phase = GamePhase::GameOver;
            state.tree.experience = 0.0;
            state.shape = TreeShape::default();
            state.economy.active_fruits.clear();
            state.economy.active_birds.clear();
            state.push_event(GameEvent::GardenFull);
        }
    }

    Some(id)
}

/// Back to a single seed at the canonical origin
pub fn restart(state: &mut GameState, now: Millis) {
    state.phase = GamePhase::Growing;
    state.biome_stage = 0;
    state.score = 0;
    state.legacy_trees.clear();
    state.economy = Default::default();
    state.effect_label = None;
    state.is_growing = false;
    state.active_buff = None;
    state.timers.clear();
    state.reset_active_tree(INITIAL_ORIGIN, 1.0, now);
    log::info!("Garden restarted");
    state.push_event(GameEvent::Restarted);
}

/// Knock the active tree back to level 1 in place
pub(crate) fn wither(state: &mut GameState) {
    state.tree.level = 1;
    state.tree.experience = 0.0;
    state.economy.active_fruits.clear();
    state.economy.active_birds.clear();
    state.refresh_shape();
}
