//! Gold, fruit, birds and fertilizer

use rand::Rng;

use super::progression::add_experience;
use super::state::{GameEvent, GameState};
use crate::Millis;
use crate::error::Rejection;

/// Put a fruit on a random free slot, respecting the level cap
///
/// Returns the slot id used.
pub fn try_spawn_fruit(state: &mut GameState) -> Option<String> {
    if state.is_game_over() {
        return None;
    }
    let cap = state.tuning.fruit_cap(state.tree.level);
    if state.economy.active_fruits.len() >= cap {
        return None;
    }
    let mut free = state.free_slots();
    if free.is_empty() {
        return None;
    }
    let pick = state.rng.random_range(0..free.len());
    let slot = free.swap_remove(pick);
    state.economy.active_fruits.insert(slot.clone());
    log::debug!("Fruit spawned on {}", slot);
    state.push_event(GameEvent::FruitSpawned { slot: slot.clone() });
    Some(slot)
}

/// Spawn a fruit with probability `chance`
pub fn roll_fruit(state: &mut GameState, chance: f64) -> Option<String> {
    if state.rng.random::<f64>() < chance {
        try_spawn_fruit(state)
    } else {
        None
    }
}

/// Pick the fruit on `slot_id` for gold and score
///
/// Harvesting the same slot twice is rejected the second time.
pub fn harvest_fruit(state: &mut GameState, slot_id: &str, now: Millis) -> Result<(), Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    if !state.economy.active_fruits.remove(slot_id) {
        return Err(Rejection::FruitNotActive(slot_id.to_string()));
    }
    state.economy.gold += state.tuning.harvest_gold;
    state.score += state.tuning.harvest_score;
    state.push_event(GameEvent::FruitHarvested {
        slot: slot_id.to_string(),
    });
    Ok(())
}

/// Seat a bird on a random free slot
pub fn spawn_bird(state: &mut GameState) -> Option<String> {
    let mut free = state.free_slots();
    if free.is_empty() {
        return None;
    }
    let pick = state.rng.random_range(0..free.len());
    let slot = free.swap_remove(pick);
    state.economy.active_birds.insert(slot.clone());
    state.push_event(GameEvent::BirdPerched { slot: slot.clone() });
    Some(slot)
}

/// Buy a decorative bird; needs a free slot and `bird_cost` gold
pub fn buy_bird(state: &mut GameState, now: Millis) -> Result<String, Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    let cost = state.tuning.bird_cost;
    spend_gold(state, cost, false)?;
    if state.free_slots().is_empty() {
        return Err(Rejection::NoFreeSlot);
    }
    spend_gold(state, cost, true)?;
    spawn_bird(state).ok_or(Rejection::NoFreeSlot)
}

/// Raise the passive XP trickle by one level
///
/// Costs `base * (fertilizer_level + 1)` gold.
pub fn buy_auto_fertilizer(state: &mut GameState, now: Millis) -> Result<u32, Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    let cost = state
        .tuning
        .auto_fertilizer_cost(state.economy.fertilizer_level);
    spend_gold(state, cost, true)?;
    state.economy.fertilizer_level += 1;
    log::info!(
        "Auto fertilizer upgraded to level {} for {} gold",
        state.economy.fertilizer_level,
        cost
    );
    Ok(state.economy.fertilizer_level)
}

/// A one-off burst of XP that ignores the growth multiplier
///
/// May also drop a bonus fruit. Returns the levels gained.
pub fn buy_instant_fertilizer(state: &mut GameState, now: Millis) -> Result<u32, Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    let cost = state.tuning.instant_fertilizer_cost;
    spend_gold(state, cost, true)?;
    let xp = state.tuning.instant_fertilizer_xp;
    let fruit_chance = state.tuning.instant_fertilizer_fruit_chance;
    let gained = add_experience(state, xp, now);
    roll_fruit(state, fruit_chance);
    Ok(gained)
}

/// Check (and with `commit`, deduct) `cost` gold
fn spend_gold(state: &mut GameState, cost: u64, commit: bool) -> Result<(), Rejection> {
    let available = state.economy.gold;
    if available < cost {
        return Err(Rejection::InsufficientGold { cost, available });
    }
    if commit {
        state.economy.gold -= cost;
    }
    Ok(())
}
