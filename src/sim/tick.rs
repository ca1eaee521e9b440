//! Once-per-second passive tick
//!
//! The collaborator calls `tick` every `TICK_INTERVAL_MS`. It fires due
//! timers, drops elapsed wildcard cooldowns and pays out the fertilizer
//! trickle through the normal XP path.

use super::progression::grant_experience;
use super::state::GameState;
use crate::Millis;

/// Advance passive effects to `now`
///
/// Returns the levels gained from the fertilizer trickle.
pub fn tick(state: &mut GameState, now: Millis) -> u32 {
    state.advance_clock(now);

    state
        .economy
        .wildcard_cooldowns
        .retain(|_, ready_at| *ready_at > now);

    if state.is_game_over() || state.economy.fertilizer_level == 0 {
        return 0;
    }

    let trickle = state.economy.fertilizer_level as f64 * state.tuning.fertilizer_xp_per_level;
    grant_experience(state, trickle, now)
}
