//! Wildcards: score-priced random events
//!
//! Each item rolls once on a table of outcomes. The roll is resolved purely by
//! `resolve`; `use_wildcard` handles price, cooldown and applying the effect.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::biome::Color;
use super::progression::{add_experience, wither, xp_to_level};
use super::state::{GameEvent, GameState};
use crate::Millis;
use crate::consts::*;
use crate::error::Rejection;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardId {
    MysterySeed,
    ChaosBloom,
}

impl WildcardId {
    pub const ALL: [WildcardId; 2] = [WildcardId::MysterySeed, WildcardId::ChaosBloom];

    pub fn name(&self) -> &'static str {
        match self {
            WildcardId::MysterySeed => "Mystery Seed",
            WildcardId::ChaosBloom => "Chaos Bloom",
        }
    }

    /// Score price under `tuning`
    pub fn cost(&self, tuning: &Tuning) -> u64 {
        match self {
            WildcardId::MysterySeed => tuning.mystery_seed_cost,
            WildcardId::ChaosBloom => tuning.chaos_bloom_cost,
        }
    }

    /// Outcome table as `(upper bound of the roll, effect)`, ascending
    fn table(&self) -> &'static [(f64, WildcardEffect)] {
        match self {
            WildcardId::MysterySeed => &MYSTERY_SEED,
            WildcardId::ChaosBloom => &CHAOS_BLOOM,
        }
    }
}

impl fmt::Display for WildcardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One outcome of a wildcard roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum WildcardEffect {
    /// Temporary growth multiplier override
    GrowthBuff {
        name: &'static str,
        multiplier: f64,
        duration_ms: Millis,
    },
    /// Enough XP to finish the current level
    InstantLevel,
    /// Active tree back to level 1
    Blight,
    /// Flat score penalty, floored at 0
    Tax,
    /// Enough XP to reach maturity
    InstantMaturity,
}

const fn buff(name: &'static str, multiplier: f64, secs: u64) -> WildcardEffect {
    WildcardEffect::GrowthBuff {
        name,
        multiplier,
        duration_ms: secs * 1000,
    }
}

const HARMFUL_COLOR: Color = Color(0xEF4444);

const MYSTERY_SEED: [(f64, WildcardEffect); 5] = [
    (0.20, buff("Wilt", 0.5, 10)),
    (0.50, buff("Drizzle", 1.5, 15)),
    (0.75, buff("Bloom", 2.0, 20)),
    (0.90, buff("Wild Growth", 3.0, 30)),
    (1.00, WildcardEffect::InstantLevel),
];

const CHAOS_BLOOM: [(f64, WildcardEffect); 4] = [
    (0.15, WildcardEffect::Blight),
    (0.35, WildcardEffect::Tax),
    (0.75, buff("Overgrowth", 5.0, 30)),
    (1.00, WildcardEffect::InstantMaturity),
];

impl WildcardEffect {
    pub fn label(&self) -> String {
        match self {
            WildcardEffect::GrowthBuff {
                name, multiplier, ..
            } => format!("{name}! {multiplier}x growth"),
            WildcardEffect::InstantLevel => "Instant Level!".to_string(),
            WildcardEffect::Blight => "Blight! The tree withered".to_string(),
            WildcardEffect::Tax => "Tax! Score penalty".to_string(),
            WildcardEffect::InstantMaturity => "Instant Maturity!".to_string(),
        }
    }

    /// Label color; every harmful outcome shares one warning color
    pub fn color(&self) -> Color {
        if self.is_harmful() {
            return HARMFUL_COLOR;
        }
        match self {
            WildcardEffect::GrowthBuff { multiplier, .. } if *multiplier >= 5.0 => {
                Color(0xA855F7)
            }
            WildcardEffect::GrowthBuff { .. } => Color(0x22C55E),
            WildcardEffect::InstantLevel => Color(0x3B82F6),
            WildcardEffect::InstantMaturity => Color(0xF59E0B),
            WildcardEffect::Blight | WildcardEffect::Tax => HARMFUL_COLOR,
        }
    }

    /// `(multiplier, duration_ms)` if this effect is a timed buff
    pub fn growth_buff(&self) -> Option<(f64, Millis)> {
        match *self {
            WildcardEffect::GrowthBuff {
                multiplier,
                duration_ms,
                ..
            } => Some((multiplier, duration_ms)),
            _ => None,
        }
    }

    pub fn is_harmful(&self) -> bool {
        matches!(self, WildcardEffect::Blight | WildcardEffect::Tax)
            || self.growth_buff().is_some_and(|(m, _)| m < 1.0)
    }
}

/// Map a uniform roll in `[0, 1)` to an outcome of `id`
///
/// Rolls outside the range clamp to the first or last entry.
pub fn resolve(id: WildcardId, roll: f64) -> WildcardEffect {
    let table = id.table();
    table
        .iter()
        .find(|(upper, _)| roll < *upper)
        .or(table.last())
        .map(|(_, effect)| *effect)
        .unwrap_or(WildcardEffect::InstantLevel)
}

/// Pay for and resolve a wildcard
///
/// Rejected without any state change on game over, missing score or an
/// active cooldown.
pub fn use_wildcard(
    state: &mut GameState,
    id: WildcardId,
    now: Millis,
) -> Result<WildcardEffect, Rejection> {
    state.advance_clock(now);
    if state.is_game_over() {
        return Err(Rejection::GameOver);
    }
    let cost = id.cost(&state.tuning);
    if state.score < cost {
        return Err(Rejection::InsufficientScore {
            cost,
            available: state.score,
        });
    }
    let remaining_ms = state.wildcard_remaining(id, now);
    if remaining_ms > 0 {
        return Err(Rejection::Cooldown { remaining_ms });
    }

    state.score -= cost;
    let roll = state.rng.random::<f64>();
    let effect = resolve(id, roll);
    apply_effect(state, effect, now);

    let cooldown = state
        .rng
        .random_range(WILDCARD_COOLDOWN_MIN_MS..WILDCARD_COOLDOWN_MAX_MS);
    state.economy.wildcard_cooldowns.insert(id, now + cooldown);

    state.show_effect(effect.label(), effect.color(), now);
    log::info!(
        "{} rolled {:.3}: {} (cooldown {}s)",
        id,
        roll,
        effect.label(),
        cooldown / 1000
    );
    state.push_event(GameEvent::WildcardResolved { item: id, effect });
    Ok(effect)
}

fn apply_effect(state: &mut GameState, effect: WildcardEffect, now: Millis) {
    match effect {
        WildcardEffect::GrowthBuff {
            multiplier,
            duration_ms,
            ..
        } => state.apply_growth_buff(multiplier, duration_ms, now),
        WildcardEffect::InstantLevel => {
            let needed = state.tree.xp_required() - state.tree.experience;
            add_experience(state, needed, now);
        }
        WildcardEffect::Blight => wither(state),
        WildcardEffect::Tax => {
            state.score = state.score.saturating_sub(state.tuning.tax_penalty);
        }
        WildcardEffect::InstantMaturity => {
            let needed = xp_to_level(state, MATURITY_LEVEL);
            add_experience(state, needed, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GamePhase;

    fn rich_state(score: u64) -> GameState {
        let mut state = GameState::new(99, 0);
        state.score = score;
        state
    }

    #[test]
    fn test_mystery_seed_table() {
        let id = WildcardId::MysterySeed;
        assert_eq!(resolve(id, 0.0), buff("Wilt", 0.5, 10));
        assert_eq!(resolve(id, 0.1999), buff("Wilt", 0.5, 10));
        assert_eq!(resolve(id, 0.2), buff("Drizzle", 1.5, 15));
        assert_eq!(resolve(id, 0.6), buff("Bloom", 2.0, 20));
        assert_eq!(resolve(id, 0.8), buff("Wild Growth", 3.0, 30));
        assert_eq!(resolve(id, 0.95), WildcardEffect::InstantLevel);
        assert_eq!(resolve(id, 1.5), WildcardEffect::InstantLevel);
    }

    #[test]
    fn test_chaos_bloom_table() {
        let id = WildcardId::ChaosBloom;
        assert_eq!(resolve(id, 0.1), WildcardEffect::Blight);
        assert_eq!(resolve(id, 0.15), WildcardEffect::Tax);
        assert_eq!(resolve(id, 0.5), buff("Overgrowth", 5.0, 30));
        assert_eq!(resolve(id, 0.99), WildcardEffect::InstantMaturity);
    }

    #[test]
    fn test_harmful_effects() {
        assert!(buff("Wilt", 0.5, 10).is_harmful());
        assert!(WildcardEffect::Tax.is_harmful());
        assert!(!WildcardEffect::InstantMaturity.is_harmful());
        assert!(!buff("Bloom", 2.0, 20).is_harmful());

        assert_eq!(buff("Wilt", 0.5, 10).color(), WildcardEffect::Blight.color());
        assert_eq!(WildcardEffect::Tax.color(), HARMFUL_COLOR);
        assert_ne!(buff("Bloom", 2.0, 20).color(), HARMFUL_COLOR);
    }

    #[test]
    fn test_insufficient_score_changes_nothing() {
        let mut state = rich_state(199);
        state.economy.growth_multiplier = 1.0;
        assert_eq!(
            use_wildcard(&mut state, WildcardId::MysterySeed, 0),
            Err(Rejection::InsufficientScore {
                cost: 200,
                available: 199
            })
        );
        assert_eq!(state.score, 199);
        assert!(state.economy.wildcard_cooldowns.is_empty());
        assert_eq!(state.economy.growth_multiplier, 1.0);
        assert!(state.effect_label.is_none());
    }

    #[test]
    fn test_success_charges_and_sets_cooldown() {
        let mut state = rich_state(500);
        let effect =
            use_wildcard(&mut state, WildcardId::MysterySeed, 10_000).expect("affordable");

        let ready_at = state.economy.wildcard_cooldowns[&WildcardId::MysterySeed];
        assert!((11_000..610_000).contains(&ready_at));
        assert!(state.effect_label.is_some());
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::WildcardResolved {
                    item: WildcardId::MysterySeed,
                    effect
                })
        );
        if let Some((multiplier, _)) = effect.growth_buff() {
            assert_eq!(state.economy.growth_multiplier, multiplier);
        }
        assert_eq!(state.score, 300);
    }

    #[test]
    fn test_cooldown_blocks_second_use() {
        let mut state = rich_state(10_000);
        use_wildcard(&mut state, WildcardId::MysterySeed, 0).expect("first use");
        let score = state.score;
        let err = use_wildcard(&mut state, WildcardId::MysterySeed, 500);
        assert!(matches!(err, Err(Rejection::Cooldown { .. })));
        assert_eq!(state.score, score);

        // Tiers cool down independently
        assert!(use_wildcard(&mut state, WildcardId::ChaosBloom, 500).is_ok());

        let ready_at = state.economy.wildcard_cooldowns[&WildcardId::MysterySeed];
        assert!(use_wildcard(&mut state, WildcardId::MysterySeed, ready_at).is_ok());
    }

    #[test]
    fn test_instant_level_effect() {
        let mut state = rich_state(0);
        state.tree.experience = 40.0;
        apply_effect(&mut state, WildcardEffect::InstantLevel, 0);
        assert_eq!(state.tree.level, 2);
        assert_eq!(state.tree.experience, 0.0);
    }

    #[test]
    fn test_instant_maturity_completes_tree() {
        let mut state = rich_state(0);
        apply_effect(&mut state, WildcardEffect::InstantMaturity, 1_000);
        assert_eq!(state.legacy_trees.len(), 1);
        assert_eq!(state.tree.level, 1);
        assert_eq!(state.phase, GamePhase::Growing);
    }

    #[test]
    fn test_tax_floors_at_zero() {
        let mut state = rich_state(300);
        apply_effect(&mut state, WildcardEffect::Tax, 0);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_blight_resets_level() {
        let mut state = rich_state(0);
        add_experience(&mut state, 3000.0, 0);
        let origin = state.tree.origin;
        apply_effect(&mut state, WildcardEffect::Blight, 0);
        assert_eq!(state.tree.level, 1);
        assert_eq!(state.tree.origin, origin);
    }

    #[test]
    fn test_label_clears_after_three_seconds() {
        let mut state = rich_state(1_000);
        use_wildcard(&mut state, WildcardId::MysterySeed, 0).expect("affordable");
        state.advance_clock(2_999);
        assert!(state.effect_label.is_some());
        state.advance_clock(3_000);
        assert!(state.effect_label.is_none());
    }
}
