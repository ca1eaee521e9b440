//! Grove - an incremental tree-growing garden
//!
//! Core modules:
//! - `sim`: Gameplay simulation (growth generation, progression, economy, placement)
//! - `controller`: Single owner of the game state with event subscriptions
//! - `tuning`: Data-driven game balance
//! - `error`: Rejection and configuration errors

pub mod controller;
pub mod error;
pub mod sim;
pub mod tuning;

pub use controller::{Garden, SubscriptionId};
pub use error::{Rejection, TuningError};
pub use tuning::{BuffExpiry, Tuning};

use glam::Vec2;

/// Milliseconds on the collaborator's clock
pub type Millis = u64;

/// Game rule constants
pub mod consts {
    use glam::Vec2;

    /// XP needed to leave a level is `level * XP_PER_LEVEL`
    pub const XP_PER_LEVEL: f64 = 100.0;
    /// Level at which the active tree is baked into the garden
    pub const MATURITY_LEVEL: u32 = 20;
    /// Highest level rendered as a potted seed
    pub const SEED_STAGE_MAX_LEVEL: u32 = 3;
    /// First level that can carry fruit
    pub const FRUIT_MIN_LEVEL: u32 = 4;

    /// Where the first tree of every session is planted
    pub const INITIAL_ORIGIN: Vec2 = Vec2::new(200.0, 350.0);
    /// Spawn rectangle (inclusive, integer samples)
    pub const SPAWN_MIN_X: i32 = 50;
    pub const SPAWN_MAX_X: i32 = 350;
    pub const SPAWN_MIN_Y: i32 = 200;
    pub const SPAWN_MAX_Y: i32 = 400;
    /// Footprint radius of a tree at scale 1.0
    pub const TREE_RADIUS: f32 = 30.0;
    /// Fraction of the combined radius that must separate two origins (20% overlap allowed)
    pub const OVERLAP_FACTOR: f32 = 0.8;
    /// Placement attempts before the garden counts as full
    pub const MAX_SPAWN_ATTEMPTS: u32 = 50;
    /// Scale range for trees after the first
    pub const MIN_TREE_SCALE: f32 = 0.7;
    pub const MAX_TREE_SCALE: f32 = 1.3;

    /// Period of the passive tick
    pub const TICK_INTERVAL_MS: u64 = 1000;
    /// Lifetime of the transient "last effect" label
    pub const EFFECT_LABEL_MS: u64 = 3000;
    /// Duration of the level-up growth animation flag
    pub const GROWTH_ANIMATION_MS: u64 = 500;
    /// Wildcard cooldowns are drawn from [min, max)
    pub const WILDCARD_COOLDOWN_MIN_MS: u64 = 1_000;
    pub const WILDCARD_COOLDOWN_MAX_MS: u64 = 600_000;

    /// Tree score: max(floor, base - per_second * elapsed) + level * per_level
    pub const TIME_BONUS_BASE: f64 = 5000.0;
    pub const TIME_BONUS_FLOOR: f64 = 1000.0;
    pub const TIME_BONUS_PER_SECOND: f64 = 10.0;
    pub const SCORE_PER_LEVEL: f64 = 50.0;
}

/// Sin-hash pseudo random in [0, 1) - same seed, same value
#[inline]
pub fn pseudo_random(seed: f64) -> f64 {
    let x = seed.sin() * 10000.0;
    x - x.floor()
}

/// Unit direction for an angle in degrees (SVG convention: +y points down)
#[inline]
pub fn direction_deg(angle_deg: f32) -> Vec2 {
    Vec2::from_angle(angle_deg.to_radians())
}

/// XP required to leave `level`
#[inline]
pub fn xp_required(level: u32) -> f64 {
    level as f64 * consts::XP_PER_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_random_range_and_stability() {
        for i in 0..500 {
            let seed = i as f64 * 13.7;
            let v = pseudo_random(seed);
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, pseudo_random(seed));
        }
    }

    #[test]
    fn test_direction_deg() {
        let up = direction_deg(-90.0);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_xp_required() {
        assert_eq!(xp_required(1), 100.0);
        assert_eq!(xp_required(19), 1900.0);
    }
}
