//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time is always passed in, never read
//! - Seeded RNG only
//! - Stable iteration order (ordered sets and maps)
//! - No rendering or platform dependencies

pub mod actions;
pub mod biome;
pub mod economy;
pub mod growth;
pub mod placement;
pub mod progression;
pub mod state;
pub mod tick;
pub mod timers;
pub mod wildcard;

pub use actions::{Action, Outcome, apply_action, step, till_soil, water_plant};
pub use biome::{Biome, BiomeCatalog, BiomeModifiers, Color, Palette};
pub use economy::{buy_auto_fertilizer, buy_bird, buy_instant_fertilizer, harvest_fruit};
pub use growth::{GrowthParams, PathKind, Primitive, Slot, TreeShape, generate};
pub use placement::{Footprint, PlacementSolver, SpawnBounds};
pub use progression::{complete_tree, gain_experience, restart, tree_score};
pub use state::{
    ActiveTree, Economy, EffectLabel, GameEvent, GamePhase, GameState, GrowthStage, Snapshot,
    TreeEntity,
};
pub use tick::tick;
pub use timers::ActiveBuff;
pub use wildcard::{WildcardEffect, WildcardId, use_wildcard};
