//! Game state and core simulation types
//!
//! Everything the garden remembers lives in `GameState`. It is only mutated by
//! the functions in `progression`, `economy`, `actions`, `wildcard` and `tick`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::biome::{Biome, BiomeCatalog, Color};
use super::growth::{self, GrowthParams, Primitive, Slot, TreeShape};
use super::placement::Footprint;
use super::timers::{ActiveBuff, Timer};
use super::wildcard::{WildcardEffect, WildcardId};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{Millis, xp_required};

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// A tree is growing
    Growing,
    /// No room left for another tree; only restart is accepted
    GameOver,
}

/// Named growth stage derived from the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthStage {
    /// Levels 1-3
    Seed(u32),
    /// Levels 4-8
    Sprout(u32),
    /// Levels 9-16
    Sapling(u32),
    /// Level 17+, one growth step every 5 levels
    Tree(u32),
}

impl GrowthStage {
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=3 => GrowthStage::Seed(level),
            4..=8 => GrowthStage::Sprout(level - 3),
            9..=16 => GrowthStage::Sapling(level - 8),
            _ => GrowthStage::Tree((level - 17) / 5 + 1),
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthStage::Seed(n) => write!(f, "Seed Stage {n}"),
            GrowthStage::Sprout(n) => write!(f, "Sprout Stage {n}"),
            GrowthStage::Sapling(n) => write!(f, "Sapling Stage {n}"),
            GrowthStage::Tree(n) => write!(f, "Tree (Growth {n})"),
        }
    }
}

/// The single tree currently growing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTree {
    /// Always >= 1
    pub level: u32,
    /// Below `xp_required()` once settled
    pub experience: f64,
    pub start_time: Millis,
    /// Bottom-center of the footprint
    pub origin: Vec2,
    /// Nominal 1.0
    pub scale: f32,
}

impl ActiveTree {
    pub fn new(origin: Vec2, scale: f32, now: Millis) -> Self {
        Self {
            level: 1,
            experience: 0.0,
            start_time: now,
            origin,
            scale,
        }
    }

    /// XP needed to leave the current level
    #[inline]
    pub fn xp_required(&self) -> f64 {
        xp_required(self.level)
    }

    pub fn stage(&self) -> GrowthStage {
        GrowthStage::from_level(self.level)
    }
}

/// A matured tree baked into the garden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntity {
    pub id: u32,
    pub biome_id: String,
    pub origin: Vec2,
    pub scale: f32,
    /// Frozen at completion
    pub paths: Vec<Primitive>,
    /// Always empty; interactables are not kept after baking
    pub slots: Vec<Slot>,
    pub score: u64,
}

impl Footprint for TreeEntity {
    fn origin(&self) -> Vec2 {
        self.origin
    }

    fn scale(&self) -> f32 {
        self.scale
    }
}

/// Gold, fertilizer, interactables and cooldowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    pub gold: u64,
    pub fertilizer_level: u32,
    /// Slot ids holding a fruit
    pub active_fruits: BTreeSet<String>,
    /// Slot ids holding a bird
    pub active_birds: BTreeSet<String>,
    /// Earliest next use per wildcard
    pub wildcard_cooldowns: BTreeMap<WildcardId, Millis>,
    /// Applied to every XP grant
    pub growth_multiplier: f64,
    /// Last successful till
    pub last_till: Option<Millis>,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            gold: 0,
            fertilizer_level: 0,
            active_fruits: BTreeSet::new(),
            active_birds: BTreeSet::new(),
            wildcard_cooldowns: BTreeMap::new(),
            growth_multiplier: 1.0,
            last_till: None,
        }
    }
}

impl Economy {
    pub fn is_occupied(&self, slot_id: &str) -> bool {
        self.active_fruits.contains(slot_id) || self.active_birds.contains(slot_id)
    }
}

/// Transient "last effect" banner, cleared after `EFFECT_LABEL_MS`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectLabel {
    pub text: String,
    pub color: Color,
}

/// Notifications for the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    LevelUp { level: u32 },
    FruitSpawned { slot: String },
    FruitHarvested { slot: String },
    BirdPerched { slot: String },
    CriticalHit { xp: f64 },
    BuffApplied { multiplier: f64, duration_ms: u64 },
    BuffExpired,
    WildcardResolved { item: WildcardId, effect: WildcardEffect },
    TreeCompleted { tree_id: u32, score: u64 },
    TreePlanted { origin: Vec2, scale: f32, biome: &'static str },
    GardenFull,
    Restarted,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG started from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Index into the biome catalog (wraps)
    pub biome_stage: usize,
    pub score: u64,
    pub tree: ActiveTree,
    /// Shape of the active tree at its current level
    pub shape: TreeShape,
    /// Baked trees, oldest first
    pub legacy_trees: Vec<TreeEntity>,
    pub economy: Economy,
    pub effect_label: Option<EffectLabel>,
    /// Set for a moment after each level-up
    pub is_growing: bool,
    pub(crate) active_buff: Option<ActiveBuff>,
    pub(crate) label_token: u32,
    pub(crate) growth_token: u32,
    pub(crate) timers: Vec<Timer>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh garden with default tuning
    pub fn new(seed: u64, now: Millis) -> Self {
        Self::with_tuning(seed, Tuning::default(), now)
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, now: Millis) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Growing,
            biome_stage: 0,
            score: 0,
            tree: ActiveTree::new(INITIAL_ORIGIN, 1.0, now),
            shape: TreeShape::default(),
            legacy_trees: Vec::new(),
            economy: Economy::default(),
            effect_label: None,
            is_growing: false,
            active_buff: None,
            label_token: 0,
            growth_token: 0,
            timers: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.refresh_shape();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn biome(&self) -> &'static Biome {
        BiomeCatalog::get(self.biome_stage)
    }

    /// Slots currently holding a fruit
    pub fn rendered_fruits(&self) -> impl Iterator<Item = &Slot> {
        self.shape
            .slots
            .iter()
            .filter(|s| self.economy.active_fruits.contains(&s.id))
    }

    /// Slots currently holding a bird
    pub fn rendered_birds(&self) -> impl Iterator<Item = &Slot> {
        self.shape
            .slots
            .iter()
            .filter(|s| self.economy.active_birds.contains(&s.id))
    }

    /// Slots holding neither a fruit nor a bird, in generation order
    pub fn free_slots(&self) -> Vec<String> {
        self.shape
            .slot_ids()
            .filter(|id| !self.economy.is_occupied(id))
            .map(str::to_owned)
            .collect()
    }

    /// Milliseconds until `item` can be used again (0 = ready)
    pub fn wildcard_remaining(&self, item: WildcardId, now: Millis) -> Millis {
        self.economy
            .wildcard_cooldowns
            .get(&item)
            .map_or(0, |ready_at| ready_at.saturating_sub(now))
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Regenerate the active tree's shape and re-seat fruits and birds on it
    pub(crate) fn refresh_shape(&mut self) {
        let biome = self.biome();
        let params = GrowthParams {
            level: self.tree.level,
            modifiers: biome.modifiers,
            palette: &biome.palette,
            origin: self.tree.origin,
            scale: self.tree.scale,
        };
        self.shape = growth::generate(&params, &mut self.rng);
        self.migrate_interactables();
    }

    /// Keep fruits and birds whose slot survived, move the rest to free slots
    /// in order, drop what does not fit
    fn migrate_interactables(&mut self) {
        let shape = &self.shape;
        let economy = &mut self.economy;

        let before_fruits = economy.active_fruits.len();
        let before_birds = economy.active_birds.len();
        economy.active_fruits.retain(|id| shape.has_slot(id));
        economy.active_birds.retain(|id| shape.has_slot(id));
        let lost_fruits = before_fruits - economy.active_fruits.len();
        let lost_birds = before_birds - economy.active_birds.len();
        if lost_fruits == 0 && lost_birds == 0 {
            return;
        }

        let mut free = shape
            .slot_ids()
            .filter(|id| !economy.is_occupied(id))
            .map(str::to_owned)
            .collect::<Vec<_>>()
            .into_iter();
        for id in free.by_ref().take(lost_fruits) {
            economy.active_fruits.insert(id);
        }
        for id in free.take(lost_birds) {
            economy.active_birds.insert(id);
        }
    }

    /// Replace the active tree with a fresh level-1 tree
    pub(crate) fn reset_active_tree(&mut self, origin: Vec2, scale: f32, now: Millis) {
        self.tree = ActiveTree::new(origin, scale, now);
        self.economy.active_fruits.clear();
        self.economy.active_birds.clear();
        self.refresh_shape();
    }

    /// Read-only summary for the UI
    pub fn snapshot(&self, now: Millis) -> Snapshot {
        Snapshot {
            phase: self.phase,
            level: self.tree.level,
            experience: self.tree.experience,
            xp_required: self.tree.xp_required(),
            stage: self.tree.stage().to_string(),
            origin: self.tree.origin,
            scale: self.tree.scale,
            biome: self.biome().id,
            score: self.score,
            gold: self.economy.gold,
            fertilizer_level: self.economy.fertilizer_level,
            growth_multiplier: self.economy.growth_multiplier,
            paths: self.shape.paths.len(),
            slots: self.shape.slots.len(),
            fruits: self.economy.active_fruits.iter().cloned().collect(),
            birds: self.economy.active_birds.iter().cloned().collect(),
            legacy_trees: self.legacy_trees.len(),
            wildcard_cooldowns: WildcardId::ALL
                .iter()
                .map(|&item| (item, self.wildcard_remaining(item, now)))
                .collect(),
            effect_label: self.effect_label.clone(),
        }
    }
}

/// Serializable view of the garden
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level: u32,
    pub experience: f64,
    pub xp_required: f64,
    pub stage: String,
    pub origin: Vec2,
    pub scale: f32,
    pub biome: &'static str,
    pub score: u64,
    pub gold: u64,
    pub fertilizer_level: u32,
    pub growth_multiplier: f64,
    pub paths: usize,
    pub slots: usize,
    pub fruits: Vec<String>,
    pub birds: Vec<String>,
    pub legacy_trees: usize,
    /// Remaining milliseconds for every wildcard (0 = ready)
    pub wildcard_cooldowns: BTreeMap<WildcardId, Millis>,
    pub effect_label: Option<EffectLabel>,
}
