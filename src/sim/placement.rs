//! Spawn placement for new trees
//!
//! Each tree occupies a circular footprint around its origin. A new origin is
//! accepted when it keeps at least `OVERLAP_FACTOR` of the combined radius
//! away from every existing tree, so neighbours may overlap by up to 20%.
//! Running out of attempts means the garden is full.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Anything that occupies ground in the garden
pub trait Footprint {
    /// Bottom-center origin
    fn origin(&self) -> Vec2;
    /// Size relative to a scale-1.0 tree
    fn scale(&self) -> f32;
}

impl Footprint for (Vec2, f32) {
    fn origin(&self) -> Vec2 {
        self.0
    }

    fn scale(&self) -> f32 {
        self.1
    }
}

/// Inclusive integer sampling rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self {
            min_x: SPAWN_MIN_X,
            max_x: SPAWN_MAX_X,
            min_y: SPAWN_MIN_Y,
            max_y: SPAWN_MAX_Y,
        }
    }
}

impl SpawnBounds {
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x as f32
            && p.x <= self.max_x as f32
            && p.y >= self.min_y as f32
            && p.y <= self.max_y as f32
    }
}

/// Finds non-overlapping origins for new trees
#[derive(Debug, Clone)]
pub struct PlacementSolver {
    pub bounds: SpawnBounds,
    /// Footprint radius at scale 1.0
    pub base_radius: f32,
    /// Required fraction of the combined radius
    pub overlap_factor: f32,
    /// Returned when the garden is empty
    pub first_origin: Vec2,
}

impl Default for PlacementSolver {
    fn default() -> Self {
        Self {
            bounds: SpawnBounds::default(),
            base_radius: TREE_RADIUS,
            overlap_factor: OVERLAP_FACTOR,
            first_origin: INITIAL_ORIGIN,
        }
    }
}

impl PlacementSolver {
    /// Minimum distance a new origin must keep from `tree`
    #[inline]
    pub fn clearance<F: Footprint>(&self, tree: &F) -> f32 {
        (self.base_radius + self.base_radius * tree.scale()) * self.overlap_factor
    }

    /// Whether `candidate` keeps clear of every existing footprint
    pub fn is_valid_position<F: Footprint>(&self, candidate: Vec2, existing: &[F]) -> bool {
        existing
            .iter()
            .all(|tree| candidate.distance(tree.origin()) >= self.clearance(tree))
    }

    /// Sample up to `max_attempts` points; `None` means the garden is full
    ///
    /// An empty garden always gets `first_origin`.
    pub fn find_spawn_position<F: Footprint, R: Rng + ?Sized>(
        &self,
        existing: &[F],
        max_attempts: u32,
        rng: &mut R,
    ) -> Option<Vec2> {
        if existing.is_empty() {
            return Some(self.first_origin);
        }

        for _ in 0..max_attempts {
            let x = rng.random_range(self.bounds.min_x..=self.bounds.max_x);
            let y = rng.random_range(self.bounds.min_y..=self.bounds.max_y);
            let candidate = Vec2::new(x as f32, y as f32);

            if self.is_valid_position(candidate, existing) {
                return Some(candidate);
            }
        }

        None
    }
}
