//! Procedural growth generator
//!
//! Turns a level (plus biome modifiers, origin and scale) into drawable
//! primitives and fruit/bird slots. Levels up to `SEED_STAGE_MAX_LEVEL` are a
//! fixed potted seed. Above that a recursive branch generator grows the tree:
//!
//! - depth: `min(8, 2 + level / 3)`
//! - trunk length: `(40 + 5 * level) * growth_speed * scale`
//! - trunk width: `min(20, 1.5 * level) * scale`
//! - each fork: 2-3 children over a 50-70° arc, length × 0.75, width × 0.7
//!
//! Branch count, spread, jitter, leaves and slots draw from the caller's RNG,
//! so two calls with the same inputs give trees of the same structure but not
//! the same geometry. The sway side of each branch comes from a positional
//! sin-hash seeded by `level * origin.x`.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::biome::{BiomeModifiers, Color, Palette};
use crate::consts::SEED_STAGE_MAX_LEVEL;
use crate::{direction_deg, pseudo_random};

/// Deepest recursion the generator will use
pub const MAX_DEPTH: u32 = 8;

const LENGTH_DECAY: f32 = 0.75;
const WIDTH_DECAY: f32 = 0.7;
/// Control point offset as a fraction of branch length
const SWAY: f32 = 0.2;
const MIN_SPREAD_DEG: f32 = 50.0;
const MAX_SPREAD_DEG: f32 = 70.0;
const JITTER_DEG: f32 = 5.0;
/// Branches shorter or thinner than this (times scale) end in a tip
const MIN_LENGTH: f32 = 5.0;
const MIN_WIDTH: f32 = 0.5;
/// Wider branches are drawn in the trunk color
const TRUNK_WIDTH: f32 = 2.0;

const LEAF_LENGTH: f32 = 12.0;
const LEAF_WIDTH: f32 = 6.0;
const THIRD_LEAF_CHANCE: f64 = 0.7;
const TIP_SLOT_CHANCE: f64 = 0.6;
const FLOWER_MIN_LEVEL: u32 = 8;
const FLOWER_CHANCE: f64 = 0.3;
const FLOWER_PETAL: Color = Color(0xEC4899);
const FLOWER_HEART: Color = Color(0xFEF9C3);

/// Roots drawn under every grown tree
const BASE_PRIMITIVES: usize = 3;
/// Three leaves and a two-circle flower
const MAX_TIP_PRIMITIVES: usize = 5;

/// Semantic tag on base decoration paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Pot,
    Root,
}

/// A drawable primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    /// SVG-style path data
    Path {
        d: String,
        stroke: Option<Color>,
        stroke_width: f32,
        fill: Option<Color>,
        kind: Option<PathKind>,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        fill: Color,
    },
}

impl Primitive {
    pub fn kind(&self) -> Option<PathKind> {
        match self {
            Primitive::Path { kind, .. } => *kind,
            _ => None,
        }
    }
}

/// Attachment point for a fruit or bird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Derived from the branch path, e.g. `tip-r021`
    pub id: String,
    pub position: Vec2,
}

/// Generator output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeShape {
    pub paths: Vec<Primitive>,
    pub slots: Vec<Slot>,
}

impl TreeShape {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.slots.is_empty()
    }

    pub fn has_slot(&self, id: &str) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.id.as_str())
    }
}

/// Inputs to `generate`
#[derive(Debug, Clone, Copy)]
pub struct GrowthParams<'a> {
    pub level: u32,
    pub modifiers: BiomeModifiers,
    pub palette: &'a Palette,
    /// Bottom-center of the footprint
    pub origin: Vec2,
    pub scale: f32,
}

/// Recursion depth for a level
#[inline]
pub fn root_depth(level: u32) -> u32 {
    (2 + level / 3).min(MAX_DEPTH)
}

/// Upper bound on primitives emitted at `depth`
pub fn primitive_budget(depth: u32) -> usize {
    let tips = 3usize.pow(depth);
    let branches = (3usize.pow(depth + 1) - 1) / 2;
    BASE_PRIMITIVES + branches + tips * MAX_TIP_PRIMITIVES
}

/// Chance that a fork splits three ways
pub fn three_way_chance(branch_complexity: f32) -> f64 {
    ((branch_complexity as f64 - 0.5) * 0.5).clamp(0.0, 1.0)
}

/// Generate a tree shape
///
/// Non-positive scale, level 0 and non-finite inputs give an empty shape.
pub fn generate<R: Rng + ?Sized>(params: &GrowthParams<'_>, rng: &mut R) -> TreeShape {
    let GrowthParams {
        level,
        modifiers,
        palette,
        origin,
        scale,
    } = *params;

    let usable = level > 0
        && scale.is_finite()
        && scale > 0.0
        && origin.is_finite()
        && modifiers.growth_speed.is_finite()
        && modifiers.growth_speed > 0.0;
    if !usable {
        return TreeShape::default();
    }

    if level <= SEED_STAGE_MAX_LEVEL {
        return seed_stage(palette, origin, scale);
    }

    let mut builder = BranchBuilder {
        shape: TreeShape::default(),
        rng,
        palette,
        level,
        scale,
        seed: level as f64 * origin.x as f64,
        three_way_chance: three_way_chance(modifiers.branch_complexity),
    };
    builder.roots(origin);

    let trunk = Branch {
        start: origin,
        angle: -90.0,
        length: (40.0 + level as f32 * 5.0) * modifiers.growth_speed * scale,
        width: (level as f32 * 1.5).min(20.0) * scale,
        depth: root_depth(level),
    };
    let mut path = String::from("r");
    builder.branch(trunk, &mut path);

    builder.shape
}

/// Lens-shaped leaf: two quadratic curves mirrored about the leaf axis
///
/// Pure: identical arguments give an identical string.
pub fn leaf_path(at: Vec2, angle_deg: f32, scale: f32) -> String {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let len = LEAF_LENGTH * scale;
    let width = LEAF_WIDTH * scale;
    let transform =
        |dx: f32, dy: f32| Pt(Vec2::new(at.x + dx * cos - dy * sin, at.y + dx * sin + dy * cos));

    let p0 = transform(0.0, 0.0);
    let p1 = transform(len * 0.5, -width);
    let p2 = transform(len, 0.0);
    let p3 = transform(len * 0.5, width);
    format!("M{p0} Q{p1} {p2} Q{p3} {p0}")
}

/// Control point bending a branch sideways by `SWAY * length`
///
/// `side` is +1 or -1.
pub fn sway_control(start: Vec2, end: Vec2, side: f32) -> Vec2 {
    let chord = end - start;
    let normal = chord.normalize_or_zero().perp();
    (start + end) * 0.5 + normal * side * chord.length() * SWAY
}

/// Path-data point, two decimals
struct Pt(Vec2);

impl fmt::Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2}", self.0.x, self.0.y)
    }
}

/// Potted seed for the first levels; no randomness, no slots
fn seed_stage(palette: &Palette, origin: Vec2, scale: f32) -> TreeShape {
    let p = |x: f32, y: f32| Pt(origin + Vec2::new(x, y) * scale);

    let paths = vec![
        Primitive::Path {
            d: format!(
                "M{} L{} L{} L{} Z",
                p(-20.0, -40.0),
                p(20.0, -40.0),
                p(10.0, 0.0),
                p(-10.0, 0.0)
            ),
            stroke: Some(palette.trunk),
            stroke_width: 2.0 * scale,
            fill: Some(palette.container),
            kind: Some(PathKind::Pot),
        },
        // Rim
        Primitive::Path {
            d: format!("M{} L{}", p(-25.0, -40.0), p(25.0, -40.0)),
            stroke: Some(palette.trunk),
            stroke_width: 4.0 * scale,
            fill: None,
            kind: Some(PathKind::Pot),
        },
        Primitive::Ellipse {
            center: origin + Vec2::new(0.0, -25.0) * scale,
            radii: Vec2::new(6.0, 8.0) * scale,
            fill: palette.trunk,
        },
    ];

    TreeShape {
        paths,
        slots: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    start: Vec2,
    /// Degrees, -90 is straight up
    angle: f32,
    length: f32,
    width: f32,
    depth: u32,
}

/// Accumulates primitives and slots through the recursion
struct BranchBuilder<'a, R: Rng + ?Sized> {
    shape: TreeShape,
    rng: &'a mut R,
    palette: &'a Palette,
    level: u32,
    scale: f32,
    seed: f64,
    three_way_chance: f64,
}

impl<R: Rng + ?Sized> BranchBuilder<'_, R> {
    fn roots(&mut self, origin: Vec2) {
        // (control, end, width) relative to origin at scale 1
        const ROOTS: [((f32, f32), (f32, f32), f32); BASE_PRIMITIVES] = [
            ((-10.0, 20.0), (-20.0, 30.0), 8.0),
            ((10.0, 20.0), (20.0, 35.0), 7.0),
            ((0.0, 25.0), (-5.0, 45.0), 6.0),
        ];
        for ((cx, cy), (ex, ey), width) in ROOTS {
            let control = origin + Vec2::new(cx, cy) * self.scale;
            let end = origin + Vec2::new(ex, ey) * self.scale;
            self.shape.paths.push(Primitive::Path {
                d: format!("M{} Q{} {}", Pt(origin), Pt(control), Pt(end)),
                stroke: Some(self.palette.trunk),
                stroke_width: width * self.scale,
                fill: None,
                kind: Some(PathKind::Root),
            });
        }
    }

    fn branch(&mut self, b: Branch, path: &mut String) {
        let end = b.start + direction_deg(b.angle) * b.length;
        let side = if pseudo_random(self.seed + (b.start.x * b.start.y) as f64) > 0.5 {
            1.0
        } else {
            -1.0
        };
        let control = sway_control(b.start, end, side);
        let stroke = if b.width > TRUNK_WIDTH * self.scale {
            self.palette.trunk
        } else {
            self.palette.stem
        };

        self.shape.paths.push(Primitive::Path {
            d: format!("M{} Q{} {}", Pt(b.start), Pt(control), Pt(end)),
            stroke: Some(stroke),
            stroke_width: b.width,
            fill: None,
            kind: None,
        });

        let degenerate = b.length < MIN_LENGTH * self.scale || b.width < MIN_WIDTH * self.scale;
        if b.depth == 0 || degenerate {
            self.tip(end, b.angle, path);
            return;
        }

        let children: u8 = if self.rng.random::<f64>() < self.three_way_chance {
            3
        } else {
            2
        };
        let spread = self.rng.random_range(MIN_SPREAD_DEG..=MAX_SPREAD_DEG);
        let step = spread / (children - 1) as f32;

        for i in 0..children {
            let jitter = self.rng.random_range(-JITTER_DEG..=JITTER_DEG);
            let child = Branch {
                start: end,
                angle: b.angle - spread / 2.0 + step * i as f32 + jitter,
                length: b.length * LENGTH_DECAY,
                width: b.width * WIDTH_DECAY,
                depth: b.depth - 1,
            };
            path.push(char::from(b'0' + i));
            self.branch(child, path);
            path.pop();
        }
    }

    fn tip(&mut self, at: Vec2, angle: f32, path: &str) {
        let s = self.scale;
        self.leaf(at, angle, s, self.palette.leaf_primary);
        self.leaf(at, angle - 45.0, s * 0.8, self.palette.leaf_secondary);
        if self.rng.random::<f64>() < THIRD_LEAF_CHANCE {
            self.leaf(at, angle + 45.0, s * 0.8, self.palette.leaf_secondary);
        }

        if self.level >= FLOWER_MIN_LEVEL && self.rng.random::<f64>() < FLOWER_CHANCE {
            self.shape.paths.push(Primitive::Circle {
                center: at,
                radius: 4.0 * s,
                fill: FLOWER_PETAL,
            });
            self.shape.paths.push(Primitive::Circle {
                center: at,
                radius: 2.0 * s,
                fill: FLOWER_HEART,
            });
        }

        if self.rng.random::<f64>() < TIP_SLOT_CHANCE {
            self.shape.slots.push(Slot {
                id: format!("tip-{path}"),
                position: at + Vec2::new(0.0, 5.0 * s),
            });
        }
    }

    fn leaf(&mut self, at: Vec2, angle: f32, scale: f32, fill: Color) {
        self.shape.paths.push(Primitive::Path {
            d: leaf_path(at, angle, scale),
            stroke: None,
            stroke_width: 0.0,
            fill: Some(fill),
            kind: None,
        });
    }
}
