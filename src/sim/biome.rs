//! Biome catalog
//!
//! A fixed, ordered table of palettes and growth modifiers. The garden walks
//! through it one stage per completed tree, wrapping around at the end.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
    }
}

/// Six semantic color roles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Palette {
    pub background: Color,
    /// Pot / container
    pub container: Color,
    pub stem: Color,
    pub leaf_primary: Color,
    pub leaf_secondary: Color,
    pub trunk: Color,
}

/// Numeric modifiers fed to the growth generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomeModifiers {
    /// Multiplies generated branch length
    pub growth_speed: f32,
    /// Biases branching toward three children
    pub branch_complexity: f32,
    /// Reserved for special-case rendering
    pub is_cosmic: bool,
}

impl Default for BiomeModifiers {
    fn default() -> Self {
        Self {
            growth_speed: 1.0,
            branch_complexity: 1.0,
            is_cosmic: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Biome {
    pub id: &'static str,
    pub name: &'static str,
    pub palette: Palette,
    pub modifiers: BiomeModifiers,
}

const fn biome(
    id: &'static str,
    name: &'static str,
    colors: [u32; 6],
    growth_speed: f32,
    branch_complexity: f32,
    is_cosmic: bool,
) -> Biome {
    Biome {
        id,
        name,
        palette: Palette {
            background: Color(colors[0]),
            container: Color(colors[1]),
            stem: Color(colors[2]),
            leaf_primary: Color(colors[3]),
            leaf_secondary: Color(colors[4]),
            trunk: Color(colors[5]),
        },
        modifiers: BiomeModifiers {
            growth_speed,
            branch_complexity,
            is_cosmic,
        },
    }
}

// background, container, stem, leaf primary, leaf secondary, trunk
static BIOMES: [Biome; 7] = [
    biome(
        "plains",
        "Green Plains",
        [0xDCFCE7, 0xA0522D, 0x4ADE80, 0x4ADE80, 0x22C55E, 0x8B4513],
        1.0,
        1.0,
        false,
    ),
    biome(
        "desert",
        "Arid Desert",
        [0xFEF3C7, 0x9A3412, 0x84CC16, 0x84CC16, 0x65A30D, 0xA16207],
        0.8,
        0.8,
        false,
    ),
    biome(
        "mud",
        "Swampy Mudlands",
        [0xD6D3D1, 0x44403C, 0x57534E, 0x3F6212, 0x365314, 0x292524],
        0.9,
        1.2,
        false,
    ),
    biome(
        "forest",
        "Deep Forest",
        [0xBBF7D0, 0x3F2C22, 0x166534, 0x15803D, 0x14532D, 0x3E2723],
        1.1,
        1.3,
        false,
    ),
    biome(
        "underwater",
        "Abyssal Depths",
        [0x0C4A6E, 0x1E3A8A, 0x06B6D4, 0x22D3EE, 0x0891B2, 0x0E7490],
        0.7,
        1.5,
        false,
    ),
    biome(
        "lava",
        "Volcanic Crags",
        [0x1C1917, 0x450A0A, 0xEF4444, 0xF87171, 0xB91C1C, 0x7F1D1D],
        1.5,
        0.9,
        false,
    ),
    biome(
        "space",
        "Cosmic Void",
        [0x0F0A1E, 0xC084FC, 0xE879F9, 0xC084FC, 0xA855F7, 0x6B21A8],
        2.0,
        1.5,
        true,
    ),
];

/// Read-only view over the biome table
pub struct BiomeCatalog;

impl BiomeCatalog {
    /// Biome for a stage counter, cycling through the table
    pub fn get(stage_index: usize) -> &'static Biome {
        &BIOMES[stage_index % BIOMES.len()]
    }

    pub fn by_id(id: &str) -> Option<&'static Biome> {
        BIOMES.iter().find(|b| b.id == id)
    }

    pub fn len() -> usize {
        BIOMES.len()
    }

    pub fn iter() -> impl Iterator<Item = &'static Biome> {
        BIOMES.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_cycles() {
        let n = BiomeCatalog::len();
        assert_eq!(n, 7);
        assert_eq!(BiomeCatalog::get(0).id, "plains");
        assert_eq!(BiomeCatalog::get(n).id, "plains");
        assert_eq!(BiomeCatalog::get(n + 2).id, BiomeCatalog::get(2).id);
    }

    #[test]
    fn test_only_space_is_cosmic() {
        let cosmic: Vec<_> = BiomeCatalog::iter()
            .filter(|b| b.modifiers.is_cosmic)
            .map(|b| b.id)
            .collect();
        assert_eq!(cosmic, vec!["space"]);
    }

    #[test]
    fn test_ids_unique_and_lookup() {
        for b in BiomeCatalog::iter() {
            assert_eq!(BiomeCatalog::by_id(b.id).map(|x| x.name), Some(b.name));
        }
        assert!(BiomeCatalog::by_id("tundra").is_none());
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color(0x4ADE80).to_string(), "#4ADE80");
        assert_eq!(Color(0x0891B2).to_string(), "#0891B2");
    }
}
