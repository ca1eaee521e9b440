//! Data-driven game balance
//!
//! Every balance number the simulation reads lives here. Loaded from JSON;
//! missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// What happens when a growth buff's timer runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuffExpiry {
    /// Only the most recently applied buff may reset the multiplier
    #[default]
    LatestOnly,
    /// Every expiry resets the multiplier to 1, even over a newer buff
    Unconditional,
}

impl BuffExpiry {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuffExpiry::LatestOnly => "latest_only",
            BuffExpiry::Unconditional => "unconditional",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "latest_only" | "latest" => Some(BuffExpiry::LatestOnly),
            "unconditional" | "legacy" => Some(BuffExpiry::Unconditional),
            _ => None,
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Actions ===
    /// Base XP for watering
    pub water_xp: f64,
    /// Base XP for tilling
    pub till_xp: f64,
    /// Minimum time between successful tills
    pub till_cooldown_ms: u64,
    /// Growth multiplier applied after a till
    pub till_buff_multiplier: f64,
    pub till_buff_ms: u64,
    /// Chance that an action crits
    pub crit_chance: f64,
    /// XP multiplier on a crit
    pub crit_multiplier: f64,
    /// Flat score for a crit
    pub crit_score_bonus: u64,

    // === Fruit ===
    /// Fruit spawning stops at `fruit_cap_base + level * fruit_cap_per_level`
    pub fruit_cap_base: usize,
    pub fruit_cap_per_level: usize,
    /// Level-up spawn chance: base + level * per_level
    pub level_up_spawn_base: f64,
    pub level_up_spawn_per_level: f64,
    pub harvest_gold: u64,
    pub harvest_score: u64,

    // === Shop ===
    /// Auto-fertilizer costs `base * (current level + 1)` gold
    pub auto_fertilizer_base_cost: u64,
    /// XP per tick for each fertilizer level
    pub fertilizer_xp_per_level: f64,
    pub instant_fertilizer_cost: u64,
    pub instant_fertilizer_xp: f64,
    /// Chance of a bonus fruit after an instant fertilizer
    pub instant_fertilizer_fruit_chance: f64,
    pub bird_cost: u64,

    // === Wildcards ===
    pub mystery_seed_cost: u64,
    pub chaos_bloom_cost: u64,
    /// Score lost to the Tax effect
    pub tax_penalty: u64,
    pub buff_expiry: BuffExpiry,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            water_xp: 800.0,
            till_xp: 80.0,
            till_cooldown_ms: 60_000,
            till_buff_multiplier: 2.0,
            till_buff_ms: 5_000,
            crit_chance: 0.2,
            crit_multiplier: 5.0,
            crit_score_bonus: 50,

            fruit_cap_base: 5,
            fruit_cap_per_level: 1,
            level_up_spawn_base: 0.6,
            level_up_spawn_per_level: 0.04,
            harvest_gold: 1,
            harvest_score: 10,

            auto_fertilizer_base_cost: 5,
            fertilizer_xp_per_level: 10.0,
            instant_fertilizer_cost: 3,
            instant_fertilizer_xp: 500.0,
            instant_fertilizer_fruit_chance: 0.15,
            bird_cost: 2,

            mystery_seed_cost: 200,
            chaos_bloom_cost: 1000,
            tax_penalty: 500,
            buff_expiry: BuffExpiry::LatestOnly,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Check probabilities and multipliers
    pub fn validate(&self) -> Result<(), TuningError> {
        let probabilities = [
            ("crit_chance", self.crit_chance),
            (
                "instant_fertilizer_fruit_chance",
                self.instant_fertilizer_fruit_chance,
            ),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let non_negative = [
            ("water_xp", self.water_xp),
            ("till_xp", self.till_xp),
            ("instant_fertilizer_xp", self.instant_fertilizer_xp),
            ("fertilizer_xp_per_level", self.fertilizer_xp_per_level),
            ("level_up_spawn_base", self.level_up_spawn_base),
            ("level_up_spawn_per_level", self.level_up_spawn_per_level),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        let multipliers = [
            ("till_buff_multiplier", self.till_buff_multiplier),
            ("crit_multiplier", self.crit_multiplier),
        ];
        for (field, value) in multipliers {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Maximum simultaneous fruits at `level`
    pub fn fruit_cap(&self, level: u32) -> usize {
        self.fruit_cap_base + level as usize * self.fruit_cap_per_level
    }

    /// Gold price of the next auto-fertilizer level
    pub fn auto_fertilizer_cost(&self, current_level: u32) -> u64 {
        self.auto_fertilizer_base_cost * (current_level as u64 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "till_xp": 120.0, "buff_expiry": "unconditional" }"#)
            .expect("valid tuning");
        assert_eq!(tuning.till_xp, 120.0);
        assert_eq!(tuning.buff_expiry, BuffExpiry::Unconditional);
        assert_eq!(tuning.water_xp, Tuning::default().water_xp);
    }

    #[test]
    fn test_out_of_range_probability() {
        let err = Tuning::from_json(r#"{ "crit_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "crit_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_costs_and_caps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.fruit_cap(4), 9);
        assert_eq!(tuning.auto_fertilizer_cost(0), 5);
        assert_eq!(tuning.auto_fertilizer_cost(2), 15);
    }

    #[test]
    fn test_buff_expiry_from_str() {
        assert_eq!(BuffExpiry::from_str("Legacy"), Some(BuffExpiry::Unconditional));
        assert_eq!(BuffExpiry::from_str("latest"), Some(BuffExpiry::LatestOnly));
        assert_eq!(BuffExpiry::from_str("sometimes"), None);
        assert_eq!(BuffExpiry::LatestOnly.as_str(), "latest_only");
    }
}
