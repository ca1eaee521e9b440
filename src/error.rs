//! Rejections and configuration errors
//!
//! Gameplay never fails hard: a rejected action leaves the state untouched and
//! hands back a `Rejection` whose message the UI may show.

use thiserror::Error;

/// Why an action was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The garden is full; only a restart is accepted
    #[error("the garden is full - restart to play again")]
    GameOver,
    #[error("not enough gold (need {cost}, have {available})")]
    InsufficientGold { cost: u64, available: u64 },
    #[error("not enough score (need {cost}, have {available})")]
    InsufficientScore { cost: u64, available: u64 },
    #[error("still cooling down ({}s left)", .remaining_ms.div_ceil(1000))]
    Cooldown { remaining_ms: u64 },
    #[error("no fruit at slot {0}")]
    FruitNotActive(String),
    #[error("no free slot on the tree")]
    NoFreeSlot,
}

/// Errors returned while loading a `Tuning`
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its legal range
    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
