//! One-shot delayed effects
//!
//! The core owns no clock. Timers sit in the state and fire the first time
//! the collaborator hands in a `now` at or past their deadline, either through
//! `tick` or through any action.

use serde::{Deserialize, Serialize};

use super::biome::Color;
use super::state::{EffectLabel, GameEvent, GameState};
use crate::Millis;
use crate::consts::{EFFECT_LABEL_MS, GROWTH_ANIMATION_MS};
use crate::tuning::BuffExpiry;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    GrowthBuffExpired { token: u32 },
    EffectLabelExpired { token: u32 },
    GrowthAnimationEnded { token: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub fire_at: Millis,
    pub kind: TimerKind,
}

/// The growth multiplier override currently in force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub token: u32,
    pub multiplier: f64,
    pub expires_at: Millis,
}

impl GameState {
    pub(crate) fn schedule(&mut self, fire_at: Millis, kind: TimerKind) {
        self.timers.push(Timer { fire_at, kind });
    }

    /// Fire every timer due at `now`, earliest first
    pub fn advance_clock(&mut self, now: Millis) {
        if self.timers.iter().all(|t| t.fire_at > now) {
            return;
        }
        self.timers.sort_by_key(|t| t.fire_at);
        let due = self.timers.partition_point(|t| t.fire_at <= now);
        let fired: Vec<Timer> = self.timers.drain(..due).collect();
        for timer in fired {
            self.fire(timer.kind);
        }
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::GrowthBuffExpired { token } => {
                let current = self.active_buff.map(|b| b.token);
                let resets = match self.tuning.buff_expiry {
                    BuffExpiry::LatestOnly => current == Some(token),
                    BuffExpiry::Unconditional => true,
                };
                if resets {
                    self.economy.growth_multiplier = 1.0;
                    self.active_buff = None;
                    self.push_event(GameEvent::BuffExpired);
                }
            }
            TimerKind::EffectLabelExpired { token } => {
                if self.label_token == token {
                    self.effect_label = None;
                }
            }
            TimerKind::GrowthAnimationEnded { token } => {
                if self.growth_token == token {
                    self.is_growing = false;
                }
            }
        }
    }

    /// Override the growth multiplier for `duration_ms`; the newest buff wins
    pub fn apply_growth_buff(&mut self, multiplier: f64, duration_ms: Millis, now: Millis) {
        let token = self.next_entity_id();
        let expires_at = now + duration_ms;
        self.economy.growth_multiplier = multiplier;
        self.active_buff = Some(ActiveBuff {
            token,
            multiplier,
            expires_at,
        });
        self.schedule(expires_at, TimerKind::GrowthBuffExpired { token });
        self.push_event(GameEvent::BuffApplied {
            multiplier,
            duration_ms,
        });
    }

    /// Show a transient label for `EFFECT_LABEL_MS`
    pub fn show_effect(&mut self, text: impl Into<String>, color: Color, now: Millis) {
        self.label_token = self.next_entity_id();
        self.effect_label = Some(EffectLabel {
            text: text.into(),
            color,
        });
        self.schedule(
            now + EFFECT_LABEL_MS,
            TimerKind::EffectLabelExpired {
                token: self.label_token,
            },
        );
    }

    pub(crate) fn start_growth_animation(&mut self, now: Millis) {
        self.growth_token = self.next_entity_id();
        self.is_growing = true;
        self.schedule(
            now + GROWTH_ANIMATION_MS,
            TimerKind::GrowthAnimationEnded {
                token: self.growth_token,
            },
        );
    }

    /// The buff in force, if any
    pub fn active_buff(&self) -> Option<ActiveBuff> {
        self.active_buff
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn state_with(policy: BuffExpiry) -> GameState {
        let tuning = Tuning {
            buff_expiry: policy,
            ..Tuning::default()
        };
        GameState::with_tuning(1, tuning, 0)
    }

    #[test]
    fn test_buff_expires() {
        let mut state = state_with(BuffExpiry::LatestOnly);
        state.apply_growth_buff(2.0, 5_000, 0);
        state.advance_clock(4_999);
        assert_eq!(state.economy.growth_multiplier, 2.0);
        state.advance_clock(5_000);
        assert_eq!(state.economy.growth_multiplier, 1.0);
        assert!(state.active_buff().is_none());
        assert_eq!(state.pending_timers(), 0);
    }

    #[test]
    fn test_latest_buff_survives_earlier_expiry() {
        let mut state = state_with(BuffExpiry::LatestOnly);
        state.apply_growth_buff(2.0, 5_000, 0);
        state.apply_growth_buff(3.0, 30_000, 1_000);
        state.advance_clock(6_000);
        assert_eq!(state.economy.growth_multiplier, 3.0);
        state.advance_clock(31_000);
        assert_eq!(state.economy.growth_multiplier, 1.0);
    }

    #[test]
    fn test_unconditional_expiry_clobbers_newer_buff() {
        let mut state = state_with(BuffExpiry::Unconditional);
        state.apply_growth_buff(2.0, 5_000, 0);
        state.apply_growth_buff(3.0, 30_000, 1_000);
        state.advance_clock(6_000);
        assert_eq!(state.economy.growth_multiplier, 1.0);
    }

    #[test]
    fn test_effect_label_clears_after_three_seconds() {
        let mut state = state_with(BuffExpiry::LatestOnly);
        state.show_effect("Bloom!", Color(0xEC4899), 10_000);
        state.advance_clock(12_999);
        assert!(state.effect_label.is_some());
        state.advance_clock(13_000);
        assert!(state.effect_label.is_none());
    }

    #[test]
    fn test_newer_label_not_cleared_by_older_timer() {
        let mut state = state_with(BuffExpiry::LatestOnly);
        state.show_effect("first", Color(0xFFFFFF), 0);
        state.show_effect("second", Color(0x000000), 2_000);
        state.advance_clock(3_500);
        assert_eq!(
            state.effect_label.as_ref().map(|l| l.text.as_str()),
            Some("second")
        );
        state.advance_clock(5_000);
        assert!(state.effect_label.is_none());
    }

    #[test]
    fn test_growth_animation_flag() {
        let mut state = state_with(BuffExpiry::LatestOnly);
        state.start_growth_animation(100);
        assert!(state.is_growing);
        state.advance_clock(600);
        assert!(!state.is_growing);
    }
}
