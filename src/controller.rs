//! Single owner of a garden session
//!
//! `Garden` wraps `GameState`, routes every write through `dispatch` or
//! `tick`, and hands the events each call raised to subscribed listeners.
//! Readers borrow the state directly.

use crate::Millis;
use crate::error::Rejection;
use crate::sim::{Action, GameEvent, GameState, Outcome, Snapshot, apply_action, tick};
use crate::tuning::Tuning;

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

pub struct Garden {
    state: GameState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u32,
}

impl Garden {
    pub fn new(seed: u64, now: Millis) -> Self {
        Self::with_tuning(seed, Tuning::default(), now)
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, now: Millis) -> Self {
        log::info!(
            "New garden (seed {}, buff expiry {})",
            seed,
            tuning.buff_expiry.as_str()
        );
        Self {
            state: GameState::with_tuning(seed, tuning, now),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self, now: Millis) -> Snapshot {
        self.state.snapshot(now)
    }

    /// Register a listener for every event raised from now on
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Apply a player action and notify listeners
    pub fn dispatch(&mut self, action: Action, now: Millis) -> Result<Outcome, Rejection> {
        let result = apply_action(&mut self.state, &action, now);
        if let Err(rejection) = &result {
            log::debug!("{:?} rejected: {}", action, rejection);
        }
        self.flush();
        result
    }

    /// Run the passive tick and notify listeners
    pub fn tick(&mut self, now: Millis) -> u32 {
        let levels = tick(&mut self.state, now);
        self.flush();
        levels
    }

    fn flush(&mut self) {
        let events = self.state.drain_events();
        for event in &events {
            for (_, listener) in &mut self.listeners {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::WildcardId;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet_garden() -> Garden {
        let tuning = Tuning {
            crit_chance: 0.0,
            ..Tuning::default()
        };
        Garden::with_tuning(8, tuning, 0)
    }

    #[test]
    fn test_listeners_see_level_ups() {
        let mut garden = quiet_garden();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        garden.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        garden.dispatch(Action::WaterPlant, 0).expect("watered");
        let seen = seen.borrow();
        assert!(seen.contains(&GameEvent::LevelUp { level: 2 }));
        assert!(seen.contains(&GameEvent::LevelUp { level: 4 }));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut garden = quiet_garden();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = garden.subscribe(move |_| *sink.borrow_mut() += 1);

        garden.dispatch(Action::WaterPlant, 0).expect("watered");
        let after_first = *count.borrow();
        assert!(after_first > 0);

        assert!(garden.unsubscribe(id));
        assert!(!garden.unsubscribe(id));
        garden.dispatch(Action::WaterPlant, 10).expect("watered");
        assert_eq!(*count.borrow(), after_first);
    }

    #[test]
    fn test_rejection_leaves_state() {
        let mut garden = quiet_garden();
        let result = garden.dispatch(Action::UseWildcard(WildcardId::ChaosBloom), 0);
        assert!(matches!(result, Err(Rejection::InsufficientScore { .. })));
        assert_eq!(garden.state().score, 0);
        assert!(garden.state().effect_label.is_none());
    }

    #[test]
    fn test_tick_delivers_buff_expiry() {
        let mut garden = quiet_garden();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        garden.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        garden.dispatch(Action::TillSoil, 0).expect("tilled");
        garden.tick(5_000);
        assert!(seen.borrow().contains(&GameEvent::BuffExpired));
        assert_eq!(garden.snapshot(5_000).growth_multiplier, 1.0);
    }
}
