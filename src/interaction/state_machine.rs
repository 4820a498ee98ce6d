//! Debounced interaction state machine
//!
//! The classifier runs independently on every frame, so its output flickers.
//! This machine turns that label stream into press/release/click events:
//!
//! ```text
//!            Grab, window elapsed
//!   Idle ───────────────────────────▶ Grabbing
//!    ▲                                   │
//!    └───────────────────────────────────┘
//!          not Grab, window elapsed
//! ```
//!
//! Clicks are evaluated only while `Idle` (after any transition in the same
//! tick) and are rate limited by an independent cooldown.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gesture::GestureLabel;

/// Timing windows for the state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionConfig {
    /// Minimum time between grab transitions (ms)
    pub grab_debounce_ms: u64,
    /// Minimum time between two click events (ms)
    pub click_cooldown_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            grab_debounce_ms: 200,
            click_cooldown_ms: 500,
        }
    }
}

impl InteractionConfig {
    pub fn grab_debounce(&self) -> Duration {
        Duration::from_millis(self.grab_debounce_ms)
    }

    pub fn click_cooldown(&self) -> Duration {
        Duration::from_millis(self.click_cooldown_ms)
    }
}

/// Action emitted by [`InteractionStateMachine::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionEvent {
    GrabStart,
    GrabEnd,
    LeftClick,
    RightClick,
    DoubleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrabState {
    #[default]
    Idle,
    Grabbing,
}

/// Owned interaction state; construct a fresh one per session
#[derive(Debug, Clone)]
pub struct InteractionStateMachine {
    state: GrabState,
    /// `None` means "never", i.e. minus infinity
    last_grab_change: Option<Duration>,
    last_click: Option<Duration>,
    grab_debounce: Duration,
    click_cooldown: Duration,
}

/// `now - last > window`, with a missing timestamp always elapsed
fn elapsed(last: Option<Duration>, now: Duration, window: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_sub(last) > window,
    }
}

impl InteractionStateMachine {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            state: GrabState::Idle,
            last_grab_change: None,
            last_click: None,
            grab_debounce: config.grab_debounce(),
            click_cooldown: config.click_cooldown(),
        }
    }

    pub fn state(&self) -> GrabState {
        self.state
    }

    pub fn is_grabbing(&self) -> bool {
        self.state == GrabState::Grabbing
    }

    /// Feed one frame's label at monotonic time `now`
    pub fn tick(&mut self, label: GestureLabel, now: Duration) -> Vec<InteractionEvent> {
        let mut events = Vec::with_capacity(2);

        let grab_window_open = elapsed(self.last_grab_change, now, self.grab_debounce);
        match (self.state, label == GestureLabel::Grab) {
            (GrabState::Idle, true) if grab_window_open => {
                self.state = GrabState::Grabbing;
                self.last_grab_change = Some(now);
                events.push(InteractionEvent::GrabStart);
            }
            (GrabState::Grabbing, false) if grab_window_open => {
                self.state = GrabState::Idle;
                self.last_grab_change = Some(now);
                events.push(InteractionEvent::GrabEnd);
            }
            _ => {}
        }

        if self.state == GrabState::Idle {
            let click = match label {
                GestureLabel::LeftClick => Some(InteractionEvent::LeftClick),
                GestureLabel::RightClick => Some(InteractionEvent::RightClick),
                GestureLabel::DoubleClick => Some(InteractionEvent::DoubleClick),
                GestureLabel::None | GestureLabel::Grab => None,
            };
            if let Some(click) = click {
                if elapsed(self.last_click, now, self.click_cooldown) {
                    self.last_click = Some(now);
                    events.push(click);
                }
            }
        }

        events
    }
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_first_grab_starts_immediately() {
        let mut fsm = InteractionStateMachine::default();
        assert_eq!(fsm.tick(GestureLabel::Grab, at(0)), vec![InteractionEvent::GrabStart]);
        assert!(fsm.is_grabbing());
    }

    #[test]
    fn test_repeated_grab_starts_once() {
        let mut fsm = InteractionStateMachine::default();
        assert_eq!(fsm.tick(GestureLabel::Grab, at(0)), vec![InteractionEvent::GrabStart]);
        assert!(fsm.tick(GestureLabel::Grab, at(100)).is_empty());
        assert!(fsm.tick(GestureLabel::Grab, at(1_000)).is_empty());
        assert_eq!(fsm.state(), GrabState::Grabbing);
    }

    #[test]
    fn test_release_waits_for_debounce() {
        let mut fsm = InteractionStateMachine::default();
        fsm.tick(GestureLabel::Grab, at(0));
        // One noisy frame inside the window does not release
        assert!(fsm.tick(GestureLabel::None, at(150)).is_empty());
        assert!(fsm.is_grabbing());
        // Exactly at the window boundary is still inside (strict comparison)
        assert!(fsm.tick(GestureLabel::None, at(200)).is_empty());
        assert_eq!(fsm.tick(GestureLabel::None, at(201)), vec![InteractionEvent::GrabEnd]);
        assert!(!fsm.is_grabbing());
    }

    #[test]
    fn test_regrab_waits_for_debounce() {
        let mut fsm = InteractionStateMachine::default();
        fsm.tick(GestureLabel::Grab, at(0));
        fsm.tick(GestureLabel::None, at(300));
        assert!(fsm.tick(GestureLabel::Grab, at(400)).is_empty());
        assert_eq!(fsm.tick(GestureLabel::Grab, at(501)), vec![InteractionEvent::GrabStart]);
    }

    #[test]
    fn test_click_cooldown() {
        let mut fsm = InteractionStateMachine::default();
        assert_eq!(fsm.tick(GestureLabel::LeftClick, at(0)), vec![InteractionEvent::LeftClick]);
        assert!(fsm.tick(GestureLabel::LeftClick, at(300)).is_empty());
        assert_eq!(fsm.tick(GestureLabel::LeftClick, at(600)), vec![InteractionEvent::LeftClick]);
    }

    #[test]
    fn test_cooldown_is_shared_between_click_kinds() {
        let mut fsm = InteractionStateMachine::default();
        assert_eq!(fsm.tick(GestureLabel::RightClick, at(0)), vec![InteractionEvent::RightClick]);
        assert!(fsm.tick(GestureLabel::DoubleClick, at(200)).is_empty());
        assert_eq!(fsm.tick(GestureLabel::DoubleClick, at(501)), vec![InteractionEvent::DoubleClick]);
    }

    #[test]
    fn test_no_clicks_while_grabbing() {
        let mut fsm = InteractionStateMachine::default();
        fsm.tick(GestureLabel::Grab, at(0));
        // Release window not elapsed, so still grabbing and the click is gated
        assert!(fsm.tick(GestureLabel::LeftClick, at(100)).is_empty());
        assert!(fsm.is_grabbing());
    }

    #[test]
    fn test_release_and_click_in_same_tick() {
        let mut fsm = InteractionStateMachine::default();
        fsm.tick(GestureLabel::Grab, at(0));
        assert_eq!(
            fsm.tick(GestureLabel::LeftClick, at(300)),
            vec![InteractionEvent::GrabEnd, InteractionEvent::LeftClick]
        );
    }

    #[test]
    fn test_none_label_is_quiet_when_idle() {
        let mut fsm = InteractionStateMachine::default();
        for ms in (0..2_000).step_by(33) {
            assert!(fsm.tick(GestureLabel::None, at(ms)).is_empty());
        }
    }

    #[test]
    fn test_custom_windows() {
        let mut fsm = InteractionStateMachine::new(&InteractionConfig {
            grab_debounce_ms: 0,
            click_cooldown_ms: 50,
        });
        fsm.tick(GestureLabel::Grab, at(0));
        assert_eq!(fsm.tick(GestureLabel::None, at(1)), vec![InteractionEvent::GrabEnd]);
        assert_eq!(fsm.tick(GestureLabel::LeftClick, at(2)), vec![InteractionEvent::LeftClick]);
        assert!(fsm.tick(GestureLabel::LeftClick, at(52)).is_empty());
        assert_eq!(fsm.tick(GestureLabel::LeftClick, at(53)), vec![InteractionEvent::LeftClick]);
    }
}
