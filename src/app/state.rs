//! Widget state management
//!
//! Defines the two-state settle machine and the one-shot timer that drives it.
//! Observer suppression depends only on the state, never on the timer
//! directly, so it can be tested without any animation.

use std::time::{Duration, Instant};

use tracing::debug;

/// Lifecycle state of a mounted widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    /// Just mounted; indicator hidden and observer notifications suppressed
    #[default]
    Animating,
    /// Entry animation finished; observer notifications enabled
    Settled,
}

impl WidgetState {
    pub fn notifications_enabled(&self) -> bool {
        matches!(self, WidgetState::Settled)
    }

    pub fn indicator_visible(&self) -> bool {
        matches!(self, WidgetState::Settled)
    }
}

/// Possible state transition events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// The settle timer fired
    SettleElapsed,
}

/// State machine for widget state transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes a state event and returns the new state
    ///
    /// `Animating -> Settled` is the only transition; nothing leads back.
    pub fn process_event(current_state: WidgetState, event: StateEvent) -> WidgetState {
        match (current_state, event) {
            (WidgetState::Animating, StateEvent::SettleElapsed) => {
                debug!("widget state: Animating -> Settled");
                WidgetState::Settled
            }

            // Settled is terminal
            (state, _) => state,
        }
    }
}

/// One-shot deadline that fires at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleTimer {
    deadline: Instant,
    armed: bool,
}

impl SettleTimer {
    /// Arms a timer that fires `delay` after `started`
    ///
    /// # Arguments
    /// * `started` - Instant the widget was mounted
    /// * `delay` - Time until the widget settles
    pub fn arm(started: Instant, delay: Duration) -> Self {
        Self {
            deadline: started + delay,
            armed: true,
        }
    }

    /// Returns true exactly once, on the first poll at or after the deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.armed && now >= self.deadline {
            self.armed = false;
            return true;
        }
        false
    }

    /// Disarms the timer so it never fires
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once passed or disarmed
    pub fn remaining(&self, now: Instant) -> Duration {
        if !self.armed {
            return Duration::ZERO;
        }
        self.deadline.saturating_duration_since(now)
    }
}
