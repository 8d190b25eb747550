//! Activity state structure and management

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Horizontal direction of the next cursor nudge.
///
/// Flipped after every action so repeated nudges ping-pong instead of
/// drifting the cursor across the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Return the opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Signed unit offset along the x axis (+1 right, -1 left).
    pub fn dx(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Activity state - the countdown and counters observed by the UI.
///
/// Owned and mutated exclusively by the controller task; everyone else sees
/// cloned snapshots through the watch channel.
#[derive(Debug, Clone)]
pub struct ActivityState {
    /// Whether the periodic action is currently running
    pub active: bool,
    /// Configured period between actions
    pub interval: Duration,
    /// Countdown until the next action; never exceeds `interval`
    pub remaining: Duration,
    /// Actions performed since the last activation
    pub action_count: u64,
    /// Direction of the next nudge
    pub direction: Direction,
    /// When the most recent action was synthesized
    pub last_action_at: Option<DateTime<Utc>>,
}

impl ActivityState {
    /// Create a new inactive state with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            active: false,
            interval,
            remaining: interval,
            action_count: 0,
            direction: Direction::Right,
            last_action_at: None,
        }
    }

    /// Check if the periodic action is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Get remaining whole seconds until the next action.
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining.as_secs()
    }

    /// Get the number of actions performed since activation.
    pub fn action_count(&self) -> u64 {
        self.action_count
    }
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_inactive_with_full_countdown() {
        let state = ActivityState::new(Duration::from_secs(30));
        assert!(!state.is_active());
        assert_eq!(state.remaining_seconds(), 30);
        assert_eq!(state.action_count(), 0);
        assert_eq!(state.direction, Direction::Right);
        assert!(state.last_action_at.is_none());
    }

    #[test]
    fn direction_flips_and_signs() {
        assert_eq!(Direction::Right.flipped(), Direction::Left);
        assert_eq!(Direction::Left.flipped(), Direction::Right);
        assert_eq!(Direction::Right.dx(), 1.0);
        assert_eq!(Direction::Left.dx(), -1.0);
    }
}
