//! Action policy: which pointer event to synthesize at countdown expiry.

use clap::ValueEnum;
use rand::Rng;

use crate::platform::PointerAction;
use crate::state::Direction;

/// How the agent defeats idle detection when the countdown expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionPolicy {
    /// Warp the cursor by 1 px, alternating left/right
    Nudge,
    /// Post a left click at the current cursor position
    Click,
    /// Displace the cursor by a small random offset on both axes
    Jitter,
}

impl ActionPolicy {
    /// Largest jitter displacement per axis, in pixels.
    const JITTER_RANGE: f64 = 3.0;

    /// Select the pointer action for one expiry.
    pub fn next_action(&self, direction: Direction) -> PointerAction {
        match self {
            ActionPolicy::Nudge => PointerAction::Move {
                dx: direction.dx(),
                dy: 0.0,
            },
            ActionPolicy::Click => PointerAction::Click,
            ActionPolicy::Jitter => {
                let mut rng = rand::thread_rng();
                let mut axis = |sign: f64| {
                    let offset: f64 = rng.gen_range(-Self::JITTER_RANGE..=Self::JITTER_RANGE);
                    // A zero offset would leave the cursor in place.
                    if offset == 0.0 {
                        sign
                    } else {
                        offset
                    }
                };
                PointerAction::Move {
                    dx: axis(direction.dx()),
                    dy: axis(1.0),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_follows_direction() {
        assert_eq!(
            ActionPolicy::Nudge.next_action(Direction::Right),
            PointerAction::Move { dx: 1.0, dy: 0.0 }
        );
        assert_eq!(
            ActionPolicy::Nudge.next_action(Direction::Left),
            PointerAction::Move { dx: -1.0, dy: 0.0 }
        );
    }

    #[test]
    fn click_ignores_direction() {
        assert_eq!(
            ActionPolicy::Click.next_action(Direction::Left),
            PointerAction::Click
        );
    }

    #[test]
    fn jitter_always_moves_within_range() {
        for _ in 0..100 {
            match ActionPolicy::Jitter.next_action(Direction::Right) {
                PointerAction::Move { dx, dy } => {
                    assert!(dx != 0.0 && dx.abs() <= ActionPolicy::JITTER_RANGE);
                    assert!(dy != 0.0 && dy.abs() <= ActionPolicy::JITTER_RANGE);
                }
                other => panic!("jitter produced {:?}", other),
            }
        }
    }
}
