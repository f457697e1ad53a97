//! Fling-direction arbitration and directional key-code resolution. The
//! gesture engine decides *that* a fling happened; this decides *which way*
//! and what synthetic key it maps to.

use crate::layout::{FlingDirection, KeyboardLayout};
use crate::types::{FlingAction, FlingEvent};

pub const DEFAULT_TRAVEL_PX: i32 = 10;

/// Resolved secondary action for a directional fling off a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyAction {
    pub key_index: usize,
    pub direction: FlingDirection,
    pub code: i32,
}

/// Classifies a populated fling event by velocity-axis dominance plus a
/// minimum displacement along the winning axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlingResolver {
    pub travel_x: i32,
    pub travel_y: i32,
}

impl Default for FlingResolver {
    fn default() -> Self {
        Self {
            travel_x: DEFAULT_TRAVEL_PX,
            travel_y: DEFAULT_TRAVEL_PX,
        }
    }
}

impl FlingResolver {
    pub fn resolve(&self, event: &FlingEvent) -> Option<FlingDirection> {
        if event.action != FlingAction::Fling {
            return None;
        }
        let (down, up) = (event.down?, event.up?);
        let abs_x = event.velocity_x.abs();
        let abs_y = event.velocity_y.abs();
        let delta_x = up.x - down.x;
        let delta_y = up.y - down.y;

        if abs_y < abs_x && delta_x > self.travel_x {
            Some(FlingDirection::Right)
        } else if abs_y < abs_x && delta_x < -self.travel_x {
            Some(FlingDirection::Left)
        } else if abs_x < abs_y && delta_y < -self.travel_y {
            Some(FlingDirection::Up)
        } else if abs_x < abs_y / 2 && delta_y > self.travel_y {
            // Downward flings demand clear vertical dominance; palms drifting
            // off a key row read as down otherwise.
            Some(FlingDirection::Down)
        } else {
            log::debug!("fling without a dominant axis, passing");
            None
        }
    }

    /// Resolves the fling into a key-specific secondary action: hit-test at
    /// the fling's down point, then look up the key's code for the winning
    /// direction. `None` at any step means no directional action fires.
    pub fn key_action(
        &self,
        layout: &KeyboardLayout<'_>,
        event: &FlingEvent,
    ) -> Option<KeyAction> {
        let direction = self.resolve(event)?;
        let down = event.down?;
        let key_index = layout.nearest_key_at(down.x, down.y)?;
        let code = layout.directional_code(key_index, direction)?;
        log::debug!("fling {direction:?} on key {key_index} -> code {code}");
        Some(KeyAction {
            key_index,
            direction,
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Key;
    use crate::types::{TouchAction, TouchSample};

    fn fling(dx: i32, dy: i32, velocity_x: i32, velocity_y: i32) -> FlingEvent {
        let down = TouchSample {
            pointer_id: 0,
            pointer_index: 0,
            x: 20,
            y: 20,
            t_ms: 0,
            action: TouchAction::Down,
        };
        let up = TouchSample {
            x: 20 + dx,
            y: 20 + dy,
            t_ms: 40,
            action: TouchAction::Up,
            ..down
        };
        FlingEvent {
            action: FlingAction::Fling,
            down: Some(down),
            up: Some(up),
            velocity_x,
            velocity_y,
        }
    }

    #[test]
    fn horizontal_dominance_resolves_left_and_right() {
        let resolver = FlingResolver::default();
        assert_eq!(
            resolver.resolve(&fling(40, 3, 900, 60)),
            Some(FlingDirection::Right)
        );
        assert_eq!(
            resolver.resolve(&fling(-40, 3, -900, 60)),
            Some(FlingDirection::Left)
        );
    }

    #[test]
    fn vertical_dominance_resolves_up_and_strict_down() {
        let resolver = FlingResolver::default();
        assert_eq!(
            resolver.resolve(&fling(2, -40, 50, -900)),
            Some(FlingDirection::Up)
        );
        // Down requires the velocity to be twice as vertical as horizontal.
        assert_eq!(
            resolver.resolve(&fling(2, 40, 100, 900)),
            Some(FlingDirection::Down)
        );
        assert_eq!(resolver.resolve(&fling(2, 40, 500, 900)), None);
    }

    #[test]
    fn short_travel_resolves_nothing() {
        let resolver = FlingResolver::default();
        assert_eq!(resolver.resolve(&fling(8, 0, 900, 10)), None);
        assert_eq!(resolver.resolve(&fling(0, 8, 10, 900)), None);
    }

    #[test]
    fn unpopulated_events_resolve_nothing() {
        let resolver = FlingResolver::default();
        assert_eq!(resolver.resolve(&FlingEvent::default()), None);
        let mut event = fling(40, 0, 900, 0);
        event.action = FlingAction::Started;
        assert_eq!(resolver.resolve(&event), None);
    }

    #[test]
    fn key_action_resolves_through_the_layout() {
        let keys = [Key::plain(0, 0, 40, 40, 'a' as i32).with_directional_codes([
            Some('A' as i32),
            None,
            None,
            Some('4' as i32),
        ])];
        let layout = KeyboardLayout::new(&keys, 30);
        let resolver = FlingResolver::default();

        assert_eq!(
            resolver.key_action(&layout, &fling(40, 2, 900, 40)),
            Some(KeyAction {
                key_index: 0,
                direction: FlingDirection::Right,
                code: '4' as i32,
            })
        );
        // The key has no left-fling action.
        assert_eq!(resolver.key_action(&layout, &fling(-40, 2, -900, 40)), None);
    }

    #[test]
    fn key_action_off_the_keyboard_resolves_nothing() {
        let keys = [Key::plain(0, 0, 40, 40, 'a' as i32)];
        let layout = KeyboardLayout::new(&keys, 30);
        let resolver = FlingResolver::default();

        let mut event = fling(40, 2, 900, 40);
        if let Some(down) = event.down.as_mut() {
            down.x = 500;
            down.y = 500;
        }
        assert_eq!(resolver.key_action(&layout, &event), None);
    }
}
