//! Key-table side of the fling contract: given a point, find the nearest key;
//! given a key and a direction, find the key code its fling produces.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlingDirection {
    Up,
    Down,
    Left,
    Right,
}

impl FlingDirection {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// One key of a keyboard layout. `directional_codes` holds the codes emitted
/// by flinging up/down/left/right off the key; `None` means the key has no
/// action in that direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub code: i32,
    pub directional_codes: [Option<i32>; FlingDirection::COUNT],
}

impl Key {
    pub const fn plain(x: i32, y: i32, width: i32, height: i32, code: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            code,
            directional_codes: [None; FlingDirection::COUNT],
        }
    }

    pub const fn with_directional_codes(
        mut self,
        codes: [Option<i32>; FlingDirection::COUNT],
    ) -> Self {
        self.directional_codes = codes;
        self
    }

    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    fn center_distance_sq(&self, x: i32, y: i32) -> i64 {
        let cx = i64::from(self.x) + i64::from(self.width) / 2;
        let cy = i64::from(self.y) + i64::from(self.height) / 2;
        let dx = i64::from(x) - cx;
        let dy = i64::from(y) - cy;
        dx * dx + dy * dy
    }
}

/// Read-only hit-testing view over a key table. Containment wins outright;
/// otherwise the nearest key center within the proximity threshold is
/// reported. A point near no key resolves to `None`, a sentinel rather than
/// an error.
#[derive(Clone, Copy, Debug)]
pub struct KeyboardLayout<'a> {
    keys: &'a [Key],
    proximity_threshold_sq: i64,
}

impl<'a> KeyboardLayout<'a> {
    pub fn new(keys: &'a [Key], proximity_threshold: i32) -> Self {
        let threshold = i64::from(proximity_threshold.max(0));
        Self {
            keys,
            proximity_threshold_sq: threshold * threshold,
        }
    }

    pub fn keys(&self) -> &'a [Key] {
        self.keys
    }

    pub fn nearest_key_at(&self, x: i32, y: i32) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (index, key) in self.keys.iter().enumerate() {
            if key.is_inside(x, y) {
                return Some(index);
            }
            let distance_sq = key.center_distance_sq(x, y);
            if distance_sq < self.proximity_threshold_sq
                && best.is_none_or(|(_, nearest)| distance_sq < nearest)
            {
                best = Some((index, distance_sq));
            }
        }
        best.map(|(index, _)| index)
    }

    pub fn directional_code(&self, key_index: usize, direction: FlingDirection) -> Option<i32> {
        self.keys.get(key_index)?.directional_codes[direction.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> [Key; 3] {
        [
            Key::plain(0, 0, 40, 40, 'a' as i32).with_directional_codes([
                Some('A' as i32),
                Some('1' as i32),
                None,
                Some('!' as i32),
            ]),
            Key::plain(40, 0, 40, 40, 'b' as i32),
            Key::plain(0, 40, 40, 40, 'c' as i32),
        ]
    }

    #[test]
    fn containment_wins_over_proximity() {
        let keys = keys();
        let layout = KeyboardLayout::new(&keys, 30);
        assert_eq!(layout.nearest_key_at(10, 10), Some(0));
        assert_eq!(layout.nearest_key_at(45, 5), Some(1));
        assert_eq!(layout.nearest_key_at(5, 70), Some(2));
    }

    #[test]
    fn proximity_picks_the_nearest_center_within_threshold() {
        let keys = keys();
        let layout = KeyboardLayout::new(&keys, 30);
        // Just off the bottom edge of key 2, nearer its center than key 0's.
        assert_eq!(layout.nearest_key_at(20, 82), Some(2));
    }

    #[test]
    fn far_points_resolve_to_no_key() {
        let keys = keys();
        let layout = KeyboardLayout::new(&keys, 30);
        assert_eq!(layout.nearest_key_at(400, 400), None);
        assert_eq!(layout.nearest_key_at(-200, 10), None);
    }

    #[test]
    fn directional_codes_use_the_sentinel_for_missing_actions() {
        let keys = keys();
        let layout = KeyboardLayout::new(&keys, 30);
        assert_eq!(
            layout.directional_code(0, FlingDirection::Up),
            Some('A' as i32)
        );
        assert_eq!(layout.directional_code(0, FlingDirection::Left), None);
        assert_eq!(layout.directional_code(1, FlingDirection::Up), None);
        assert_eq!(layout.directional_code(9, FlingDirection::Up), None);
    }
}
