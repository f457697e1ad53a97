use crate::types::GestureError;

/// Upper bound on simultaneously tracked pointers; the per-engine capacity is
/// picked at construction and never grows.
pub const MAX_TRACKED_POINTERS: usize = 4;

/// Looser slop gating double-tap eligibility only. Fixed, not configurable.
pub const BIGGER_TOUCH_SLOP_PX: i32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureConfig {
    /// Number of pointer slots in the tracking pool.
    pub pointer_capacity: usize,
    /// Motion beyond this distance from the down point leaves the tap region.
    pub touch_slop: u16,
    /// Maximum distance between the two downs of a double tap.
    pub double_tap_slop: u16,
    /// Per-axis release speed a fling must exceed, px/s.
    pub min_fling_velocity: i32,
    /// Velocity estimates are clamped to this magnitude, px/s.
    pub max_fling_velocity: i32,
    pub long_press_enabled: bool,
    pub tap_timeout_ms: u64,
    pub long_press_timeout_ms: u64,
    pub double_tap_timeout_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pointer_capacity: 2,
            touch_slop: 10,
            double_tap_slop: 100,
            min_fling_velocity: 5,
            max_fling_velocity: 8_000,
            long_press_enabled: true,
            tap_timeout_ms: 100,
            long_press_timeout_ms: 500,
            double_tap_timeout_ms: 300,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), GestureError> {
        if self.pointer_capacity == 0 {
            return Err(GestureError::ZeroPointerCapacity);
        }
        if self.pointer_capacity > MAX_TRACKED_POINTERS {
            return Err(GestureError::PointerCapacityExceeded {
                requested: self.pointer_capacity,
                max: MAX_TRACKED_POINTERS,
            });
        }
        if self.touch_slop == 0 || self.double_tap_slop == 0 {
            return Err(GestureError::InvalidSlop);
        }
        if self.min_fling_velocity < 0 || self.max_fling_velocity <= self.min_fling_velocity {
            return Err(GestureError::InvalidFlingVelocity);
        }
        if self.tap_timeout_ms == 0
            || self.long_press_timeout_ms == 0
            || self.double_tap_timeout_ms == 0
        {
            return Err(GestureError::InvalidTimeout);
        }
        Ok(())
    }

    pub(crate) fn touch_slop_sq(&self) -> i64 {
        let slop = i64::from(self.touch_slop);
        slop * slop
    }

    pub(crate) fn double_tap_slop_sq(&self) -> i64 {
        let slop = i64::from(self.double_tap_slop);
        slop * slop
    }

    pub(crate) fn apply(&mut self, params: TuningParams) -> Result<(), GestureError> {
        let mut updated = *self;
        updated.touch_slop = params.touch_slop;
        updated.double_tap_slop = params.double_tap_slop;
        updated.min_fling_velocity = params.min_fling_velocity;
        updated.long_press_enabled = params.long_press_enabled;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// The runtime-tunable subset of [`GestureConfig`], applied through
/// `GestureEngine::set_params`. Thresholds take effect on the next sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuningParams {
    pub touch_slop: u16,
    pub double_tap_slop: u16,
    pub min_fling_velocity: i32,
    pub long_press_enabled: bool,
}

impl Default for TuningParams {
    fn default() -> Self {
        let config = GestureConfig::default();
        Self {
            touch_slop: config.touch_slop,
            double_tap_slop: config.double_tap_slop,
            min_fling_velocity: config.min_fling_velocity,
            long_press_enabled: config.long_press_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GestureConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = GestureConfig {
            pointer_capacity: 0,
            ..GestureConfig::default()
        };
        assert_eq!(config.validate(), Err(GestureError::ZeroPointerCapacity));
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let config = GestureConfig {
            pointer_capacity: MAX_TRACKED_POINTERS + 1,
            ..GestureConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(GestureError::PointerCapacityExceeded {
                requested: MAX_TRACKED_POINTERS + 1,
                max: MAX_TRACKED_POINTERS,
            })
        );
    }

    #[test]
    fn inverted_velocity_bounds_are_rejected() {
        let config = GestureConfig {
            min_fling_velocity: 500,
            max_fling_velocity: 100,
            ..GestureConfig::default()
        };
        assert_eq!(config.validate(), Err(GestureError::InvalidFlingVelocity));
    }

    #[test]
    fn invalid_params_leave_config_untouched() {
        let mut config = GestureConfig::default();
        let before = config;
        let result = config.apply(TuningParams {
            touch_slop: 0,
            ..TuningParams::default()
        });
        assert_eq!(result, Err(GestureError::InvalidSlop));
        assert_eq!(config, before);
    }

    #[test]
    fn valid_params_update_tunable_fields_only() {
        let mut config = GestureConfig::default();
        config
            .apply(TuningParams {
                touch_slop: 24,
                double_tap_slop: 64,
                min_fling_velocity: 120,
                long_press_enabled: false,
            })
            .unwrap();
        assert_eq!(config.touch_slop, 24);
        assert_eq!(config.double_tap_slop, 64);
        assert_eq!(config.min_fling_velocity, 120);
        assert!(!config.long_press_enabled);
        assert_eq!(config.tap_timeout_ms, GestureConfig::default().tap_timeout_ms);
    }
}
