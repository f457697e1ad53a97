pub type PointerId = u32;

/// Raw action codes accepted by [`TouchAction::from_raw`], matching the wire
/// encoding of the platform motion-event stream.
const ACTION_CODE_DOWN: u8 = 0;
const ACTION_CODE_UP: u8 = 1;
const ACTION_CODE_MOVE: u8 = 2;
const ACTION_CODE_CANCEL: u8 = 3;
const ACTION_CODE_POINTER_DOWN: u8 = 5;
const ACTION_CODE_POINTER_UP: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    PointerDown,
    PointerUp,
    Cancel,
}

impl TouchAction {
    /// Decodes a platform action code. Unknown codes are rejected so malformed
    /// input never reaches the engine.
    pub fn from_raw(code: u8) -> Result<Self, GestureError> {
        match code {
            ACTION_CODE_DOWN => Ok(Self::Down),
            ACTION_CODE_UP => Ok(Self::Up),
            ACTION_CODE_MOVE => Ok(Self::Move),
            ACTION_CODE_CANCEL => Ok(Self::Cancel),
            ACTION_CODE_POINTER_DOWN => Ok(Self::PointerDown),
            ACTION_CODE_POINTER_UP => Ok(Self::PointerUp),
            _ => Err(GestureError::UnknownAction(code)),
        }
    }
}

/// One touch sample as delivered by the input source. `pointer_index` is the
/// position of the pointer inside a multi-pointer batch; `pointer_id` is the
/// stable id assigned by the platform for the lifetime of the contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchSample {
    pub pointer_id: PointerId,
    pub pointer_index: u8,
    pub x: i32,
    pub y: i32,
    pub t_ms: u64,
    pub action: TouchAction,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlingAction {
    #[default]
    None,
    Started,
    Fling,
}

/// Per-slot entry of the shared fling table. Entries are mutated in place:
/// armed to `Started` when a slot sees its first sample of a gesture, set to
/// `Fling` for the duration of the `on_fling` callback, and cleared back to
/// `None` afterwards (and table-wide on a true Up or Cancel).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlingEvent {
    pub action: FlingAction,
    pub down: Option<TouchSample>,
    pub up: Option<TouchSample>,
    pub velocity_x: i32,
    pub velocity_y: i32,
}

impl FlingEvent {
    pub(crate) fn set(
        &mut self,
        down: TouchSample,
        up: TouchSample,
        velocity_x: i32,
        velocity_y: i32,
    ) {
        self.action = FlingAction::Fling;
        self.down = Some(down);
        self.up = Some(up);
        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureError {
    ZeroPointerCapacity,
    PointerCapacityExceeded { requested: usize, max: usize },
    InvalidSlop,
    InvalidFlingVelocity,
    InvalidTimeout,
    UnknownAction(u8),
}

impl core::fmt::Display for GestureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroPointerCapacity => write!(f, "pointer capacity must be at least 1"),
            Self::PointerCapacityExceeded { requested, max } => {
                write!(f, "pointer capacity {requested} exceeds supported maximum {max}")
            }
            Self::InvalidSlop => write!(f, "slop distances must be at least one pixel"),
            Self::InvalidFlingVelocity => {
                write!(f, "fling velocity thresholds must satisfy 0 <= min < max")
            }
            Self::InvalidTimeout => write!(f, "timeout durations must be non-zero"),
            Self::UnknownAction(code) => write!(f, "unknown touch action code {code}"),
        }
    }
}

impl core::error::Error for GestureError {}
