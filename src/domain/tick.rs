//! Nested boundary index of the orbital tick model.

use core::fmt;

use crate::error::AmmError;

/// Minimum valid tick index.
const MIN_TICK: i32 = -32_768;

/// Maximum valid tick index.
const MAX_TICK: i32 = 32_768;

/// Index of a nested tick boundary.
///
/// Tick `k` sits on the plane `x · v = k^norm · r` with
/// `k^norm = 1.0001^k`. Larger indices are farther from the equal-price
/// point, and every tick fully contains every smaller one. Which indices
/// a pool accepts depends on its asset count (see
/// [`tick_bounds`](crate::math::tick_bounds)); this type only enforces the
/// global window `[-32768, 32768]`, wide enough for 2 to 64 assets.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::Tick;
///
/// let tick = Tick::new(2_000);
/// assert!(tick.is_ok());
/// assert!(Tick::new(40_000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(i32);

impl Tick {
    /// Minimum valid tick.
    pub const MIN: Self = Self(MIN_TICK);

    /// Maximum valid tick.
    pub const MAX: Self = Self(MAX_TICK);

    /// Tick whose normalized boundary is exactly `1.0`.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Tick` with range validation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidTick`] if `value` is outside
    /// `[-32768, 32768]`.
    pub const fn new(value: i32) -> crate::error::Result<Self> {
        if value < MIN_TICK || value > MAX_TICK {
            return Err(AmmError::InvalidTick("tick out of range [-32768, 32768]"));
        }
        Ok(Self(value))
    }

    /// Creates a tick, clamping `value` into the valid range.
    pub const fn saturating(value: i32) -> Self {
        if value < MIN_TICK {
            Self::MIN
        } else if value > MAX_TICK {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Returns the underlying index.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Checked addition of a delta.
    ///
    /// Returns `None` if the result leaves the valid range.
    #[must_use]
    pub const fn checked_add(&self, delta: i32) -> Option<Self> {
        match self.0.checked_add(delta) {
            Some(v) if v >= MIN_TICK && v <= MAX_TICK => Some(Self(v)),
            _ => None,
        }
    }

    /// Checked subtraction of a delta.
    ///
    /// Returns `None` if the result leaves the valid range.
    #[must_use]
    pub const fn checked_sub(&self, delta: i32) -> Option<Self> {
        match self.0.checked_sub(delta) {
            Some(v) if v >= MIN_TICK && v <= MAX_TICK => Some(Self(v)),
            _ => None,
        }
    }

    /// Returns `true` if the tick is a multiple of `spacing`.
    ///
    /// A zero spacing aligns nothing.
    #[must_use]
    pub const fn is_aligned(&self, spacing: u32) -> bool {
        if spacing == 0 || spacing > i32::MAX as u32 {
            return false;
        }
        self.0.rem_euclid(spacing as i32) == 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}
