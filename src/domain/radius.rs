//! Liquidity depth of an orbital tick or of the whole pool.

use core::fmt;

/// Radius `r` of a spherical liquidity region.
///
/// Radius is the orbital analogue of Uniswap V3's `L`: minting `r` at the
/// equal-price point costs `r · (1 − 1/√n)` of every asset. Radii add
/// across positions at the same tick and across interior ticks.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::Radius;
///
/// let r = Radius::new(400).checked_add(&Radius::new(600));
/// assert_eq!(r, Some(Radius::new(1_000)));
/// assert_eq!(Radius::new(1_000).apply_delta(-1_000), Some(Radius::ZERO));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Radius(u128);

impl Radius {
    /// Zero radius.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Radius` from a raw value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the radius is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Applies a signed delta. Returns `None` if the result is negative or
    /// overflows.
    #[must_use]
    pub const fn apply_delta(&self, delta: i128) -> Option<Self> {
        if delta >= 0 {
            match self.0.checked_add(delta as u128) {
                Some(v) => Some(Self(v)),
                None => None,
            }
        } else {
            match self.0.checked_sub(delta.unsigned_abs()) {
                Some(v) => Some(Self(v)),
                None => None,
            }
        }
    }

    /// Returns the radius as a positive signed delta, or `None` above
    /// `i128::MAX`.
    #[must_use]
    pub const fn to_delta(&self) -> Option<i128> {
        if self.0 > i128::MAX as u128 {
            None
        } else {
            Some(self.0 as i128)
        }
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Radius({})", self.0)
    }
}
