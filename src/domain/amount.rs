//! Raw token amount with checked arithmetic.

use core::fmt;

/// A raw token amount in the smallest unit, scaled by the token's decimals
/// (1e18 for every asset of an orbital pool).
///
/// `Amount` never interprets decimals. Arithmetic is checked and returns
/// `None` on overflow or underflow.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::Amount;
///
/// let deposit = Amount::new(500);
/// assert_eq!(deposit.checked_add(&Amount::new(250)), Some(Amount::new(750)));
/// assert_eq!(deposit.checked_sub(&Amount::new(501)), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
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

    /// Converts to a signed quantity, failing above `i128::MAX`.
    #[must_use]
    pub const fn to_signed(&self) -> Option<i128> {
        if self.0 > i128::MAX as u128 {
            None
        } else {
            Some(self.0 as i128)
        }
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- Construction -------------------------------------------------------

    #[test]
    fn constants() {
        assert_eq!(Amount::ZERO.get(), 0);
        assert_eq!(Amount::MAX.get(), u128::MAX);
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn from_u128() {
        assert_eq!(Amount::from(7u128), Amount::new(7));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Amount::new(1_000_000)), "1000000");
    }

    // -- Checked arithmetic -------------------------------------------------

    #[test]
    fn add_overflow() {
        assert_eq!(Amount::MAX.checked_add(&Amount::new(1)), None);
    }

    #[test]
    fn sub_underflow() {
        assert_eq!(Amount::new(1).checked_sub(&Amount::new(2)), None);
    }

    // -- Signed conversion --------------------------------------------------

    #[test]
    fn to_signed_bounds() {
        assert_eq!(Amount::new(5).to_signed(), Some(5));
        assert_eq!(Amount::new(i128::MAX as u128).to_signed(), Some(i128::MAX));
        assert_eq!(Amount::MAX.to_signed(), None);
    }
}
