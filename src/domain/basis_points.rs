//! Basis-point representation for percentages.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::AmmError;
use crate::math::div_round;

/// Value that represents 100%.
const MAX_BPS: u32 = 10_000;

/// A percentage in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// The pool uses it for the protocol's share of every swap and flash fee.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::{Amount, BasisPoints, Rounding};
///
/// let share = BasisPoints::new(2_500);
/// assert_eq!(share.apply(Amount::new(1_000), Rounding::Down), Ok(Amount::new(250)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(MAX_BPS);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is within `0..=10_000`.
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// Computes `amount · self / 10_000` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the intermediate product overflows.
    pub const fn apply(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        let Some(product) = amount.get().checked_mul(self.0 as u128) else {
            return Err(AmmError::Overflow("basis points apply overflow"));
        };
        match div_round(product, MAX_BPS as u128, rounding) {
            Some(v) => Ok(Amount::new(v)),
            None => Err(AmmError::DivisionByZero),
        }
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(BasisPoints::ZERO.is_valid_percent());
        assert!(BasisPoints::MAX_PERCENT.is_valid_percent());
        assert!(!BasisPoints::new(10_001).is_valid_percent());
    }

    #[test]
    fn apply_rounds_as_requested() {
        let bp = BasisPoints::new(1);
        let Ok(down) = bp.apply(Amount::new(5_000), Rounding::Down) else {
            panic!("expected Ok");
        };
        let Ok(up) = bp.apply(Amount::new(5_000), Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!(down, Amount::ZERO);
        assert_eq!(up, Amount::new(1));
    }

    #[test]
    fn apply_full_share_is_identity() {
        assert_eq!(
            BasisPoints::MAX_PERCENT.apply(Amount::new(12_345), Rounding::Down),
            Ok(Amount::new(12_345))
        );
    }

    #[test]
    fn apply_overflow() {
        assert!(BasisPoints::new(2).apply(Amount::MAX, Rounding::Down).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", BasisPoints::new(30)), "30bp");
    }
}
