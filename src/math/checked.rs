//! Checked arithmetic trait for domain wrapper types.
//!
//! [`CheckedArithmetic`] turns the `Option`-returning arithmetic of
//! [`Amount`] and [`Radius`] into `Result`s carrying a specific
//! [`AmmError`], so pool code can propagate with `?`.
//!
//! # Examples
//!
//! ```
//! use orbital_amm::domain::Radius;
//! use orbital_amm::math::CheckedArithmetic;
//!
//! let r = Radius::new(400).safe_add(&Radius::new(600));
//! assert_eq!(r, Ok(Radius::new(1_000)));
//! assert!(Radius::new(1).safe_sub(&Radius::new(2)).is_err());
//! ```

use crate::domain::{Amount, Radius};
use crate::error::AmmError;

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No saturation**: errors propagate instead.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds `u128`.
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("amount subtraction underflow"))
    }
}

impl CheckedArithmetic for Radius {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("radius addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("radius subtraction underflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_errors_are_specific() {
        assert_eq!(
            Amount::MAX.safe_add(&Amount::new(1)),
            Err(AmmError::Overflow("amount addition overflow"))
        );
        assert_eq!(
            Amount::ZERO.safe_sub(&Amount::new(1)),
            Err(AmmError::Underflow("amount subtraction underflow"))
        );
        assert_eq!(Amount::new(3).safe_sub(&Amount::new(1)), Ok(Amount::new(2)));
    }

    #[test]
    fn radius_errors_are_specific() {
        assert_eq!(
            Radius::new(u128::MAX).safe_add(&Radius::new(1)),
            Err(AmmError::Overflow("radius addition overflow"))
        );
        assert_eq!(
            Radius::ZERO.safe_sub(&Radius::new(1)),
            Err(AmmError::Underflow("radius subtraction underflow"))
        );
    }
}
