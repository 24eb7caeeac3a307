//! Rounding helper for `u128` division.
//!
//! # Convention
//!
//! Every quotient rounds in the pool's favor:
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Deposit owed to the pool | [`Rounding::Up`] |
//! | Output or withdrawal paid out | [`Rounding::Down`] |
//! | Fee | [`Rounding::Up`] |
//! | Radius credited to a provider | [`Rounding::Down`] |

use crate::domain::Rounding;

/// Integer division of `u128` values with an explicit rounding direction.
///
/// Returns [`None`] if `denominator` is zero.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::Rounding;
/// use orbital_amm::math::div_round;
///
/// assert_eq!(div_round(7, 2, Rounding::Down), Some(3));
/// assert_eq!(div_round(7, 2, Rounding::Up), Some(4));
/// assert_eq!(div_round(7, 0, Rounding::Up), None);
/// ```
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = numerator / denominator;
    match rounding {
        Rounding::Down => Some(q),
        // q + 1 cannot overflow: a remainder implies denominator > 1
        Rounding::Up if numerator % denominator != 0 => Some(q + 1),
        Rounding::Up => Some(q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator() {
        assert_eq!(div_round(100, 0, Rounding::Down), None);
        assert_eq!(div_round(0, 0, Rounding::Up), None);
    }

    #[test]
    fn exact_quotient_ignores_direction() {
        assert_eq!(div_round(100, 10, Rounding::Down), Some(10));
        assert_eq!(div_round(100, 10, Rounding::Up), Some(10));
        assert_eq!(div_round(0, 5, Rounding::Up), Some(0));
    }

    #[test]
    fn remainder_rounds_by_direction() {
        assert_eq!(div_round(9, 10, Rounding::Down), Some(0));
        assert_eq!(div_round(9, 10, Rounding::Up), Some(1));
        assert_eq!(div_round(1, u128::MAX, Rounding::Up), Some(1));
    }

    #[test]
    fn extremes() {
        assert_eq!(div_round(u128::MAX, 1, Rounding::Up), Some(u128::MAX));
        assert_eq!(div_round(u128::MAX, 2, Rounding::Up), Some(u128::MAX / 2 + 1));
        assert_eq!(div_round(u128::MAX, u128::MAX - 1, Rounding::Up), Some(2));
    }
}
