//! 256-bit intermediates for products and squares of reserves.
//!
//! Reserves, radii and the sum of reserves fit in `u128`, but their
//! products and the sum of squares do not. Every such quantity is carried
//! in [`U256`] / [`I256`] and narrowed back with an explicit overflow
//! check.

use ethnum::{I256, U256};

use crate::domain::Rounding;
use crate::error::AmmError;

/// Fixed-point scale: `1.0 == WAD`.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// `WAD²` as a 256-bit value.
#[must_use]
pub fn wad_squared() -> U256 {
    U256::from(WAD) * U256::from(WAD)
}

/// Computes `a · b / c` with a 256-bit intermediate and explicit rounding.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `c` is zero.
/// - [`AmmError::Overflow`] if the quotient exceeds `u128`.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::Rounding;
/// use orbital_amm::math::mul_div;
///
/// assert_eq!(mul_div(u128::MAX, 2, 4, Rounding::Down), Ok(u128::MAX / 2));
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
/// ```
pub fn mul_div(a: u128, b: u128, c: u128, rounding: Rounding) -> crate::error::Result<u128> {
    let q = mul_div_wide(U256::from(a), U256::from(b), U256::from(c), rounding)?;
    narrow(q, "mul_div result exceeds u128")
}

/// Computes `a · b / c` entirely in 256 bits.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `c` is zero.
/// - [`AmmError::Overflow`] if `a · b` exceeds 256 bits.
pub fn mul_div_wide(a: U256, b: U256, c: U256, rounding: Rounding) -> crate::error::Result<U256> {
    if c == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    let product = a
        .checked_mul(b)
        .ok_or(AmmError::Overflow("256-bit product overflow"))?;
    div_wide(product, c, rounding)
}

/// Divides two 256-bit values with explicit rounding.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `d` is zero.
pub fn div_wide(n: U256, d: U256, rounding: Rounding) -> crate::error::Result<U256> {
    if d == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    let q = n / d;
    if rounding.is_up() && n % d != U256::ZERO {
        Ok(q + U256::ONE)
    } else {
        Ok(q)
    }
}

/// Floor of the square root of a 256-bit value.
#[must_use]
pub fn isqrt(x: U256) -> U256 {
    if x < U256::new(2) {
        return x;
    }
    let bits = 256 - x.leading_zeros();
    let mut z = U256::ONE << bits.div_ceil(2);
    loop {
        let y = (z + x / z) >> 1;
        if y >= z {
            return z;
        }
        z = y;
    }
}

/// Square root with explicit rounding.
#[must_use]
pub fn sqrt_rounded(x: U256, rounding: Rounding) -> U256 {
    let root = isqrt(x);
    if rounding.is_up() && root * root != x {
        root + U256::ONE
    } else {
        root
    }
}

/// Narrows a 256-bit value to `u128`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] with `context` if `x` does not fit.
pub fn narrow(x: U256, context: &'static str) -> crate::error::Result<u128> {
    if x > U256::from(u128::MAX) {
        return Err(AmmError::Overflow(context));
    }
    Ok(x.as_u128())
}

/// Reinterprets an unsigned 256-bit value as signed.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if `x ≥ 2^255`.
pub fn to_signed(x: U256) -> crate::error::Result<I256> {
    if x > I256::MAX.as_u256() {
        return Err(AmmError::Overflow("value exceeds i256"));
    }
    Ok(x.as_i256())
}

/// Widens a `u128` to a signed 256-bit value.
#[must_use]
pub fn signed(x: u128) -> I256 {
    U256::from(x).as_i256()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- mul_div ------------------------------------------------------------

    #[test]
    fn mul_div_wide_intermediate() {
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down), Ok(u128::MAX));
        assert_eq!(mul_div(7, 3, 2, Rounding::Down), Ok(10));
        assert_eq!(mul_div(7, 3, 2, Rounding::Up), Ok(11));
    }

    #[test]
    fn mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), Err(AmmError::DivisionByZero));
        assert_eq!(
            mul_div(u128::MAX, 2, 1, Rounding::Down),
            Err(AmmError::Overflow("mul_div result exceeds u128"))
        );
        let huge = U256::MAX;
        assert!(mul_div_wide(huge, U256::new(2), U256::ONE, Rounding::Down).is_err());
    }

    // -- Square roots -------------------------------------------------------

    #[test]
    fn isqrt_small_values() {
        assert_eq!(isqrt(U256::ZERO), U256::ZERO);
        assert_eq!(isqrt(U256::ONE), U256::ONE);
        assert_eq!(isqrt(U256::new(3)), U256::ONE);
        assert_eq!(isqrt(U256::new(4)), U256::new(2));
        assert_eq!(isqrt(U256::new(99)), U256::new(9));
    }

    #[test]
    fn isqrt_of_wad_multiples() {
        // √(4·1e36) = 2e18 exactly
        assert_eq!(isqrt(U256::new(4) * wad_squared()), U256::new(2 * WAD));
        // √(2·1e36) = 1.414213562373095048e18
        assert_eq!(
            isqrt(U256::new(2) * wad_squared()),
            U256::new(1_414_213_562_373_095_048)
        );
    }

    #[test]
    fn isqrt_of_max() {
        let root = isqrt(U256::MAX);
        assert_eq!(root, U256::from(u128::MAX));
    }

    #[test]
    fn sqrt_rounding_directions() {
        assert_eq!(sqrt_rounded(U256::new(10), Rounding::Down), U256::new(3));
        assert_eq!(sqrt_rounded(U256::new(10), Rounding::Up), U256::new(4));
        assert_eq!(sqrt_rounded(U256::new(9), Rounding::Up), U256::new(3));
    }

    // -- Conversions --------------------------------------------------------

    #[test]
    fn narrow_and_sign() {
        assert_eq!(narrow(U256::from(u128::MAX), "x"), Ok(u128::MAX));
        assert_eq!(narrow(U256::from(u128::MAX) + U256::ONE, "x"), Err(AmmError::Overflow("x")));
        assert!(to_signed(U256::MAX).is_err());
        let Ok(v) = to_signed(U256::new(5)) else {
            panic!("expected Ok");
        };
        assert_eq!(v, I256::new(5));
        assert_eq!(signed(7), I256::new(7));
    }
}
