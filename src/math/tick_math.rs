//! Tick-to-boundary conversions for nested orbital ticks.
//!
//! Ticks count up from the equal-price point of an `n`-asset pool. Tick
//! `t` has the normalized boundary
//!
//! ```text
//! k^norm = kNormMin · 1.0001^t,   kNormMin = √n − 1
//! ```
//!
//! carried in WAD fixed point, so tick 0 is the equal-price point for
//! every `n`. A tick is usable while `k^norm ≤ (n − 1) / √n`, the
//! boundary where one reserve of the tick's sphere reaches zero.
//!
//! # Examples
//!
//! ```
//! use orbital_amm::domain::Tick;
//! use orbital_amm::math::{knorm_at_tick, knorm_bounds, tick_at_knorm, tick_bounds};
//!
//! let Ok(tick) = Tick::new(2_000) else { panic!("valid tick") };
//! let Ok(k) = knorm_at_tick(tick, 3) else { panic!("in range") };
//! assert_eq!(tick_at_knorm(k, 3), Ok(tick));
//!
//! let Ok((k_min, _)) = knorm_bounds(3) else { panic!("n = 3 is valid") };
//! assert_eq!(knorm_at_tick(Tick::ZERO, 3), Ok(k_min));
//!
//! let Ok((lo, hi)) = tick_bounds(3) else { panic!("n = 3 is valid") };
//! assert!(lo == Tick::ZERO && tick <= hi);
//! ```

use ethnum::U256;

use super::wide::{isqrt, mul_div, narrow, wad_squared, WAD};
use crate::domain::{Rounding, Tick};
use crate::error::AmmError;

/// Tick base `1.0001` in WAD.
pub const BASE_WAD: u128 = 1_000_100_000_000_000_000;

/// `√n` in WAD, floored.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for fewer than two assets.
pub fn sqrt_n_wad(n: usize) -> crate::error::Result<u128> {
    if n < 2 {
        return Err(AmmError::InvalidConfiguration("pool needs at least two assets"));
    }
    let n = u128::try_from(n).map_err(|_| AmmError::Overflow("asset count exceeds u128"))?;
    let radicand = U256::from(n)
        .checked_mul(wad_squared())
        .ok_or(AmmError::Overflow("sqrt(n) radicand overflow"))?;
    narrow(isqrt(radicand), "sqrt(n) exceeds u128")
}

/// Normalized boundary `kNormMin(n) · 1.0001^tick` in WAD, rounded down.
///
/// Negative ticks lie below the equal-price point. They never hold
/// positions but serve as the current tick of a pool that has not moved.
///
/// # Errors
///
/// - [`AmmError::InvalidConfiguration`] for fewer than two assets.
/// - [`AmmError::Overflow`] if an intermediate product overflows, which
///   does not happen inside the [`Tick`] range.
pub fn knorm_at_tick(tick: Tick, n: usize) -> crate::error::Result<u128> {
    let (k_min, _) = knorm_bounds(n)?;
    let pow = pow_wad(BASE_WAD, tick.get().unsigned_abs())?;
    if tick.get() >= 0 {
        mul_div(k_min, pow, WAD, Rounding::Down)
    } else {
        mul_div(k_min, WAD, pow, Rounding::Down)
    }
}

/// Greatest tick whose normalized boundary is `≤ knorm` in an
/// `n`-asset pool.
///
/// Saturates at [`Tick::MIN`] and [`Tick::MAX`].
///
/// # Errors
///
/// Propagates [`knorm_at_tick`] errors.
pub fn tick_at_knorm(knorm: u128, n: usize) -> crate::error::Result<Tick> {
    let mut lo = Tick::MIN.get();
    let mut hi = Tick::MAX.get();
    if knorm < knorm_at_tick(Tick::MIN, n)? {
        return Ok(Tick::MIN);
    }
    while lo < hi {
        // upper midpoint so the loop always shrinks
        let mid = lo + (hi - lo + 1) / 2;
        if knorm_at_tick(Tick::saturating(mid), n)? <= knorm {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(Tick::saturating(lo))
}

/// `(kNormMin, kNormMax)` in WAD for an `n`-asset pool.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for fewer than two assets.
pub fn knorm_bounds(n: usize) -> crate::error::Result<(u128, u128)> {
    let sqrt_n = sqrt_n_wad(n)?;
    let lower = sqrt_n
        .checked_sub(WAD)
        .ok_or(AmmError::InvalidConfiguration("sqrt(n) below one"))?;
    let n_minus_one = u128::try_from(n - 1)
        .map_err(|_| AmmError::Overflow("asset count exceeds u128"))?
        .checked_mul(WAD)
        .ok_or(AmmError::Overflow("asset count overflow"))?;
    let upper = mul_div(n_minus_one, WAD, sqrt_n, Rounding::Down)?;
    Ok((lower, upper))
}

/// Inclusive range of ticks an `n`-asset pool accepts positions at:
/// tick 0 up to the last tick below `kNormMax`.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for fewer than two assets
/// or when the window holds no tick.
pub fn tick_bounds(n: usize) -> crate::error::Result<(Tick, Tick)> {
    let (_, k_max) = knorm_bounds(n)?;
    let hi = tick_at_knorm(k_max, n)?;
    if hi < Tick::ZERO {
        return Err(AmmError::InvalidConfiguration("empty tick window"));
    }
    Ok((Tick::ZERO, hi))
}

/// Exponentiation by squaring in WAD fixed point.
fn pow_wad(base: u128, mut exp: u32) -> crate::error::Result<u128> {
    let mut result = WAD;
    let mut acc = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_div(result, acc, WAD, Rounding::Down)?;
        }
        exp >>= 1;
        if exp > 0 {
            acc = mul_div(acc, acc, WAD, Rounding::Down)?;
        }
    }
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn tick(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("invalid tick in test: {v}");
        };
        t
    }

    // -- sqrt(n) ------------------------------------------------------------

    #[test]
    fn sqrt_n_exact_for_squares() {
        assert_eq!(sqrt_n_wad(4), Ok(2 * WAD));
        assert_eq!(sqrt_n_wad(64), Ok(8 * WAD));
        assert_eq!(sqrt_n_wad(2), Ok(1_414_213_562_373_095_048));
        assert!(sqrt_n_wad(1).is_err());
    }

    // -- knorm_at_tick ------------------------------------------------------

    #[test]
    fn knorm_small_ticks_are_exact() {
        // kNormMin(4) = 1, so four assets read the base powers directly
        assert_eq!(knorm_at_tick(Tick::ZERO, 4), Ok(WAD));
        assert_eq!(knorm_at_tick(tick(1), 4), Ok(BASE_WAD));
        assert_eq!(knorm_at_tick(tick(2), 4), Ok(1_000_200_010_000_000_000));
        assert_eq!(knorm_at_tick(tick(-1), 4), Ok(999_900_009_999_000_099));
    }

    #[test]
    fn tick_zero_is_equal_price_for_every_pool() {
        for n in [2, 3, 4, 5, 64] {
            let Ok((k_min, _)) = knorm_bounds(n) else {
                panic!("expected Ok");
            };
            assert_eq!(knorm_at_tick(Tick::ZERO, n), Ok(k_min), "n = {n}");
        }
    }

    #[test]
    fn knorm_scales_with_pool_size() {
        assert_eq!(knorm_at_tick(tick(1), 3), Ok(732_124_012_649_634_180));
        assert_eq!(knorm_at_tick(tick(1_000), 2), Ok(457_774_494_281_645_142));
        assert_eq!(knorm_at_tick(tick(-1), 3), Ok(731_977_609_807_896_503));
    }

    #[test]
    fn knorm_is_strictly_increasing() {
        let mut prev = 0u128;
        for t in (-5_000..=5_000).step_by(250) {
            let Ok(k) = knorm_at_tick(tick(t), 3) else {
                panic!("expected Ok");
            };
            assert!(k > prev, "knorm not increasing at {t}");
            prev = k;
        }
    }

    #[test]
    fn knorm_extremes_fit() {
        assert!(knorm_at_tick(Tick::MAX, 64).is_ok());
        assert!(knorm_at_tick(Tick::MIN, 2).is_ok());
    }

    // -- tick_at_knorm ------------------------------------------------------

    #[test]
    fn tick_at_knorm_inverts_knorm() {
        for n in [2, 3, 4] {
            for t in [-8_000, -1, 0, 1, 1_000, 2_000, 4_054, 20_000] {
                let Ok(k) = knorm_at_tick(tick(t), n) else {
                    panic!("expected Ok");
                };
                assert_eq!(tick_at_knorm(k, n), Ok(tick(t)), "n = {n}");
                assert_eq!(tick_at_knorm(k - 1, n), Ok(tick(t - 1)), "n = {n}");
            }
        }
    }

    #[test]
    fn tick_at_knorm_saturates() {
        assert_eq!(tick_at_knorm(0, 3), Ok(Tick::MIN));
        assert_eq!(tick_at_knorm(u128::MAX, 3), Ok(Tick::MAX));
    }

    // -- Bounds -------------------------------------------------------------

    #[test]
    fn four_asset_window() {
        assert_eq!(knorm_bounds(4), Ok((WAD, 1_500_000_000_000_000_000)));
        assert_eq!(tick_bounds(4), Ok((Tick::ZERO, tick(4_054))));
    }

    #[test]
    fn small_pools_start_at_zero() {
        assert_eq!(tick_bounds(2), Ok((Tick::ZERO, tick(5_348))));
        assert_eq!(tick_bounds(3), Ok((Tick::ZERO, tick(4_557))));
    }

    #[test]
    fn large_pool_window_fits() {
        assert_eq!(tick_bounds(64), Ok((Tick::ZERO, tick(1_177))));
    }

    #[test]
    fn single_asset_has_no_window() {
        assert!(tick_bounds(1).is_err());
        assert!(knorm_at_tick(Tick::ZERO, 1).is_err());
    }
}
