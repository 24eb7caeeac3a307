//! Orbital curve math: sphere deposits, tick boundaries and the
//! consolidated torus invariant.
//!
//! Reserves are raw `u128` units. Products, squares and the sum of
//! squares `Q` are evaluated in 256 bits. Write `S = Σxᵢ`,
//! `Ŵ = √(n·Q − S²)` (√n times the reserve vector's distance from the
//! equal-price axis) and `c = offset + K_S + r·n`. The pool invariant is
//!
//! ```text
//! (S − c)² + (Ŵ − Ŝ_b)² = n·r²
//! ```
//!
//! `r` is the interior radius. `K_S` and `Ŝ_b` are the boundary ticks'
//! contributions to `S` and `Ŵ`, and `offset` is the part of `S` that sits
//! outside the curve. Only the near branch `S − c ≤ 0` is used.

use ethnum::{I256, U256};

use super::tick_math::{knorm_at_tick, sqrt_n_wad};
use super::wide::{isqrt, mul_div, mul_div_wide, narrow, signed, to_signed, wad_squared, WAD};
use crate::domain::{Amount, Radius, Rounding, Tick};
use crate::error::AmmError;

// ---------------------------------------------------------------------------
// Sphere helpers
// ---------------------------------------------------------------------------

/// Per-asset deposit for `radius` at the equal-price point:
/// `r · (1 − 1/√n)`.
///
/// Deposits owed to the pool use [`Rounding::Up`]; withdrawals use
/// [`Rounding::Down`].
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for fewer than two assets.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::{Amount, Radius, Rounding};
/// use orbital_amm::math::amount_per_token;
///
/// let e18 = 1_000_000_000_000_000_000u128;
/// let amount = amount_per_token(Radius::new(1_000 * e18), 4, Rounding::Up);
/// assert_eq!(amount, Ok(Amount::new(500 * e18)));
/// ```
pub fn amount_per_token(radius: Radius, n: usize, rounding: Rounding) -> crate::error::Result<Amount> {
    let sqrt_n = sqrt_n_wad(n)?;
    let share = mul_div(radius.get(), WAD, sqrt_n, rounding.opposite())?;
    radius
        .get()
        .checked_sub(share)
        .map(Amount::new)
        .ok_or(AmmError::Underflow("amount per token underflow"))
}

/// Radius bought by depositing `amount` of every asset, rounded down.
///
/// Inverse of [`amount_per_token`]. With unequal offers the smallest
/// amount limits the radius.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for fewer than two assets.
pub fn radius_for_amount(amount: Amount, n: usize) -> crate::error::Result<Radius> {
    let sqrt_n = sqrt_n_wad(n)?;
    mul_div(amount.get(), sqrt_n, sqrt_n - WAD, Rounding::Down).map(Radius::new)
}

/// Length of the reserve vector's component along the equal-price axis:
/// `S / √n`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::InvalidConfiguration`] for fewer than two assets.
pub fn projection(sum: u128, n: usize) -> crate::error::Result<u128> {
    mul_div(sum, WAD, sqrt_n_wad(n)?, Rounding::Down)
}

/// Sum of a sphere's reserves when it sits on `tick`'s boundary:
/// `√n · k^norm · r`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the result exceeds `u128`.
pub fn sum_reserves_at_tick(tick: Tick, radius: Radius, n: usize) -> crate::error::Result<u128> {
    let sqrt_n = U256::from(sqrt_n_wad(n)?);
    let knorm = U256::from(knorm_at_tick(tick, n)?);
    let scale = sqrt_n * knorm;
    let sum = mul_div_wide(U256::from(radius.get()), scale, wad_squared(), Rounding::Down)?;
    narrow(sum, "tick sum exceeds u128")
}

/// `√n` times the orthogonal radius of a sphere pinned on `tick`'s
/// boundary: `√n · r · √(1 − (k^norm − √n)²)`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::InvalidTick`] if the boundary lies outside the
/// sphere.
pub fn orthogonal_at_tick(tick: Tick, radius: Radius, n: usize) -> crate::error::Result<u128> {
    let sqrt_n = sqrt_n_wad(n)?;
    let knorm = knorm_at_tick(tick, n)?;
    let gap = U256::from(sqrt_n.abs_diff(knorm));
    let unit = wad_squared()
        .checked_sub(gap * gap)
        .ok_or(AmmError::InvalidTick("tick boundary outside its sphere"))?;
    let scale = U256::from(sqrt_n) * isqrt(unit);
    let ortho = mul_div_wide(U256::from(radius.get()), scale, wad_squared(), Rounding::Down)?;
    narrow(ortho, "tick orthogonal exceeds u128")
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// `S = Σxᵢ`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the sum exceeds `u128`.
pub fn sum_of(reserves: &[Amount]) -> crate::error::Result<u128> {
    reserves.iter().try_fold(0u128, |acc, x| {
        acc.checked_add(x.get())
            .ok_or(AmmError::Overflow("sum of reserves overflow"))
    })
}

/// `Q = Σxᵢ²`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the sum exceeds 256 bits.
pub fn sum_of_squares(reserves: &[Amount]) -> crate::error::Result<U256> {
    reserves.iter().try_fold(U256::ZERO, |acc, x| {
        let v = U256::from(x.get());
        acc.checked_add(v * v)
            .ok_or(AmmError::Overflow("sum of squares overflow"))
    })
}

/// `n·Q − S²`, never negative for real reserve vectors.
///
/// # Errors
///
/// Returns [`AmmError::Underflow`] if `(S, Q)` is not a reserve vector.
pub fn dispersion(sum: u128, sum_sq: U256, n: usize) -> crate::error::Result<U256> {
    let n = U256::from(u128::try_from(n).map_err(|_| AmmError::Overflow("asset count"))?);
    let nq = n
        .checked_mul(sum_sq)
        .ok_or(AmmError::Overflow("n·Q overflow"))?;
    let s = U256::from(sum);
    nq.checked_sub(s * s)
        .ok_or(AmmError::Underflow("n·Q below S²"))
}

/// `v²`, failing when it leaves 256 bits.
pub(crate) fn square(v: I256) -> crate::error::Result<I256> {
    v.checked_mul(v)
        .ok_or(AmmError::Overflow("square exceeds 256 bits"))
}

// ---------------------------------------------------------------------------
// Torus
// ---------------------------------------------------------------------------

/// Consolidated invariant of every tick of a pool.
///
/// Interior ticks merge into one sphere of radius `radius`. Boundary
/// ticks contribute the fixed `boundary_sum` and `boundary_orthogonal`.
/// `offset` absorbs reserves that sit outside the curve (seeded
/// reserves and deposits into boundary ticks) and is re-anchored
/// whenever the other parameters change, so that the current reserves
/// stay on the curve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Torus {
    assets: usize,
    radius: Radius,
    boundary_sum: u128,
    boundary_orthogonal: u128,
    offset: i128,
}

impl Torus {
    /// Empty torus for an `assets`-asset pool.
    #[must_use]
    pub const fn new(assets: usize) -> Self {
        Self {
            assets,
            radius: Radius::ZERO,
            boundary_sum: 0,
            boundary_orthogonal: 0,
            offset: 0,
        }
    }

    /// Number of assets.
    #[must_use]
    pub const fn assets(&self) -> usize {
        self.assets
    }

    /// Interior radius.
    pub const fn radius(&self) -> Radius {
        self.radius
    }

    /// Boundary ticks' contribution to `S`.
    #[must_use]
    pub const fn boundary_sum(&self) -> u128 {
        self.boundary_sum
    }

    /// Boundary ticks' contribution to `Ŵ`.
    #[must_use]
    pub const fn boundary_orthogonal(&self) -> u128 {
        self.boundary_orthogonal
    }

    /// Part of `S` outside the curve.
    #[must_use]
    pub const fn offset(&self) -> i128 {
        self.offset
    }

    /// Replaces the interior radius. Call [`reanchor`](Self::reanchor)
    /// afterwards.
    pub fn set_radius(&mut self, radius: Radius) {
        self.radius = radius;
    }

    /// Replaces the boundary contributions. Call
    /// [`reanchor`](Self::reanchor) afterwards.
    pub fn set_boundary(&mut self, boundary_sum: u128, boundary_orthogonal: u128) {
        self.boundary_sum = boundary_sum;
        self.boundary_orthogonal = boundary_orthogonal;
    }

    /// Shifts `offset` by a uniform deposit (`delta > 0`) or withdrawal.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the offset leaves `i128`.
    pub fn shift_offset(&mut self, delta: i128) -> crate::error::Result<()> {
        self.offset = self
            .offset
            .checked_add(delta)
            .ok_or(AmmError::Overflow("torus offset overflow"))?;
        Ok(())
    }

    /// `c = offset + K_S + r·n`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] on 256-bit overflow.
    pub fn center(&self) -> crate::error::Result<I256> {
        let rn = U256::from(self.radius.get()) * U256::from(self.assets as u128);
        let rn = to_signed(rn)?;
        Ok(I256::from(self.offset) + signed(self.boundary_sum) + rn)
    }

    /// `n·r²`.
    pub(crate) fn radius_term(&self) -> crate::error::Result<I256> {
        let r = U256::from(self.radius.get());
        to_signed(r * r * U256::from(self.assets as u128))
    }

    /// `Ŵ − Ŝ_b` and `Ŵ` at `(sum, sum_sq)`.
    pub(crate) fn orthogonal_gap(&self, sum: u128, sum_sq: U256) -> crate::error::Result<(I256, I256)> {
        let w_hat = to_signed(isqrt(dispersion(sum, sum_sq, self.assets)?))?;
        Ok((w_hat - signed(self.boundary_orthogonal), w_hat))
    }

    /// Invariant residual `(S − c)² + (Ŵ − Ŝ_b)² − n·r²`. Zero on the curve.
    ///
    /// # Errors
    ///
    /// Propagates overflow and invalid `(S, Q)` errors.
    pub fn residual(&self, sum: u128, sum_sq: U256) -> crate::error::Result<I256> {
        let p = signed(sum) - self.center()?;
        let (gap, _) = self.orthogonal_gap(sum, sum_sq)?;
        let total = square(p)?
            .checked_add(square(gap)?)
            .ok_or(AmmError::Overflow("residual exceeds 256 bits"))?;
        Ok(total - self.radius_term()?)
    }

    /// Derivative of [`residual`](Self::residual) along a path with
    /// `dS` and `dQ` per unit step:
    /// `2(S − c)·dS + (Ŵ − Ŝ_b)·(n·dQ − 2S·dS)/Ŵ`.
    ///
    /// Returns `None` where `Ŵ = 0`, at which point the slope is undefined.
    ///
    /// # Errors
    ///
    /// Propagates overflow and invalid `(S, Q)` errors.
    pub fn slope(
        &self,
        sum: u128,
        sum_sq: U256,
        d_sum: I256,
        d_sum_sq: I256,
    ) -> crate::error::Result<Option<I256>> {
        let p = signed(sum) - self.center()?;
        let (gap, w_hat) = self.orthogonal_gap(sum, sum_sq)?;
        if w_hat == I256::ZERO {
            return Ok(None);
        }
        let n = signed(self.assets as u128);
        let d_disp = n * d_sum_sq - I256::new(2) * signed(sum) * d_sum;
        Ok(Some(I256::new(2) * p * d_sum + gap * d_disp / w_hat))
    }

    /// Re-anchors `offset` so that `(sum, sum_sq)` lies on the near branch
    /// of the current torus.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientLiquidity`] if the interior sphere
    /// is too small to reach the current dispersion.
    pub fn reanchor(&mut self, sum: u128, sum_sq: U256) -> crate::error::Result<()> {
        let base = signed(sum) - signed(self.boundary_sum);
        let offset = if self.radius.is_zero() {
            base
        } else {
            let (gap, _) = self.orthogonal_gap(sum, sum_sq)?;
            let disc = self.radius_term()? - square(gap)?;
            if disc < I256::ZERO {
                return Err(AmmError::InsufficientLiquidity);
            }
            let rn = to_signed(U256::from(self.radius.get()) * U256::from(self.assets as u128))?;
            base - rn + isqrt(disc.as_u256()).as_i256()
        };
        if offset > I256::from(i128::MAX) || offset < I256::from(i128::MIN) {
            return Err(AmmError::Overflow("torus offset overflow"));
        }
        self.offset = offset.as_i128();
        Ok(())
    }

    /// Sum of reserves at which the interior sphere reaches `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the target would be negative.
    pub fn target_sum_at_tick(&self, tick: Tick) -> crate::error::Result<u128> {
        let interior = sum_reserves_at_tick(tick, self.radius, self.assets)?;
        let target = signed(interior) + signed(self.boundary_sum) + I256::from(self.offset);
        if target < I256::ZERO {
            return Err(AmmError::Underflow("tick target below zero"));
        }
        narrow(target.as_u256(), "tick target exceeds u128")
    }

    /// Normalized projection `k^norm` of the interior sphere at `sum`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientLiquidity`] when the radius is zero.
    pub fn interior_knorm(&self, sum: u128) -> crate::error::Result<u128> {
        if self.radius.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let interior = signed(sum) - signed(self.boundary_sum) - I256::from(self.offset);
        if interior <= I256::ZERO {
            return Ok(0);
        }
        let denom = U256::from(sqrt_n_wad(self.assets)?) * U256::from(self.radius.get());
        let knorm = mul_div_wide(interior.as_u256(), wad_squared(), denom, Rounding::Down)?;
        narrow(knorm, "interior knorm exceeds u128")
    }

    /// Partial derivative of the invariant along one reserve `x` at
    /// `(sum, sum_sq)`, up to a common positive factor:
    /// `(S − c) + (Ŵ − Ŝ_b)(n·x − S)/Ŵ`.
    ///
    /// # Errors
    ///
    /// Propagates overflow and invalid `(S, Q)` errors.
    pub fn gradient(&self, sum: u128, sum_sq: U256, x: u128) -> crate::error::Result<I256> {
        let p = signed(sum) - self.center()?;
        let (gap, w_hat) = self.orthogonal_gap(sum, sum_sq)?;
        if w_hat == I256::ZERO {
            return Ok(p);
        }
        let spread = signed(self.assets as u128) * signed(x) - signed(sum);
        let tilt = gap
            .checked_mul(spread)
            .ok_or(AmmError::Overflow("gradient overflow"))?;
        Ok(p + tilt / w_hat)
    }

    /// Marginal price of `base` in units of `quote`, in WAD.
    ///
    /// Ratio of the invariant's partial derivatives,
    /// `∂F/∂x_base / ∂F/∂x_quote`, with
    /// `∂F/∂xᵢ ∝ (S − c) + (Ŵ − Ŝ_b)(n·xᵢ − S)/Ŵ`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] for an index outside `reserves`.
    /// - [`AmmError::InsufficientLiquidity`] when the radius is zero.
    pub fn spot_price(&self, reserves: &[Amount], base: usize, quote: usize) -> crate::error::Result<u128> {
        if base >= reserves.len() || quote >= reserves.len() {
            return Err(AmmError::InvalidToken("asset index out of range"));
        }
        if self.radius.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let sum = sum_of(reserves)?;
        let sum_sq = sum_of_squares(reserves)?;
        let g_base = self.gradient(sum, sum_sq, reserves[base].get())?;
        let g_quote = self.gradient(sum, sum_sq, reserves[quote].get())?;
        if g_quote == I256::ZERO {
            return Err(AmmError::DivisionByZero);
        }
        let price = g_base * signed(WAD) / g_quote;
        if price < I256::ZERO {
            return Err(AmmError::InsufficientLiquidity);
        }
        narrow(price.as_u256(), "spot price exceeds u128")
    }
}
