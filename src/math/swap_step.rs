//! Single-range swap solver.
//!
//! A pairwise swap moves two reserves (`in` up, `out` down) and holds the
//! rest fixed, so the new state is determined by the new `(S, Q)`. Inside
//! one tick range the torus parameters are fixed and the step either
//!
//! 1. lands exactly on the range's target `S` (closed form, see
//!    [`amount_to_reach_sum`]),
//! 2. stops at the parity point `x_in = x_out` when moving toward the
//!    equal-price point, where `S` turns around, or
//! 3. spends the whole remaining input, solving for the output with
//!    Newton-Raphson.
//!
//! Newton runs at most [`MAX_NEWTON_ITERATIONS`] times and stops once the
//! iterate moves by at most one unit. A step that runs out of iterations
//! reports `converged == false` together with its best estimate.

use ethnum::{I256, U256};
use tracing::trace;

use super::orbital::{square, Torus};
use super::wide::{div_wide, isqrt, signed, sqrt_rounded, to_signed};
use crate::domain::Rounding;
use crate::error::AmmError;

/// Iteration budget of every Newton-Raphson solve.
pub const MAX_NEWTON_ITERATIONS: u32 = 64;

/// `(S, Q)` at a point of a one-parameter path, with their derivatives
/// per unit of the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint {
    /// Sum of reserves.
    pub sum: u128,
    /// Sum of squared reserves.
    pub sum_sq: U256,
    /// `dS` per unit step.
    pub d_sum: I256,
    /// `dQ` per unit step.
    pub d_sum_sq: I256,
}

/// Result of a bounded Newton-Raphson solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewtonOutcome {
    /// Smaller of the last two iterates.
    pub low: u128,
    /// Larger of the last two iterates.
    pub high: u128,
    /// Whether the iterates settled within one unit.
    pub converged: bool,
    /// Iterations used.
    pub iterations: u32,
}

/// Solves `residual(path(x)) = 0` for `x ∈ [lo, hi]` starting at `start`.
///
/// # Errors
///
/// - [`AmmError::InsufficientLiquidity`] if the root lies outside
///   `[lo, hi]`, that is Newton settles on a clamped bound.
/// - Errors returned by `path` or the torus evaluation.
pub fn newton<F>(torus: &Torus, start: u128, lo: u128, hi: u128, path: F) -> crate::error::Result<NewtonOutcome>
where
    F: Fn(u128) -> crate::error::Result<PathPoint>,
{
    let (lo_s, hi_s) = (signed(lo), signed(hi));
    let mut x = start.clamp(lo, hi);
    let mut prev = x;
    for iteration in 1..=MAX_NEWTON_ITERATIONS {
        let point = path(x)?;
        let residual = torus.residual(point.sum, point.sum_sq)?;
        let slope = torus.slope(point.sum, point.sum_sq, point.d_sum, point.d_sum_sq)?;
        let Some(slope) = slope.filter(|s| *s != I256::ZERO) else {
            // flat or degenerate spot, step off it
            prev = x;
            x = if x < hi { x + 1 } else { x.saturating_sub(1).max(lo) };
            continue;
        };
        let raw = signed(x) - residual / slope;
        let next_s = raw.clamp(lo_s, hi_s);
        let next = next_s.as_u256().as_u128();
        trace!(iteration, x, next, "newton iterate");
        if x.abs_diff(next) <= 1 {
            if raw != next_s {
                return Err(AmmError::InsufficientLiquidity);
            }
            return Ok(NewtonOutcome {
                low: x.min(next),
                high: x.max(next),
                converged: true,
                iterations: iteration,
            });
        }
        prev = x;
        x = next;
    }
    Ok(NewtonOutcome {
        low: prev.min(x),
        high: prev.max(x),
        converged: false,
        iterations: MAX_NEWTON_ITERATIONS,
    })
}

/// Inputs of one swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStepInput {
    /// Current sum of reserves.
    pub sum: u128,
    /// Current sum of squared reserves.
    pub sum_sq: U256,
    /// Reserve of the asset paid in.
    pub balance_in: u128,
    /// Reserve of the asset paid out.
    pub balance_out: u128,
    /// Input left to spend, fee already deducted.
    pub amount_remaining: u128,
    /// `S` the step must not pass.
    pub target_sum: u128,
}

impl SwapStepInput {
    /// `true` when `x_in < x_out`, so `S` falls as input is added.
    #[must_use]
    pub const fn is_toward(&self) -> bool {
        self.balance_in < self.balance_out
    }

    fn rest(&self) -> crate::error::Result<(u128, U256)> {
        let bi = U256::from(self.balance_in);
        let bo = U256::from(self.balance_out);
        let s_rest = self
            .sum
            .checked_sub(self.balance_in)
            .and_then(|s| s.checked_sub(self.balance_out))
            .ok_or(AmmError::Underflow("pair exceeds sum of reserves"))?;
        let q_rest = self
            .sum_sq
            .checked_sub(bi * bi + bo * bo)
            .ok_or(AmmError::Underflow("pair exceeds sum of squares"))?;
        Ok((s_rest, q_rest))
    }
}

/// Outcome of one swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// Input consumed by the curve, fee excluded.
    pub amount_in: u128,
    /// Output released.
    pub amount_out: u128,
    /// Sum of reserves after the step.
    pub sum_next: u128,
    /// Sum of squared reserves after the step.
    pub sum_sq_next: U256,
    /// The step landed exactly on `target_sum`.
    pub reached_target: bool,
    /// The step stopped at `x_in = x_out`.
    pub at_parity: bool,
    /// The solver converged.
    pub converged: bool,
    /// Newton iterations used, zero for closed-form steps.
    pub iterations: u32,
}

/// Input and output that move the pair so that `S` lands exactly on
/// `target`, or `None` if no such trade exists in the current direction.
///
/// Fixing `S` pins `Ŵ` through the torus, hence `Q`. The two unknown
/// reserves then satisfy `x_in + x_out = P` and `x_in² + x_out² = T`,
/// a quadratic with roots `(P ± √(2T − P²)) / 2`. Moving away from the
/// equal-price point takes the larger root for `x_in`, moving toward it
/// the smaller. Input rounds up.
///
/// # Errors
///
/// Propagates overflow and invalid `(S, Q)` errors.
pub fn amount_to_reach_sum(
    torus: &Torus,
    input: &SwapStepInput,
    target: u128,
) -> crate::error::Result<Option<(u128, u128)>> {
    let n = torus.assets() as u128;
    let p_t = signed(target) - torus.center()?;
    let w_disc = torus.radius_term()? - square(p_t)?;
    if w_disc < I256::ZERO {
        return Ok(None);
    }
    let (gap, _) = torus.orthogonal_gap(input.sum, input.sum_sq)?;
    let root = isqrt(w_disc.as_u256()).as_i256();
    let w_star = if gap >= I256::ZERO {
        signed(torus.boundary_orthogonal()) + root
    } else {
        signed(torus.boundary_orthogonal()) - root
    };
    if w_star < I256::ZERO {
        return Ok(None);
    }

    let (s_rest, q_rest) = input.rest()?;
    let Some(pair_sum) = target.checked_sub(s_rest) else {
        return Ok(None);
    };
    // n·(2T − P²) with n·T = Ŵ*² + target² − n·Q_rest
    let p = signed(pair_sum);
    let n_s = signed(n);
    let nq_star = square(w_star)?
        .checked_add(square(signed(target))?)
        .ok_or(AmmError::Overflow("target sum of squares overflow"))?;
    let n_disc = I256::new(2) * (nq_star - n_s * to_signed(q_rest)?) - n_s * square(p)?;
    if n_disc < I256::ZERO {
        return Ok(None);
    }

    let away = !input.is_toward();
    let x_in = if away {
        let disc = div_wide(n_disc.as_u256(), U256::from(n), Rounding::Up)?;
        let root = sqrt_rounded(disc, Rounding::Up);
        div_wide(U256::from(pair_sum) + root, U256::new(2), Rounding::Up)?
    } else {
        let disc = div_wide(n_disc.as_u256(), U256::from(n), Rounding::Down)?;
        let root = sqrt_rounded(disc, Rounding::Down);
        let Some(low) = U256::from(pair_sum).checked_sub(root) else {
            return Ok(None);
        };
        let x_in = div_wide(low, U256::new(2), Rounding::Up)?;
        // past parity the smaller root belongs to the other reserve
        if x_in > U256::from(pair_sum) - x_in {
            return Ok(None);
        }
        x_in
    };
    let Some(amount_in) = x_in.checked_sub(U256::from(input.balance_in)) else {
        return Ok(None);
    };
    let amount_in = to_signed(amount_in)?;
    let amount_out = signed(input.sum) + amount_in - signed(target);
    if amount_out < I256::ZERO || amount_out >= signed(input.balance_out) {
        return Ok(None);
    }
    Ok(Some((
        amount_in.as_u256().as_u128(),
        amount_out.as_u256().as_u128(),
    )))
}

/// Solves one swap step inside a single tick range.
///
/// The step never ends past the input asset's zero-price point. Beyond
/// it the sphere pays less output for more input, so such a step is
/// rejected instead.
///
/// # Errors
///
/// - [`AmmError::InsufficientLiquidity`] if the range cannot absorb the
///   input at any output, or only past the zero-price point.
/// - Propagates overflow and invalid `(S, Q)` errors.
pub fn compute_swap_step(torus: &Torus, input: &SwapStepInput) -> crate::error::Result<SwapStep> {
    let step = solve_step(torus, input)?;
    let x_in = input.balance_in + step.amount_in;
    let x_out = input.balance_out - step.amount_out;
    let g_in = torus.gradient(step.sum_next, step.sum_sq_next, x_in)?;
    let g_out = torus.gradient(step.sum_next, step.sum_sq_next, x_out)?;
    let opposed = (g_in > I256::ZERO && g_out < I256::ZERO) || (g_in < I256::ZERO && g_out > I256::ZERO);
    if opposed {
        trace!(amount_in = step.amount_in, amount_out = step.amount_out, "step past zero price");
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(step)
}

fn solve_step(torus: &Torus, input: &SwapStepInput) -> crate::error::Result<SwapStep> {
    let (s_rest, q_rest) = input.rest()?;
    let (b_in, b_out) = (input.balance_in, input.balance_out);
    let reach = amount_to_reach_sum(torus, input, input.target_sum)?;

    let land = |amount_in: u128, amount_out: u128, converged: bool, iterations: u32| {
        let x_in = U256::from(b_in + amount_in);
        let x_out = U256::from(b_out - amount_out);
        SwapStep {
            amount_in,
            amount_out,
            sum_next: input.target_sum,
            sum_sq_next: q_rest + x_in * x_in + x_out * x_out,
            reached_target: true,
            at_parity: false,
            converged,
            iterations,
        }
    };

    if let Some((amount_in, amount_out)) = reach {
        if amount_in <= input.amount_remaining {
            return Ok(land(amount_in, amount_out, true, 0));
        }
    }

    if input.is_toward() {
        let parity = newton(torus, b_in + (b_out - b_in) / 2, b_in, b_out, |m| {
            let m_w = U256::from(m);
            Ok(PathPoint {
                sum: s_rest + 2 * m,
                sum_sq: q_rest + U256::new(2) * m_w * m_w,
                d_sum: I256::new(2),
                d_sum_sq: I256::new(4) * signed(m),
            })
        })?;
        let m = parity.high;
        if m - b_in <= input.amount_remaining {
            let m_w = U256::from(m);
            return Ok(SwapStep {
                amount_in: m - b_in,
                amount_out: b_out - m,
                sum_next: s_rest + 2 * m,
                sum_sq_next: q_rest + U256::new(2) * m_w * m_w,
                reached_target: false,
                at_parity: true,
                converged: parity.converged,
                iterations: parity.iterations,
            });
        }
    }

    let amount_in = input.amount_remaining;
    let x_in = U256::from(
        b_in.checked_add(amount_in)
            .ok_or(AmmError::Overflow("input reserve overflow"))?,
    );
    let q_fixed = q_rest + x_in * x_in;
    let sum_in = input
        .sum
        .checked_add(amount_in)
        .ok_or(AmmError::Overflow("sum of reserves overflow"))?;
    let solved = newton(torus, amount_in, 0, b_out - 1, |delta| {
        let x_out = b_out - delta;
        let x_out_w = U256::from(x_out);
        Ok(PathPoint {
            sum: sum_in - delta,
            sum_sq: q_fixed + x_out_w * x_out_w,
            d_sum: I256::new(-1),
            d_sum_sq: I256::new(-2) * signed(x_out),
        })
    })?;
    let amount_out = solved.low;
    let sum_next = sum_in - amount_out;

    let overshoot = if input.is_toward() {
        sum_next < input.target_sum
    } else {
        sum_next > input.target_sum
    };
    if overshoot {
        if let Some((reach_in, _)) = reach {
            let capped = reach_in.min(amount_in);
            let out = (input.sum + capped).saturating_sub(input.target_sum);
            return Ok(land(capped, out, solved.converged, solved.iterations));
        }
    }

    let x_out = U256::from(b_out - amount_out);
    Ok(SwapStep {
        amount_in,
        amount_out,
        sum_next,
        sum_sq_next: q_fixed + x_out * x_out,
        reached_target: false,
        at_parity: false,
        converged: solved.converged,
        iterations: solved.iterations,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Amount, Radius};
    use crate::math::orbital::{sum_of, sum_of_squares};
    use crate::math::wide::WAD;

    const E18: u128 = WAD;

    /// Four-asset pool: 1000e18 seeded per asset plus radius 1000e18 at
    /// the equal-price point.
    fn pool_torus() -> (Torus, Vec<Amount>) {
        let mut torus = Torus::new(4);
        torus.set_radius(Radius::new(1_000 * E18));
        let reserves = vec![Amount::new(1_500 * E18); 4];
        let (Ok(s), Ok(q)) = (sum_of(&reserves), sum_of_squares(&reserves)) else {
            panic!("expected Ok");
        };
        let Ok(()) = torus.reanchor(s, q) else {
            panic!("expected Ok");
        };
        (torus, reserves)
    }

    fn input(reserves: &[Amount], i: usize, o: usize, amount: u128, target: u128) -> SwapStepInput {
        let (Ok(sum), Ok(sum_sq)) = (sum_of(reserves), sum_of_squares(reserves)) else {
            panic!("expected Ok");
        };
        SwapStepInput {
            sum,
            sum_sq,
            balance_in: reserves[i].get(),
            balance_out: reserves[o].get(),
            amount_remaining: amount,
            target_sum: target,
        }
    }

    fn apply(reserves: &mut [Amount], i: usize, o: usize, step: &SwapStep) {
        reserves[i] = Amount::new(reserves[i].get() + step.amount_in);
        reserves[o] = Amount::new(reserves[o].get() - step.amount_out);
    }

    // -- Newton within a range ----------------------------------------------

    #[test]
    fn small_swap_stays_on_curve() {
        let (torus, mut reserves) = pool_torus();
        let step_in = input(&reserves, 0, 1, 10 * E18, 7_000 * E18);
        let Ok(step) = compute_swap_step(&torus, &step_in) else {
            panic!("expected Ok");
        };
        assert!(step.converged);
        assert!(!step.reached_target && !step.at_parity);
        assert_eq!(step.amount_in, 10 * E18);
        // away from the equal-price point the output is worth less
        assert!(step.amount_out < step.amount_in && step.amount_out > 9 * E18);
        assert_eq!(step.sum_next, step_in.sum + step.amount_in - step.amount_out);
        apply(&mut reserves, 0, 1, &step);
        let (Ok(s), Ok(q)) = (sum_of(&reserves), sum_of_squares(&reserves)) else {
            panic!("expected Ok");
        };
        assert_eq!((s, q), (step.sum_next, step.sum_sq_next));
        let Ok(residual) = torus.residual(s, q) else {
            panic!("expected Ok");
        };
        // within a few units of slope (≈ 4e21 per unit of output)
        assert!(residual.unsigned_abs() < U256::from(20_000 * E18));
    }

    #[test]
    fn newton_reports_iterations() {
        let (torus, reserves) = pool_torus();
        let Ok(step) = compute_swap_step(&torus, &input(&reserves, 2, 3, E18, 7_000 * E18)) else {
            panic!("expected Ok");
        };
        assert!(step.iterations >= 1 && step.iterations <= MAX_NEWTON_ITERATIONS);
    }

    // -- Closed-form landing ------------------------------------------------

    #[test]
    fn reaching_target_lands_exactly() {
        let (torus, reserves) = pool_torus();
        let target = 6_050 * E18;
        let step_in = input(&reserves, 0, 1, 1_000 * E18, target);
        let Ok(step) = compute_swap_step(&torus, &step_in) else {
            panic!("expected Ok");
        };
        assert!(step.reached_target);
        assert_eq!(step.sum_next, target);
        assert!(step.amount_in < 1_000 * E18);
        assert_eq!(step.amount_in - step.amount_out, 50 * E18);
    }

    #[test]
    fn reach_amount_matches_newton() {
        let (torus, reserves) = pool_torus();
        let target = 6_050 * E18;
        let Ok(Some((amount_in, _))) = amount_to_reach_sum(&torus, &input(&reserves, 0, 1, 0, target), target)
        else {
            panic!("expected reachable target");
        };
        // spending one unit less must stop short of the target
        let Ok(short) = compute_swap_step(&torus, &input(&reserves, 0, 1, amount_in - 1, target)) else {
            panic!("expected Ok");
        };
        assert!(!short.reached_target);
        assert!(short.sum_next <= target);
        assert!(target - short.sum_next < E18);
    }

    #[test]
    fn far_target_reports_overflow() {
        let mut torus = Torus::new(2);
        let Ok(()) = torus.shift_offset(i128::MIN) else {
            panic!("expected Ok");
        };
        let reserves = vec![Amount::new(1 << 126); 2];
        let step_in = input(&reserves, 0, 1, E18, 1 << 127);
        assert_eq!(
            amount_to_reach_sum(&torus, &step_in, 1 << 127),
            Err(AmmError::Overflow("square exceeds 256 bits"))
        );
    }

    #[test]
    fn unreachable_target_is_none() {
        let (torus, reserves) = pool_torus();
        // far beyond the sphere
        let target = 20_000 * E18;
        assert_eq!(amount_to_reach_sum(&torus, &input(&reserves, 0, 1, 0, target), target), Ok(None));
    }

    // -- Toward the equal-price point ---------------------------------------

    #[test]
    fn toward_step_stops_at_parity() {
        let (torus, mut reserves) = pool_torus();
        let Ok(away) = compute_swap_step(&torus, &input(&reserves, 0, 1, 20 * E18, 7_000 * E18)) else {
            panic!("expected Ok");
        };
        apply(&mut reserves, 0, 1, &away);
        // pay back far more than needed to restore balance
        let back = input(&reserves, 1, 0, 100 * E18, 0);
        assert!(back.is_toward());
        let Ok(step) = compute_swap_step(&torus, &back) else {
            panic!("expected Ok");
        };
        assert!(step.at_parity);
        apply(&mut reserves, 1, 0, &step);
        assert_eq!(reserves[0], reserves[1]);
        assert!(step.amount_in < 100 * E18);
        // buying back the scarce asset costs less than it returns
        assert!(step.amount_in < step.amount_out);
    }

    #[test]
    fn toward_step_within_parity_uses_newton() {
        let (torus, mut reserves) = pool_torus();
        let Ok(away) = compute_swap_step(&torus, &input(&reserves, 0, 1, 20 * E18, 7_000 * E18)) else {
            panic!("expected Ok");
        };
        apply(&mut reserves, 0, 1, &away);
        let back = input(&reserves, 1, 0, E18, 0);
        let Ok(step) = compute_swap_step(&torus, &back) else {
            panic!("expected Ok");
        };
        assert!(!step.at_parity && !step.reached_target && step.converged);
        assert!(step.sum_next < back.sum);
        assert!(step.amount_out > E18);
    }

    // -- Zero-price capacity ------------------------------------------------

    #[test]
    fn input_past_zero_price_is_rejected() {
        let (torus, reserves) = pool_torus();
        // output peaks near 207.1e18 at 500e18 in, then falls
        let Ok(near_peak) = compute_swap_step(&torus, &input(&reserves, 0, 1, 490 * E18, 7_000 * E18)) else {
            panic!("expected Ok");
        };
        assert!(near_peak.amount_out > 207 * E18 && near_peak.amount_out < 208 * E18);
        for amount in [600 * E18, 700 * E18, 900 * E18] {
            assert_eq!(
                compute_swap_step(&torus, &input(&reserves, 0, 1, amount, 7_000 * E18)),
                Err(AmmError::InsufficientLiquidity),
                "amount {amount}"
            );
        }
    }

    #[test]
    fn output_grows_with_input_below_capacity() {
        let (torus, reserves) = pool_torus();
        let mut last = 0;
        for amount in [100 * E18, 200 * E18, 300 * E18, 400 * E18, 490 * E18] {
            let Ok(step) = compute_swap_step(&torus, &input(&reserves, 0, 1, amount, 7_000 * E18)) else {
                panic!("expected Ok for {amount}");
            };
            assert!(step.amount_out > last);
            last = step.amount_out;
        }
    }
}
