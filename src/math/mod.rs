//! Arithmetic for the orbital invariant.
//!
//! This module provides [`CheckedArithmetic`] for overflow-safe domain
//! arithmetic, `Rounding`-aware division and square roots over 256-bit
//! intermediates, tick math, the consolidated [`Torus`] invariant and the
//! single-range swap solver.
//!
//! Every rounding decision favors the pool: amounts paid in round up,
//! amounts paid out round down.

mod checked;
mod orbital;
mod rounding;
mod swap_step;
mod tick_math;
mod wide;

pub use checked::CheckedArithmetic;
pub use orbital::{
    amount_per_token, dispersion, orthogonal_at_tick, projection, radius_for_amount, sum_of,
    sum_of_squares, sum_reserves_at_tick, Torus,
};
pub use rounding::div_round;
pub use swap_step::{
    amount_to_reach_sum, compute_swap_step, newton, NewtonOutcome, PathPoint, SwapStep,
    SwapStepInput, MAX_NEWTON_ITERATIONS,
};
pub use tick_math::{knorm_at_tick, knorm_bounds, sqrt_n_wad, tick_at_knorm, tick_bounds, BASE_WAD};
pub use wide::{div_wide, isqrt, mul_div, mul_div_wide, narrow, signed, sqrt_rounded, to_signed, wad_squared, WAD};
