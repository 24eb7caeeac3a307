//! N-asset orbital pool.
//!
//! Liquidity sits on nested spherical ticks around the equal-price point.
//! Interior ticks consolidate into one sphere and boundary ticks into a
//! fixed orthogonal contribution, giving the torus invariant evaluated by
//! [`Torus`].
//!
//! # Swap Algorithm
//!
//! 1. Resynchronize `S` and `Q` from the reserves.
//! 2. While input remains and the caller's sum limit is not reached:
//!    a. find the next initialized tick in the direction of travel,
//!    b. take the `S` at that tick as the step target, capped by the limit,
//!    c. deduct the fee from the remaining input,
//!    d. solve the step with [`compute_swap_step`],
//!    e. charge the fee and update fee growth, reserves, `S` and `Q`,
//!    f. on reaching a tick, cross it, adjust the radius and re-anchor.
//! 3. Settle the current tick from the interior projection.
//!
//! # Balances and Reserves
//!
//! `reserves` are the curve coordinates. `balances` are the tokens the
//! pool holds: reserves plus uncollected fees, protocol fees and burned
//! principal awaiting collection.
//!
//! # Atomicity
//!
//! Every mutating entry point runs on the live pool after taking a
//! snapshot and restores the snapshot on error, so a failed operation
//! leaves no trace.

use ethnum::{I256, U256};
use tracing::{debug, info, warn};

use crate::config::OrbitalConfig;
use crate::domain::{Address, Amount, BasisPoints, FeeTier, Radius, Rounding, SwapParams, SwapResult, Tick, Token};
use crate::error::AmmError;
use crate::ledger::{PositionInfo, PositionLedger, TickBitmap, TickInfo, TickLedger};
use crate::math::{
    amount_per_token, compute_swap_step, div_wide, narrow, orthogonal_at_tick, signed, sum_of, sum_of_squares,
    sum_reserves_at_tick, tick_at_knorm, tick_bounds, CheckedArithmetic, SwapStepInput, Torus,
};
use crate::traits::{FlashCallback, FromConfig, Funds, LiquidityPool, MintCallback, SwapCallback, SwapPool};

/// Upper bound on swap loop iterations.
pub const MAX_SWAP_STEPS: u32 = 1_000;

/// An orbital pool of `n` interchangeable assets.
///
/// Created from an [`OrbitalConfig`] via [`FromConfig`] and seeded once
/// with [`initialize`](Self::initialize).
///
/// # State
///
/// - `reserves`, `sum`, `sum_sq`: the reserve vector and its aggregates.
/// - `torus`: consolidated invariant parameters.
/// - `current_tick`: ticks above it are interior, ticks at or below it
///   are boundary.
/// - `fee_growth_global`: per-asset fees per unit radius (Q128).
/// - `ticks`, `bitmap`, `positions`: liquidity ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbitalPool {
    tokens: Vec<Token>,
    fee_tier: FeeTier,
    protocol_fee: BasisPoints,
    tick_spacing: u32,
    window: (Tick, Tick),
    initialized: bool,
    reserves: Vec<Amount>,
    balances: Vec<Amount>,
    sum: u128,
    sum_sq: U256,
    torus: Torus,
    current_tick: Tick,
    fee_growth_global: Vec<u128>,
    protocol_fees: Vec<Amount>,
    ticks: TickLedger,
    bitmap: TickBitmap,
    positions: PositionLedger,
    flash_active: bool,
}

impl OrbitalPool {
    /// Seeds the pool with `sum` split evenly across assets and sets the
    /// current tick.
    ///
    /// The remainder of the split goes to the lowest indices one unit
    /// each. Seeded tokens count as pool balances.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyInitialized`] on a second call.
    /// - [`AmmError::InvalidQuantity`] if `sum` cannot give every asset a
    ///   positive reserve.
    /// - [`AmmError::InvalidTick`] if `tick` is neither inside the tick
    ///   window nor the tick just below it.
    pub fn initialize(&mut self, sum: u128, tick: Tick) -> crate::error::Result<()> {
        if self.initialized {
            return Err(AmmError::AlreadyInitialized);
        }
        let floor = self
            .window
            .0
            .checked_sub(1)
            .ok_or(AmmError::InvalidTick("tick below range"))?;
        if tick < floor || tick > self.window.1 {
            return Err(AmmError::InvalidTick("initial tick outside the pool's boundary window"));
        }
        self.atomically(|pool| {
            let n = pool.assets() as u128;
            if sum < n {
                return Err(AmmError::InvalidQuantity("initial sum must fund every asset"));
            }
            let (each, extra) = (sum / n, sum % n);
            pool.reserves = (0..n).map(|i| Amount::new(each + u128::from(i < extra))).collect();
            pool.balances = pool.reserves.clone();
            pool.resync()?;
            pool.current_tick = tick;
            pool.torus.reanchor(pool.sum, pool.sum_sq)?;
            pool.initialized = true;
            info!(sum, tick = tick.get(), assets = pool.assets(), "pool initialized");
            Ok(())
        })
    }

    /// Lends `amounts` to `callback`, which must return them plus fees.
    ///
    /// The fee is `ceil(amount · fee_pips / 1e6)` per asset. What is
    /// paid beyond the principal is distributed like a swap fee. Returns
    /// the fees actually paid.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Reentrancy`] when called from inside a flash callback.
    /// - [`AmmError::InvalidQuantity`] without one amount per asset.
    /// - [`AmmError::InsufficientLiquidity`] if the pool holds too little.
    /// - [`AmmError::InsufficientPayment`] if a balance is not restored.
    pub fn flash(&mut self, amounts: &[Amount], callback: &mut dyn FlashCallback) -> crate::error::Result<Vec<Amount>> {
        if self.flash_active {
            return Err(AmmError::Reentrancy("flash loan already in progress"));
        }
        self.atomically(|pool| {
            pool.require_initialized()?;
            if amounts.len() != pool.assets() {
                return Err(AmmError::InvalidQuantity("one flash amount per asset"));
            }
            let fees = amounts
                .iter()
                .map(|a| pool.fee_tier.apply_to_amount(*a, Rounding::Up))
                .collect::<crate::error::Result<Vec<_>>>()?;
            let before = pool.balances.clone();
            for (balance, amount) in pool.balances.iter_mut().zip(amounts) {
                *balance = balance
                    .checked_sub(amount)
                    .ok_or(AmmError::InsufficientLiquidity)?;
            }

            pool.flash_active = true;
            let outcome = callback.on_flash(pool, &fees);
            pool.flash_active = false;
            outcome?;

            let mut paid = Vec::with_capacity(fees.len());
            for (asset, ((now, was), (amount, fee))) in
                pool.balances.iter().zip(&before).zip(amounts.iter().zip(&fees)).enumerate()
            {
                let required = was.safe_add(fee)?;
                if now < &required {
                    let received = now.get().saturating_sub(was.get().saturating_sub(amount.get()));
                    let required = amount.get().saturating_add(fee.get());
                    warn!(asset, required, received, "flash loan not repaid");
                    return Err(AmmError::InsufficientPayment {
                        asset,
                        required,
                        received,
                    });
                }
                paid.push(now.safe_sub(was)?);
            }
            for (asset, fee) in paid.iter().enumerate() {
                pool.distribute_fee(asset, *fee)?;
            }
            info!(assets = pool.assets(), "flash loan repaid");
            Ok(paid)
        })
    }

    /// Credits an external transfer of `amount` of `asset` to the pool.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] for an unknown asset.
    /// - [`AmmError::Overflow`] if the balance overflows.
    pub fn receive(&mut self, asset: usize, amount: Amount) -> crate::error::Result<()> {
        Funds::new(&mut self.balances).pay(asset, amount)
    }

    /// Pays out and clears the accrued protocol fees.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if balances do not cover them,
    /// which indicates corrupted accounting.
    pub fn collect_protocol(&mut self) -> crate::error::Result<Vec<Amount>> {
        self.atomically(|pool| {
            let n = pool.assets();
            let owed = core::mem::replace(&mut pool.protocol_fees, vec![Amount::ZERO; n]);
            for (balance, amount) in pool.balances.iter_mut().zip(&owed) {
                *balance = balance.safe_sub(amount)?;
            }
            info!(assets = owed.len(), "protocol fees collected");
            Ok(owed)
        })
    }

    // -- Accessors ----------------------------------------------------------

    /// Number of assets.
    #[must_use]
    pub fn assets(&self) -> usize {
        self.tokens.len()
    }

    /// `true` once [`initialize`](Self::initialize) succeeded.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sum of reserves `S`.
    #[must_use]
    pub const fn sum(&self) -> u128 {
        self.sum
    }

    /// Sum of squared reserves `Q`.
    #[must_use]
    pub const fn sum_of_squares(&self) -> U256 {
        self.sum_sq
    }

    /// Current tick.
    #[must_use]
    pub const fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Inclusive window of ticks positions may use.
    #[must_use]
    pub const fn tick_window(&self) -> (Tick, Tick) {
        self.window
    }

    /// Tick spacing.
    #[must_use]
    pub const fn tick_spacing(&self) -> u32 {
        self.tick_spacing
    }

    /// Consolidated invariant parameters.
    #[must_use]
    pub const fn torus(&self) -> &Torus {
        &self.torus
    }

    /// Curve reserves.
    #[must_use]
    pub fn reserves(&self) -> &[Amount] {
        &self.reserves
    }

    /// Token balances held by the pool.
    #[must_use]
    pub fn balances(&self) -> &[Amount] {
        &self.balances
    }

    /// Per-asset fee growth per unit radius (Q128).
    #[must_use]
    pub fn fee_growth_global(&self) -> &[u128] {
        &self.fee_growth_global
    }

    /// Uncollected protocol fees.
    #[must_use]
    pub fn protocol_fees(&self) -> &[Amount] {
        &self.protocol_fees
    }

    /// Ledger record of `tick`.
    #[must_use]
    pub fn tick(&self, tick: Tick) -> Option<&TickInfo> {
        self.ticks.get(tick)
    }

    /// Position of `owner` at `tick`.
    #[must_use]
    pub fn position(&self, owner: Address, tick: Tick) -> Option<&PositionInfo> {
        self.positions.get(owner, tick)
    }

    /// All positions.
    #[must_use]
    pub const fn positions(&self) -> &PositionLedger {
        &self.positions
    }

    /// Fee growth a position at `tick` has earned so far.
    #[must_use]
    pub fn fee_growth_inside(&self, tick: Tick) -> Vec<u128> {
        self.ticks
            .fee_growth_inside(tick, self.current_tick, &self.fee_growth_global)
    }

    /// `true` if `S` and `Q` match the reserves, every reserve is
    /// positive and the balances cover the reserves.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let aggregates = sum_of(&self.reserves) == Ok(self.sum) && sum_of_squares(&self.reserves) == Ok(self.sum_sq);
        let positive = self.reserves.iter().all(|x| !x.is_zero());
        let solvent = self.balances.iter().zip(&self.reserves).all(|(b, x)| b >= x);
        aggregates && positive && solvent
    }

    // -- Internals ----------------------------------------------------------

    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> crate::error::Result<T>,
    ) -> crate::error::Result<T> {
        let snapshot = self.clone();
        let outcome = op(self);
        if outcome.is_err() {
            *self = snapshot;
        }
        outcome
    }

    fn require_initialized(&self) -> crate::error::Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(AmmError::NotInitialized)
        }
    }

    fn resync(&mut self) -> crate::error::Result<()> {
        self.sum = sum_of(&self.reserves)?;
        self.sum_sq = sum_of_squares(&self.reserves)?;
        Ok(())
    }

    fn validate_tick(&self, tick: Tick) -> crate::error::Result<()> {
        if !tick.is_aligned(self.tick_spacing) {
            return Err(AmmError::InvalidTick("tick not aligned to spacing"));
        }
        if tick < self.window.0 || tick > self.window.1 {
            return Err(AmmError::InvalidTick("tick outside the pool's boundary window"));
        }
        Ok(())
    }

    fn is_interior(&self, tick: Tick) -> bool {
        self.current_tick < tick
    }

    /// `n · amount` as a signed offset shift.
    fn uniform_shift(&self, amount: Amount) -> crate::error::Result<i128> {
        amount
            .to_signed()
            .and_then(|a| a.checked_mul(self.assets() as i128))
            .ok_or(AmmError::Overflow("uniform deposit exceeds i128"))
    }

    /// Smallest initialized tick strictly above `from`.
    fn next_tick_above(&self, from: Tick) -> Option<Tick> {
        let mut cursor = from.get();
        while cursor < self.window.1.get() {
            let (next, found) = self
                .bitmap
                .next_initialized_tick_within_one_word(cursor, self.tick_spacing, false);
            if found {
                return Tick::new(next).ok();
            }
            cursor = next;
        }
        None
    }

    /// Largest initialized tick at or below `from`.
    fn next_tick_at_or_below(&self, from: Tick) -> Option<Tick> {
        let mut cursor = from.get();
        while cursor >= self.window.0.get() {
            let (next, found) = self
                .bitmap
                .next_initialized_tick_within_one_word(cursor, self.tick_spacing, true);
            if found {
                return Tick::new(next).ok();
            }
            cursor = next - 1;
        }
        None
    }

    /// Recomputes the boundary contributions from the ticks at or below
    /// the current tick.
    fn refresh_boundary(&mut self) -> crate::error::Result<()> {
        let n = self.assets();
        let current = self.current_tick;
        let mut boundary_sum = 0u128;
        let mut boundary_orthogonal = 0u128;
        for (tick, info) in self.ticks.initialized().filter(|(t, _)| *t <= current) {
            boundary_sum = boundary_sum
                .checked_add(sum_reserves_at_tick(tick, info.radius_gross(), n)?)
                .ok_or(AmmError::Overflow("boundary sum overflow"))?;
            boundary_orthogonal = boundary_orthogonal
                .checked_add(orthogonal_at_tick(tick, info.radius_gross(), n)?)
                .ok_or(AmmError::Overflow("boundary orthogonal overflow"))?;
        }
        self.torus.set_boundary(boundary_sum, boundary_orthogonal);
        Ok(())
    }

    /// Reserves held by a part of the curve whose sum is `part_sum` and
    /// whose `√n`-scaled orthogonal length is `part_orthogonal`, scaled
    /// by `num / den` and rounded down.
    ///
    /// Every part's orthogonal component points the same way as the
    /// pool's, so asset `i` holds
    /// `part_sum/n + (xᵢ − S/n) · part_orthogonal/Ŵ`.
    fn reserves_of_part(
        &self,
        part_sum: I256,
        part_orthogonal: I256,
        num: u128,
        den: u128,
    ) -> crate::error::Result<Vec<Amount>> {
        let overflow = || AmmError::Overflow("withdrawal overflow");
        let n = signed(self.assets() as u128);
        let (_, w_hat) = self.torus.orthogonal_gap(self.sum, self.sum_sq)?;
        let denom = if w_hat == I256::ZERO {
            n
        } else {
            n.checked_mul(w_hat).ok_or_else(overflow)?
        }
        .checked_mul(signed(den))
        .ok_or_else(overflow)?;
        if denom <= I256::ZERO {
            return Err(AmmError::DivisionByZero);
        }
        self.reserves
            .iter()
            .map(|x| {
                let along = if w_hat == I256::ZERO {
                    part_sum
                } else {
                    let spread = n * signed(x.get()) - signed(self.sum);
                    part_sum
                        .checked_mul(w_hat)
                        .zip(spread.checked_mul(part_orthogonal))
                        .and_then(|(a, b)| a.checked_add(b))
                        .ok_or_else(overflow)?
                };
                let share = along.checked_mul(signed(num)).ok_or_else(overflow)? / denom;
                if share <= I256::ZERO {
                    Ok(Amount::ZERO)
                } else {
                    narrow(share.as_u256(), "withdrawal exceeds u128").map(Amount::new)
                }
            })
            .collect()
    }

    /// Current reserves of `radius` at `tick`: a share of the interior
    /// sphere for an interior tick, the point pinned on the tick's plane
    /// for a boundary tick.
    fn position_reserves(&self, tick: Tick, radius: Radius) -> crate::error::Result<Vec<Amount>> {
        if self.is_interior(tick) {
            let interior = self.torus.radius();
            if interior < radius {
                return Err(AmmError::InsufficientLiquidity);
            }
            let (gap, _) = self.torus.orthogonal_gap(self.sum, self.sum_sq)?;
            let part_sum = signed(self.sum) - signed(self.torus.boundary_sum()) - I256::from(self.torus.offset());
            self.reserves_of_part(part_sum, gap, radius.get(), interior.get())
        } else {
            let n = self.assets();
            let part_sum = signed(sum_reserves_at_tick(tick, radius, n)?);
            let part_orthogonal = signed(orthogonal_at_tick(tick, radius, n)?);
            self.reserves_of_part(part_sum, part_orthogonal, 1, 1)
        }
    }

    /// Splits `fee` of `asset` between the protocol and fee growth.
    /// Returns the protocol's share.
    fn distribute_fee(&mut self, asset: usize, fee: Amount) -> crate::error::Result<Amount> {
        let radius = self.torus.radius();
        let protocol = if radius.is_zero() {
            fee
        } else {
            self.protocol_fee.apply(fee, Rounding::Down)?
        };
        let lp = fee.safe_sub(&protocol)?;
        if !lp.is_zero() {
            let growth = div_wide(U256::from(lp.get()) << 128u32, U256::from(radius.get()), Rounding::Down)?;
            let global = slot(&mut self.fee_growth_global, asset)?;
            // Q128 growth wraps by convention
            *global = global.wrapping_add(growth.as_u128());
        }
        let owed = slot(&mut self.protocol_fees, asset)?;
        *owed = owed.safe_add(&protocol)?;
        Ok(protocol)
    }

    fn verify_payment(&self, before: &[Amount], required: &[Amount]) -> crate::error::Result<()> {
        for (asset, ((now, was), need)) in self.balances.iter().zip(before).zip(required).enumerate() {
            let received = now.get().saturating_sub(was.get());
            if received < need.get() {
                warn!(asset, required = need.get(), received, "callback underpaid");
                return Err(AmmError::InsufficientPayment {
                    asset,
                    required: need.get(),
                    received,
                });
            }
        }
        Ok(())
    }

    fn cross_tick(&mut self, tick: Tick, toward: bool) -> crate::error::Result<()> {
        let net = self.ticks.cross(tick, &self.fee_growth_global)?;
        let delta = if toward {
            net
        } else {
            net.checked_neg()
                .ok_or(AmmError::Overflow("tick net radius overflow"))?
        };
        let radius = self
            .torus
            .radius()
            .apply_delta(delta)
            .ok_or(AmmError::InsufficientLiquidity)?;
        if radius.is_zero() {
            warn!(tick = tick.get(), "crossing would exhaust the interior radius");
            return Err(AmmError::InsufficientLiquidity);
        }
        self.torus.set_radius(radius);
        self.current_tick = if toward {
            tick.checked_sub(1)
                .ok_or(AmmError::InvalidTick("tick below range"))?
        } else {
            tick
        };
        self.refresh_boundary()?;
        self.torus.reanchor(self.sum, self.sum_sq)?;
        debug!(tick = tick.get(), toward, radius = radius.get(), "crossed tick");
        Ok(())
    }

    /// Moves the current tick to the interior projection, kept between
    /// the last boundary tick and the next interior tick.
    fn settle_tick(&mut self) -> crate::error::Result<()> {
        if self.torus.radius().is_zero() {
            return Ok(());
        }
        let projected = tick_at_knorm(self.torus.interior_knorm(self.sum)?, self.assets())?;
        let lowest = self
            .next_tick_at_or_below(self.current_tick)
            .unwrap_or(Tick::MIN);
        let highest = self
            .next_tick_above(self.current_tick)
            .and_then(|t| t.checked_sub(1))
            .unwrap_or(Tick::MAX);
        self.current_tick = projected.clamp(lowest, highest);
        Ok(())
    }

    /// Runs the swap loop on `self` without collecting payment.
    fn execute_swap(&mut self, params: &SwapParams) -> crate::error::Result<SwapResult> {
        self.require_initialized()?;
        let (token_in, token_out) = (params.token_in(), params.token_out());
        if token_in >= self.assets() || token_out >= self.assets() {
            return Err(AmmError::InvalidToken("asset index out of range"));
        }
        self.resync()?;

        // the limit bounds S in the direction the swap starts in
        let limit = params.sum_limit();
        let falling = at(&self.reserves, token_in)? < at(&self.reserves, token_out)?;
        if let Some(limit) = limit {
            if (falling && limit >= self.sum) || (!falling && limit <= self.sum) {
                return Err(AmmError::InvalidSumLimit("limit already reached"));
            }
        }

        let mut remaining = params.amount();
        let mut amount_out = Amount::ZERO;
        let mut fee_total = Amount::ZERO;
        let mut protocol_total = Amount::ZERO;
        let mut crossed = Vec::new();
        let mut limited = false;

        for step_index in 0..MAX_SWAP_STEPS {
            if remaining.is_zero() {
                break;
            }
            let balance_in = at(&self.reserves, token_in)?;
            let balance_out = at(&self.reserves, token_out)?;
            let toward = balance_in < balance_out;
            if let Some(limit) = limit {
                if (falling && self.sum <= limit) || (!falling && self.sum >= limit) {
                    limited = true;
                    break;
                }
            }
            if self.torus.radius().is_zero() {
                return Err(AmmError::InsufficientLiquidity);
            }

            let next = if toward {
                self.next_tick_at_or_below(self.current_tick)
            } else {
                Some(
                    self.next_tick_above(self.current_tick)
                        .ok_or(AmmError::InsufficientLiquidity)?,
                )
            };
            let (mut target, mut target_tick) = match next {
                Some(t) => (self.torus.target_sum_at_tick(t)?, Some(t)),
                None => (0, None),
            };
            if let Some(limit) = limit {
                // past parity S rises again and a falling limit no longer binds
                if toward == falling && ((toward && limit > target) || (!toward && limit < target)) {
                    target = limit;
                    target_tick = None;
                }
            }

            let net = self.fee_tier.net_of_fee(remaining)?;
            let step = compute_swap_step(
                &self.torus,
                &SwapStepInput {
                    sum: self.sum,
                    sum_sq: self.sum_sq,
                    balance_in: balance_in.get(),
                    balance_out: balance_out.get(),
                    amount_remaining: net.get(),
                    target_sum: target,
                },
            )?;
            if !step.converged {
                warn!(step = step_index, iterations = step.iterations, "swap step did not converge");
                return Err(AmmError::NewtonRaphsonNonConvergence("swap step did not converge"));
            }

            let consumed = Amount::new(step.amount_in);
            let fee = if consumed == net {
                remaining.safe_sub(&net)?
            } else {
                self.fee_tier
                    .fee_on_net(consumed)?
                    .min(remaining.safe_sub(&consumed)?)
            };
            remaining = remaining.safe_sub(&consumed)?.safe_sub(&fee)?;
            let protocol = self.distribute_fee(token_in, fee)?;
            fee_total = fee_total.safe_add(&fee)?;
            protocol_total = protocol_total.safe_add(&protocol)?;
            amount_out = amount_out.safe_add(&Amount::new(step.amount_out))?;

            let reserve_in = slot(&mut self.reserves, token_in)?;
            *reserve_in = reserve_in.safe_add(&consumed)?;
            let reserve_out = slot(&mut self.reserves, token_out)?;
            *reserve_out = reserve_out.safe_sub(&Amount::new(step.amount_out))?;
            if reserve_out.is_zero() {
                return Err(AmmError::ZeroReserve);
            }
            self.sum = step.sum_next;
            self.sum_sq = step.sum_sq_next;
            debug!(
                step = step_index,
                toward,
                amount_in = step.amount_in,
                amount_out = step.amount_out,
                fee = fee.get(),
                reached = step.reached_target,
                parity = step.at_parity,
                iterations = step.iterations,
                "swap step"
            );

            if step.reached_target {
                match target_tick {
                    Some(tick) => {
                        self.cross_tick(tick, toward)?;
                        crossed.push(tick);
                    }
                    None => {
                        limited = true;
                        break;
                    }
                }
            }
        }

        if !remaining.is_zero() && !limited {
            warn!(remaining = remaining.get(), "swap step budget exhausted");
            return Err(AmmError::InsufficientLiquidity);
        }
        self.settle_tick()?;

        let amount_in = params.amount().safe_sub(&remaining)?;
        Ok(SwapResult::new(token_in, token_out, amount_in, amount_out, fee_total)?
            .with_protocol_fee(protocol_total)
            .with_state(self.sum, self.current_tick, self.torus.radius(), crossed))
    }
}

fn slot<T>(items: &mut [T], index: usize) -> crate::error::Result<&mut T> {
    items
        .get_mut(index)
        .ok_or(AmmError::InvalidToken("asset index out of range"))
}

fn at<T: Copy>(items: &[T], index: usize) -> crate::error::Result<T> {
    items
        .get(index)
        .copied()
        .ok_or(AmmError::InvalidToken("asset index out of range"))
}

impl FromConfig<OrbitalConfig> for OrbitalPool {
    /// Creates an uninitialized pool.
    ///
    /// # Errors
    ///
    /// Propagates [`OrbitalConfig::validate`] errors.
    fn from_config(config: &OrbitalConfig) -> crate::error::Result<Self> {
        config.validate()?;
        let n = config.assets();
        Ok(Self {
            tokens: config.tokens().to_vec(),
            fee_tier: config.fee_tier(),
            protocol_fee: config.protocol_fee(),
            tick_spacing: config.tick_spacing(),
            window: tick_bounds(n)?,
            initialized: false,
            reserves: vec![Amount::ZERO; n],
            balances: vec![Amount::ZERO; n],
            sum: 0,
            sum_sq: U256::ZERO,
            torus: Torus::new(n),
            current_tick: Tick::ZERO,
            fee_growth_global: vec![0; n],
            protocol_fees: vec![Amount::ZERO; n],
            ticks: TickLedger::new(),
            bitmap: TickBitmap::new(),
            positions: PositionLedger::new(),
            flash_active: false,
        })
    }
}

impl SwapPool for OrbitalPool {
    fn swap(&mut self, params: &SwapParams, callback: &mut dyn SwapCallback) -> crate::error::Result<SwapResult> {
        self.atomically(|pool| {
            let result = pool.execute_swap(params)?;
            let out = slot(&mut pool.balances, result.token_out())?;
            *out = out.safe_sub(&result.amount_out())?;
            debug!(recipient = %params.recipient(), amount = result.amount_out().get(), "output sent");

            let before = pool.balances.clone();
            callback.on_swap(&result, &mut Funds::new(&mut pool.balances))?;
            let mut required = vec![Amount::ZERO; pool.assets()];
            *slot(&mut required, result.token_in())? = result.amount_in();
            pool.verify_payment(&before, &required)?;
            info!(
                token_in = result.token_in(),
                token_out = result.token_out(),
                amount_in = result.amount_in().get(),
                amount_out = result.amount_out().get(),
                crossed = result.crossed_ticks().len(),
                "swap executed"
            );
            Ok(result)
        })
    }

    fn quote(&self, params: &SwapParams) -> crate::error::Result<SwapResult> {
        self.clone().execute_swap(params)
    }

    fn spot_price(&self, base: usize, quote: usize) -> crate::error::Result<u128> {
        self.require_initialized()?;
        self.torus.spot_price(&self.reserves, base, quote)
    }

    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn fee_tier(&self) -> FeeTier {
        self.fee_tier
    }
}

impl LiquidityPool for OrbitalPool {
    fn mint(
        &mut self,
        owner: Address,
        tick: Tick,
        radius: Radius,
        callback: &mut dyn MintCallback,
    ) -> crate::error::Result<Vec<Amount>> {
        self.atomically(|pool| {
            pool.require_initialized()?;
            if radius.is_zero() {
                return Err(AmmError::InvalidQuantity("radius must be non-zero"));
            }
            pool.validate_tick(tick)?;
            let n = pool.assets();
            let amount = amount_per_token(radius, n, Rounding::Up)?;
            let delta = radius
                .to_delta()
                .ok_or(AmmError::Overflow("radius exceeds i128"))?;

            if pool.ticks.update(tick, delta, pool.current_tick, &pool.fee_growth_global)? {
                pool.bitmap.flip(tick, pool.tick_spacing)?;
            }
            let inside = pool.fee_growth_inside(tick);
            pool.positions.entry(owner, tick, n).update(delta, &inside)?;

            for reserve in &mut pool.reserves {
                *reserve = reserve.safe_add(&amount)?;
            }
            pool.resync()?;
            if pool.is_interior(tick) {
                pool.torus.set_radius(pool.torus.radius().safe_add(&radius)?);
                pool.torus.reanchor(pool.sum, pool.sum_sq)?;
            } else {
                let shift = pool.uniform_shift(amount)?;
                pool.torus.shift_offset(shift)?;
            }

            let amounts = vec![amount; n];
            let before = pool.balances.clone();
            callback.on_mint(&amounts, &mut Funds::new(&mut pool.balances))?;
            pool.verify_payment(&before, &amounts)?;
            info!(
                owner = %owner,
                tick = tick.get(),
                radius = radius.get(),
                amount = amount.get(),
                interior = pool.is_interior(tick),
                "liquidity minted"
            );
            Ok(amounts)
        })
    }

    fn burn(&mut self, owner: Address, tick: Tick, radius: Radius) -> crate::error::Result<Vec<Amount>> {
        self.atomically(|pool| {
            pool.require_initialized()?;
            if radius.is_zero() {
                return Err(AmmError::InvalidQuantity("radius must be non-zero"));
            }
            if pool.position(owner, tick).is_none() {
                return Err(AmmError::PositionNotFound);
            }
            pool.resync()?;
            let amounts = pool.position_reserves(tick, radius)?;
            let delta = radius
                .to_delta()
                .ok_or(AmmError::Overflow("radius exceeds i128"))?;

            let inside = pool.fee_growth_inside(tick);
            let position = pool.positions.get_mut(owner, tick)?;
            position.update(-delta, &inside)?;
            position.credit(&amounts)?;
            if pool.ticks.update(tick, -delta, pool.current_tick, &pool.fee_growth_global)? {
                pool.bitmap.flip(tick, pool.tick_spacing)?;
            }

            for (reserve, amount) in pool.reserves.iter_mut().zip(&amounts) {
                *reserve = reserve.safe_sub(amount)?;
                if reserve.is_zero() {
                    return Err(AmmError::ZeroReserve);
                }
            }
            pool.resync()?;
            if pool.is_interior(tick) {
                pool.torus.set_radius(pool.torus.radius().safe_sub(&radius)?);
            } else {
                pool.refresh_boundary()?;
            }
            pool.torus.reanchor(pool.sum, pool.sum_sq)?;
            info!(
                owner = %owner,
                tick = tick.get(),
                radius = radius.get(),
                interior = pool.is_interior(tick),
                "liquidity burned"
            );
            Ok(amounts)
        })
    }

    fn collect(&mut self, owner: Address, tick: Tick) -> crate::error::Result<Vec<Amount>> {
        self.atomically(|pool| {
            let inside = pool.fee_growth_inside(tick);
            let position = pool.positions.get_mut(owner, tick)?;
            position.update(0, &inside)?;
            let owed = position.take_owed();
            for (balance, amount) in pool.balances.iter_mut().zip(&owed) {
                *balance = balance.safe_sub(amount)?;
            }
            info!(owner = %owner, tick = tick.get(), "position collected");
            Ok(owed)
        })
    }

    fn radius(&self) -> Radius {
        self.torus.radius()
    }
}
