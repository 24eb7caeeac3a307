//! Outcome of a swap operation.

use core::fmt;

use super::{Amount, Radius, Tick};
use crate::error::AmmError;

/// The outcome of a swap, including amounts exchanged, fees paid and the
/// pool state the swap left behind.
///
/// # Invariants
///
/// - `amount_in > 0` and `amount_out > 0`
/// - `fee <= amount_in`
/// - `crossed_ticks` is in crossing order
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::{Amount, SwapResult};
///
/// let result = SwapResult::new(0, 1, Amount::new(1_000), Amount::new(990), Amount::new(3));
/// assert!(result.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapResult {
    token_in: usize,
    token_out: usize,
    amount_in: Amount,
    amount_out: Amount,
    fee: Amount,
    protocol_fee: Amount,
    sum_after: u128,
    tick_after: Tick,
    radius_after: Radius,
    crossed_ticks: Vec<Tick>,
}

impl SwapResult {
    /// Creates a `SwapResult` with validated amounts and no state snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if:
    /// - `amount_in` is zero
    /// - `amount_out` is zero
    /// - `fee > amount_in`
    pub const fn new(
        token_in: usize,
        token_out: usize,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
    ) -> crate::error::Result<Self> {
        if amount_in.is_zero() {
            return Err(AmmError::InvalidQuantity("amount_in must be positive"));
        }
        if amount_out.is_zero() {
            return Err(AmmError::InvalidQuantity("amount_out must be positive"));
        }
        if fee.get() > amount_in.get() {
            return Err(AmmError::InvalidQuantity("fee must not exceed amount_in"));
        }
        Ok(Self {
            token_in,
            token_out,
            amount_in,
            amount_out,
            fee,
            protocol_fee: Amount::ZERO,
            sum_after: 0,
            tick_after: Tick::ZERO,
            radius_after: Radius::ZERO,
            crossed_ticks: Vec::new(),
        })
    }

    /// Attaches the post-swap pool state.
    #[must_use]
    pub fn with_state(
        mut self,
        sum_after: u128,
        tick_after: Tick,
        radius_after: Radius,
        crossed_ticks: Vec<Tick>,
    ) -> Self {
        self.sum_after = sum_after;
        self.tick_after = tick_after;
        self.radius_after = radius_after;
        self.crossed_ticks = crossed_ticks;
        self
    }

    /// Records the protocol's share of `fee`.
    #[must_use]
    pub const fn with_protocol_fee(mut self, protocol_fee: Amount) -> Self {
        self.protocol_fee = protocol_fee;
        self
    }

    /// Index of the asset paid in.
    #[must_use]
    pub const fn token_in(&self) -> usize {
        self.token_in
    }

    /// Index of the asset paid out.
    #[must_use]
    pub const fn token_out(&self) -> usize {
        self.token_out
    }

    /// Gross input consumed, fee included.
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Output sent to the recipient.
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Total fee charged.
    pub const fn fee(&self) -> Amount {
        self.fee
    }

    /// Part of [`fee`](Self::fee) credited to the protocol.
    pub const fn protocol_fee(&self) -> Amount {
        self.protocol_fee
    }

    /// Sum of reserves after the swap.
    #[must_use]
    pub const fn sum_after(&self) -> u128 {
        self.sum_after
    }

    /// Current tick after the swap.
    #[must_use]
    pub const fn tick_after(&self) -> Tick {
        self.tick_after
    }

    /// Global radius after the swap.
    pub const fn radius_after(&self) -> Radius {
        self.radius_after
    }

    /// Ticks crossed, in crossing order.
    #[must_use]
    pub fn crossed_ticks(&self) -> &[Tick] {
        &self.crossed_ticks
    }

    /// Net pool balance change per asset: input positive, output negative,
    /// zero elsewhere.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if either index is not below `assets`.
    /// - [`AmmError::Overflow`] if an amount exceeds `i128::MAX`.
    pub fn deltas(&self, assets: usize) -> crate::error::Result<Vec<i128>> {
        if self.token_in >= assets || self.token_out >= assets {
            return Err(AmmError::InvalidToken("asset index out of range"));
        }
        let amount_in = self
            .amount_in
            .to_signed()
            .ok_or(AmmError::Overflow("amount_in exceeds i128"))?;
        let amount_out = self
            .amount_out
            .to_signed()
            .ok_or(AmmError::Overflow("amount_out exceeds i128"))?;
        let mut deltas = vec![0i128; assets];
        deltas[self.token_in] = amount_in;
        deltas[self.token_out] = -amount_out;
        Ok(deltas)
    }
}

impl fmt::Display for SwapResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapResult(in={}, out={}, fee={}, crossed={})",
            self.amount_in,
            self.amount_out,
            self.fee,
            self.crossed_ticks.len()
        )
    }
}
