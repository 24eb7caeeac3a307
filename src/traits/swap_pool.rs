//! Core swap trait for executing and quoting swaps.
//!
//! [`SwapPool`] covers the trading side of a pool:
//!
//! 1. **Execute**: [`SwapPool::swap`] performs the exchange and collects
//!    payment through a [`SwapCallback`].
//! 2. **Quote**: [`SwapPool::quote`] runs the same computation without
//!    touching the pool.
//! 3. **Price**: [`SwapPool::spot_price`] returns the marginal rate.
//!
//! # Fee Deduction Invariant
//!
//! Fees are deducted from the remaining input before every curve step,
//! so the curve never sees them:
//!
//! ```text
//! net_input = remaining × (1e6 − fee_pips) / 1e6
//! ```

use super::SwapCallback;
use crate::domain::{FeeTier, SwapParams, SwapResult, Token};

/// Trait for pools that trade between indexed assets.
pub trait SwapPool {
    /// Executes an exact-input swap.
    ///
    /// The output is released before `callback` is asked for the input.
    /// Either the swap completes in full or the pool is left untouched.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`](crate::error::AmmError::InvalidToken)
    ///   for an unknown asset index.
    /// - [`AmmError::InvalidSumLimit`](crate::error::AmmError::InvalidSumLimit)
    ///   for a limit already passed.
    /// - [`AmmError::InsufficientLiquidity`](crate::error::AmmError::InsufficientLiquidity)
    ///   if the curve cannot absorb the input.
    /// - [`AmmError::InsufficientPayment`](crate::error::AmmError::InsufficientPayment)
    ///   if the callback pays too little.
    fn swap(&mut self, params: &SwapParams, callback: &mut dyn SwapCallback) -> crate::error::Result<SwapResult>;

    /// Computes the result of [`swap`](Self::swap) without executing it.
    ///
    /// # Errors
    ///
    /// Same as [`swap`](Self::swap), minus payment errors.
    fn quote(&self, params: &SwapParams) -> crate::error::Result<SwapResult>;

    /// Marginal price of `base` in units of `quote`, in WAD.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown indices or a pool without liquidity.
    fn spot_price(&self, base: usize, quote: usize) -> crate::error::Result<u128>;

    /// Pool assets, in index order.
    #[must_use]
    fn tokens(&self) -> &[Token];

    /// Swap fee.
    #[must_use]
    fn fee_tier(&self) -> FeeTier;
}
