//! Liquidity management trait extending [`SwapPool`].
//!
//! [`LiquidityPool`] adds position management and fee collection on top
//! of swapping.
//!
//! # Radius Accounting Invariant
//!
//! The pool's interior radius equals the sum of the gross radius of
//! every interior tick:
//!
//! ```text
//! r = Σ tick[t].radius_gross   for all t > current_tick
//! ```
//!
//! Mints and burns change it only for interior ticks; swaps change it
//! only when they cross a tick.
//!
//! # Fee Collection Isolation
//!
//! [`LiquidityPool::collect`] pays out owed tokens from the pool's
//! balances without touching reserves or the curve.

use super::{MintCallback, SwapPool};
use crate::domain::{Address, Amount, Radius, Tick};

/// Trait for pools that support liquidity provision and fee collection.
pub trait LiquidityPool: SwapPool {
    /// Adds `radius` at `tick` for `owner` and returns the per-asset
    /// deposit, collected through `callback`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidTick`](crate::error::AmmError::InvalidTick)
    ///   for a tick outside the pool's window or off the spacing grid.
    /// - [`AmmError::InvalidQuantity`](crate::error::AmmError::InvalidQuantity)
    ///   for a zero radius.
    /// - [`AmmError::InsufficientPayment`](crate::error::AmmError::InsufficientPayment)
    ///   if the callback pays too little.
    fn mint(
        &mut self,
        owner: Address,
        tick: Tick,
        radius: Radius,
        callback: &mut dyn MintCallback,
    ) -> crate::error::Result<Vec<Amount>>;

    /// Removes `radius` from a position. The released tokens are owed
    /// to the position until [`collect`](Self::collect).
    ///
    /// # Errors
    ///
    /// - [`AmmError::PositionNotFound`](crate::error::AmmError::PositionNotFound)
    ///   if the position does not exist.
    /// - [`AmmError::Underflow`](crate::error::AmmError::Underflow) if the
    ///   position holds less radius.
    /// - [`AmmError::InsufficientLiquidity`](crate::error::AmmError::InsufficientLiquidity)
    ///   if the remaining curve cannot hold the current reserves.
    fn burn(&mut self, owner: Address, tick: Tick, radius: Radius) -> crate::error::Result<Vec<Amount>>;

    /// Pays out a position's accrued fees and burned principal.
    ///
    /// Calling it twice without intermediate activity pays zero the
    /// second time.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PositionNotFound`](crate::error::AmmError::PositionNotFound)
    /// if the position does not exist.
    fn collect(&mut self, owner: Address, tick: Tick) -> crate::error::Result<Vec<Amount>>;

    /// Interior radius currently pricing swaps.
    #[must_use]
    fn radius(&self) -> Radius;
}
