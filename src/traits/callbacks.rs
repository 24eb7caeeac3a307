//! Callbacks through which a pool collects payment.
//!
//! The pool computes what it is owed, hands the callback a [`Funds`]
//! handle over its token balances, and afterwards compares the balances
//! with what it requested. A shortfall fails the whole operation.
//!
//! Mint and swap callbacks only see [`Funds`], never the pool, so they
//! cannot re-enter it. The flash callback receives the pool itself and
//! may trade against it; a nested flash loan is rejected.

use crate::domain::{Amount, SwapResult};
use crate::error::AmmError;
use crate::pools::OrbitalPool;

/// Write access to a pool's token balances during a callback.
///
/// Models token transfers into the pool: [`pay`](Self::pay) is the only
/// way to move a balance, and only upward.
#[derive(Debug)]
pub struct Funds<'a> {
    balances: &'a mut [Amount],
}

impl<'a> Funds<'a> {
    pub(crate) fn new(balances: &'a mut [Amount]) -> Self {
        Self { balances }
    }

    /// Transfers `amount` of `asset` into the pool.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] for an unknown asset index.
    /// - [`AmmError::Overflow`] if the balance overflows.
    pub fn pay(&mut self, asset: usize, amount: Amount) -> crate::error::Result<()> {
        let balance = self
            .balances
            .get_mut(asset)
            .ok_or(AmmError::InvalidToken("asset index out of range"))?;
        *balance = balance
            .checked_add(&amount)
            .ok_or(AmmError::Overflow("pool balance overflow"))?;
        Ok(())
    }

    /// Current pool balance of `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] for an unknown asset index.
    pub fn balance(&self, asset: usize) -> crate::error::Result<Amount> {
        self.balances
            .get(asset)
            .copied()
            .ok_or(AmmError::InvalidToken("asset index out of range"))
    }

    /// Number of assets.
    #[must_use]
    pub fn assets(&self) -> usize {
        self.balances.len()
    }
}

/// Pays for a mint.
pub trait MintCallback {
    /// Called after the position is recorded. Must pay at least
    /// `amounts[i]` of every asset `i`.
    ///
    /// # Errors
    ///
    /// Any error aborts the mint.
    fn on_mint(&mut self, amounts: &[Amount], funds: &mut Funds<'_>) -> crate::error::Result<()>;
}

/// Pays for a swap.
pub trait SwapCallback {
    /// Called after the output was sent. Must pay at least
    /// `result.amount_in()` of `result.token_in()`.
    ///
    /// # Errors
    ///
    /// Any error aborts the swap.
    fn on_swap(&mut self, result: &SwapResult, funds: &mut Funds<'_>) -> crate::error::Result<()>;
}

/// Repays a flash loan.
pub trait FlashCallback {
    /// Called with the loaned amounts already sent. Must restore every
    /// balance plus `fees[i]`, using [`OrbitalPool::receive`] or any
    /// other pool operation.
    ///
    /// # Errors
    ///
    /// Any error aborts the loan.
    fn on_flash(&mut self, pool: &mut OrbitalPool, fees: &[Amount]) -> crate::error::Result<()>;
}
