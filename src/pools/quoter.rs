//! Read-only swap simulation.
//!
//! A [`Quoter`] borrows a pool immutably and answers "what would this
//! swap return" by running the swap loop on a private copy. Nothing the
//! quoter does is observable on the pool.

use super::OrbitalPool;
use crate::domain::{Address, Amount, SwapParams, SwapResult};
use crate::traits::SwapPool;

/// Quotes swaps against a borrowed [`OrbitalPool`].
#[derive(Debug, Clone, Copy)]
pub struct Quoter<'a> {
    pool: &'a OrbitalPool,
}

impl<'a> Quoter<'a> {
    /// Creates a quoter for `pool`.
    #[must_use]
    pub const fn new(pool: &'a OrbitalPool) -> Self {
        Self { pool }
    }

    /// Full result of swapping `params` right now.
    ///
    /// # Errors
    ///
    /// Same as [`SwapPool::swap`], minus payment errors.
    pub fn quote(&self, params: &SwapParams) -> crate::error::Result<SwapResult> {
        self.pool.quote(params)
    }

    /// Quotes an exact-input swap without a sum limit.
    ///
    /// # Errors
    ///
    /// Returns parameter validation errors and the errors of
    /// [`quote`](Self::quote).
    pub fn quote_exact_in(&self, token_in: usize, token_out: usize, amount: Amount) -> crate::error::Result<SwapResult> {
        let params = SwapParams::exact_in(Address::zero(), token_in, token_out, amount)?;
        self.quote(&params)
    }

    /// Quotes each of `amounts` independently from the current state.
    ///
    /// Useful for building a depth ladder. Each entry carries its own
    /// outcome, so a failing size does not hide the others.
    #[must_use]
    pub fn quote_ladder(
        &self,
        token_in: usize,
        token_out: usize,
        amounts: &[Amount],
    ) -> Vec<crate::error::Result<SwapResult>> {
        amounts
            .iter()
            .map(|amount| self.quote_exact_in(token_in, token_out, *amount))
            .collect()
    }
}
