//! Swap request parameters.

use core::fmt;

use super::{Address, Amount};
use crate::error::AmmError;

/// An exact-input swap request against an orbital pool.
///
/// Assets are addressed by their index in the pool's token list. The
/// optional `sum_limit` bounds the sum of reserves `S` the swap may reach:
/// when it is hit the swap stops early and the unspent input stays with
/// the caller.
///
/// # Invariants
///
/// - `amount > 0`
/// - `token_in != token_out`
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::{Address, Amount, SwapParams};
///
/// let Ok(params) = SwapParams::exact_in(Address::repeat_byte(9), 0, 1, Amount::new(1_000)) else {
///     panic!("valid params");
/// };
/// assert_eq!(params.sum_limit(), None);
/// assert_eq!(params.with_sum_limit(5_000).sum_limit(), Some(5_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapParams {
    recipient: Address,
    token_in: usize,
    token_out: usize,
    amount: Amount,
    sum_limit: Option<u128>,
}

impl SwapParams {
    /// Creates an exact-input request without a sum limit.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] if `amount` is zero.
    /// - [`AmmError::InvalidToken`] if both indices are equal.
    pub const fn exact_in(
        recipient: Address,
        token_in: usize,
        token_out: usize,
        amount: Amount,
    ) -> crate::error::Result<Self> {
        if amount.is_zero() {
            return Err(AmmError::InvalidQuantity("swap amount must be non-zero"));
        }
        if token_in == token_out {
            return Err(AmmError::InvalidToken("token_in and token_out must differ"));
        }
        Ok(Self {
            recipient,
            token_in,
            token_out,
            amount,
            sum_limit: None,
        })
    }

    /// Returns a copy that stops once `S` reaches `limit`.
    #[must_use]
    pub const fn with_sum_limit(mut self, limit: u128) -> Self {
        self.sum_limit = Some(limit);
        self
    }

    /// Address that receives the output.
    #[must_use]
    pub const fn recipient(&self) -> Address {
        self.recipient
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

    /// Gross input amount, fee included.
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Optional bound on the sum of reserves.
    #[must_use]
    pub const fn sum_limit(&self) -> Option<u128> {
        self.sum_limit
    }
}

impl fmt::Display for SwapParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapParams({} of #{} -> #{})",
            self.amount, self.token_in, self.token_out
        )
    }
}
