//! Pooled token identity.

use super::{Address, Decimals};

/// A token held by an orbital pool.
///
/// Two tokens are equal only if both address and decimals match.
///
/// # Examples
///
/// ```
/// use orbital_amm::domain::{Address, Decimals, Token};
///
/// let usdc = Token::new(Address::repeat_byte(1), Decimals::MAX);
/// assert_eq!(usdc.decimals(), Decimals::MAX);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    address: Address,
    decimals: Decimals,
}

impl Token {
    /// Creates a new `Token`.
    #[must_use]
    pub const fn new(address: Address, decimals: Decimals) -> Self {
        Self { address, decimals }
    }

    /// Returns the token address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the token decimals.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }
}
