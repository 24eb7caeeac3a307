//! Configuration for n-asset orbital pools.

use crate::domain::{BasisPoints, FeeTier, Token};
use crate::error::AmmError;

/// Largest supported number of assets.
pub const MAX_ASSETS: usize = 64;

/// Largest supported tick spacing.
pub const MAX_TICK_SPACING: u32 = 16_384;

/// Configuration for an orbital pool.
///
/// Defines the immutable parameters of a pool of `n` interchangeable
/// assets priced on nested spherical ticks around the equal-price point.
///
/// # Validation
///
/// - Between 2 and [`MAX_ASSETS`] tokens, all addresses distinct.
/// - All tokens share the same decimals, since the curve prices raw
///   units one to one.
/// - Swap fee strictly below 100%.
/// - Protocol share of fees at most 10 000 basis points.
/// - `tick_spacing` in `1..=MAX_TICK_SPACING`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitalConfig {
    tokens: Vec<Token>,
    fee_tier: FeeTier,
    protocol_fee: BasisPoints,
    tick_spacing: u32,
}

impl OrbitalConfig {
    /// Creates a new `OrbitalConfig`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check of [`validate`](Self::validate).
    pub fn new(
        tokens: Vec<Token>,
        fee_tier: FeeTier,
        protocol_fee: BasisPoints,
        tick_spacing: u32,
    ) -> crate::error::Result<Self> {
        let config = Self {
            tokens,
            fee_tier,
            protocol_fee,
            tick_spacing,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] for a bad token count, mixed
    ///   decimals or a bad tick spacing.
    /// - [`AmmError::InvalidToken`] for duplicate token addresses.
    /// - [`AmmError::InvalidFee`] for a fee of 100% or more, or a protocol
    ///   share above 100%.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.tokens.len() < 2 {
            return Err(AmmError::InvalidConfiguration("pool needs at least two assets"));
        }
        if self.tokens.len() > MAX_ASSETS {
            return Err(AmmError::InvalidConfiguration("pool supports at most 64 assets"));
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if self.tokens.iter().take(i).any(|t| t.address() == token.address()) {
                return Err(AmmError::InvalidToken("duplicate token address"));
            }
        }
        let mut decimals = self.tokens.iter().map(Token::decimals);
        if let Some(first) = decimals.next() {
            if decimals.any(|d| d != first) {
                return Err(AmmError::InvalidConfiguration("all tokens must share decimals"));
            }
        }
        if !self.fee_tier.is_valid() {
            return Err(AmmError::InvalidFee("fee must be below 100%"));
        }
        if !self.protocol_fee.is_valid_percent() {
            return Err(AmmError::InvalidFee("protocol fee must not exceed 10000 basis points"));
        }
        if self.tick_spacing == 0 || self.tick_spacing > MAX_TICK_SPACING {
            return Err(AmmError::InvalidConfiguration("tick spacing must be in 1..=16384"));
        }
        Ok(())
    }

    /// Pool assets, in index order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of assets.
    #[must_use]
    pub fn assets(&self) -> usize {
        self.tokens.len()
    }

    /// Swap fee.
    #[must_use]
    pub const fn fee_tier(&self) -> FeeTier {
        self.fee_tier
    }

    /// Protocol share of every fee.
    #[must_use]
    pub const fn protocol_fee(&self) -> BasisPoints {
        self.protocol_fee
    }

    /// Tick spacing.
    #[must_use]
    pub const fn tick_spacing(&self) -> u32 {
        self.tick_spacing
    }
}
