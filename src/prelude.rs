//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use orbital_amm::prelude::*;
//! ```

pub use crate::config::OrbitalConfig;
pub use crate::domain::{
    Address, Amount, BasisPoints, Decimals, FeeTier, Radius, Rounding, SwapParams, SwapResult, Tick, Token,
};
pub use crate::error::{AmmError, Result};
pub use crate::math::CheckedArithmetic;
pub use crate::pools::{OrbitalPool, Quoter};
pub use crate::traits::{FlashCallback, FromConfig, Funds, LiquidityPool, MintCallback, SwapCallback, SwapPool};
