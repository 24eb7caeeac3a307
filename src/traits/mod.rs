//! Core trait abstractions for pool operations.
//!
//! [`SwapPool`] for trading, [`LiquidityPool`] for positions,
//! [`FromConfig`] for configuration-driven construction, and the payment
//! callbacks a pool invokes.

mod callbacks;
mod from_config;
mod liquidity_pool;
mod swap_pool;

pub use callbacks::{FlashCallback, Funds, MintCallback, SwapCallback};
pub use from_config::FromConfig;
pub use liquidity_pool::LiquidityPool;
pub use swap_pool::SwapPool;
