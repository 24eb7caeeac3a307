//! # Orbital AMM
//!
//! Engine for an `n`-asset automated market maker built for assets
//! expected to trade near parity, such as stablecoins.
//!
//! Liquidity providers deposit at nested spherical ticks centered on the
//! equal-price point. Ticks whose boundary plane the reserves have not
//! reached are *interior* and consolidate into one sphere. The rest are
//! *boundary* ticks and contribute a fixed orthogonal term. Together they
//! form the torus invariant
//!
//! ```text
//! (S − c)² + (Ŵ − Ŝ_b)² = n·r²
//! ```
//!
//! where `S` is the reserve sum, `Ŵ` the reserve dispersion, `r` the
//! interior radius and `c`, `Ŝ_b` the consolidated centers. Swaps walk
//! the invariant with closed-form tick targets and Newton-Raphson
//! stepping, crossing ticks as the reserves move.
//!
//! # Quick Start
//!
//! ```rust
//! use orbital_amm::config::OrbitalConfig;
//! use orbital_amm::domain::{Address, Amount, BasisPoints, Decimals, FeeTier, Radius, SwapParams, SwapResult, Tick, Token};
//! use orbital_amm::pools::OrbitalPool;
//! use orbital_amm::traits::{FromConfig, Funds, LiquidityPool, MintCallback, SwapCallback, SwapPool};
//!
//! struct Wallet;
//!
//! impl MintCallback for Wallet {
//!     fn on_mint(&mut self, amounts: &[Amount], funds: &mut Funds<'_>) -> orbital_amm::error::Result<()> {
//!         for (asset, amount) in amounts.iter().enumerate() {
//!             funds.pay(asset, *amount)?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl SwapCallback for Wallet {
//!     fn on_swap(&mut self, result: &SwapResult, funds: &mut Funds<'_>) -> orbital_amm::error::Result<()> {
//!         funds.pay(result.token_in(), result.amount_in())
//!     }
//! }
//!
//! let Ok(decimals) = Decimals::new(18) else { panic!("valid decimals") };
//! let tokens = (1..=4).map(|b| Token::new(Address::repeat_byte(b), decimals)).collect();
//! let Ok(config) = OrbitalConfig::new(tokens, FeeTier::TIER_0_05_PERCENT, BasisPoints::ZERO, 1) else {
//!     panic!("valid config")
//! };
//! let Ok(mut pool) = OrbitalPool::from_config(&config) else { panic!("valid pool") };
//! let Ok(()) = pool.initialize(4_000 * 10u128.pow(18), Tick::ZERO) else { panic!("initialized") };
//!
//! let Ok(tick) = Tick::new(2_000) else { panic!("valid tick") };
//! let lp = Address::repeat_byte(0xaa);
//! let Ok(paid) = pool.mint(lp, tick, Radius::new(1_000 * 10u128.pow(18)), &mut Wallet) else {
//!     panic!("minted")
//! };
//! assert_eq!(paid.len(), 4);
//!
//! let Ok(params) = SwapParams::exact_in(lp, 0, 1, Amount::new(10u128.pow(19))) else { panic!("valid params") };
//! let Ok(result) = pool.swap(&params, &mut Wallet) else { panic!("swapped") };
//! assert!(result.amount_out().get() > 0);
//! assert!(pool.is_consistent());
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Radius`](domain::Radius), [`Tick`](domain::Tick), etc. |
//! | [`traits`] | [`SwapPool`](traits::SwapPool), [`LiquidityPool`](traits::LiquidityPool), [`FromConfig`](traits::FromConfig) and payment callbacks |
//! | [`config`] | [`OrbitalConfig`](config::OrbitalConfig) pool blueprint |
//! | [`ledger`] | Tick, bitmap and position ledgers |
//! | [`pools`]  | [`OrbitalPool`](pools::OrbitalPool) and [`Quoter`](pools::Quoter) |
//! | [`math`]   | Wide arithmetic, tick math, the torus invariant and swap stepping |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod traits;
