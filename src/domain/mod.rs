//! Fundamental domain value types used throughout the orbital AMM.
//!
//! Tokens, amounts, radii, ticks, fee rates and swap descriptors. All
//! types are newtypes with validated constructors that enforce their
//! invariants at the construction site.

mod address;
mod amount;
mod basis_points;
mod decimals;
mod fee_tier;
mod radius;
mod rounding;
mod swap_params;
mod swap_result;
mod tick;
mod token;

pub use address::Address;
pub use amount::Amount;
pub use basis_points::BasisPoints;
pub use decimals::Decimals;
pub use fee_tier::{FeeTier, PIPS_DENOMINATOR};
pub use radius::Radius;
pub use rounding::Rounding;
pub use swap_params::SwapParams;
pub use swap_result::SwapResult;
pub use tick::Tick;
pub use token::Token;
