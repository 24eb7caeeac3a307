//! Pool implementations.
//!
//! [`OrbitalPool`] is the stateful pool: reserves, tick and position
//! ledgers, fee accounting and the swap loop. [`Quoter`] simulates swaps
//! against a borrowed pool without mutating it.

mod orbital;
mod quoter;

#[cfg(test)]
mod proptest_properties;

pub use orbital::{OrbitalPool, MAX_SWAP_STEPS};
pub use quoter::Quoter;
