//! Pool configuration.
//!
//! [`OrbitalConfig`] is the declarative blueprint of an orbital pool: its
//! assets, fee, protocol share and tick spacing.

mod orbital;

pub use orbital::{OrbitalConfig, MAX_ASSETS, MAX_TICK_SPACING};
