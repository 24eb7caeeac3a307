//! Construction of a pool from its configuration.
//!
//! # Validation Contract
//!
//! Implementations validate the configuration during construction, so a
//! successfully constructed pool is in a valid initial state.

/// Builds a pool from a configuration of type `C`.
pub trait FromConfig<C> {
    /// Creates a new pool instance from `config`.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    fn from_config(config: &C) -> crate::error::Result<Self>
    where
        Self: Sized;
}
