//! Unified error types for the orbital AMM library.
//!
//! All fallible operations across the crate return `AmmError` as their
//! error type, ensuring a consistent error handling experience for consumers.
//!
//! # Taxonomy
//!
//! | Class | Variants | Retryable |
//! |-------|----------|-----------|
//! | Input validation | `Invalid*`, `PositionNotFound` | yes, with corrected input |
//! | Liquidity exhaustion | `InsufficientLiquidity`, `ZeroReserve` | only with a smaller size |
//! | Solver | `NewtonRaphsonNonConvergence` | no, indicates a numeric fault |
//! | Funding | `InsufficientPayment`, `Callback` | yes, by the funding party |
//! | Lifecycle | `AlreadyInitialized`, `NotInitialized`, `Reentrancy` | no |
//!
//! Every error aborts the enclosing pool operation and leaves the pool
//! exactly as it was before the call.

use thiserror::Error;

/// Errors produced by the orbital AMM engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    /// Pool or configuration parameters are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Fee rate outside the supported range.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// Zero, negative or otherwise unusable quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// Tick outside the global range, misaligned, or outside the
    /// pool's `[kNormMin, kNormMax]` window.
    #[error("invalid tick: {0}")]
    InvalidTick(&'static str),

    /// Asset index or token not part of the pool.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// Caller-supplied sum-of-reserves limit on the wrong side of the
    /// current sum.
    #[error("invalid sum limit: {0}")]
    InvalidSumLimit(&'static str),

    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Not enough radius or reserves to complete the operation.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// A reserve would reach zero.
    #[error("zero reserve")]
    ZeroReserve,

    /// The Newton-Raphson solver exhausted its iteration budget.
    #[error("newton-raphson did not converge: {0}")]
    NewtonRaphsonNonConvergence(&'static str),

    /// `initialize` was called on an initialized pool.
    #[error("pool already initialized")]
    AlreadyInitialized,

    /// Operation requires an initialized pool.
    #[error("pool not initialized")]
    NotInitialized,

    /// Re-entrant call into a guarded entry point.
    #[error("re-entrant call: {0}")]
    Reentrancy(&'static str),

    /// A callback delivered less than the pool requested.
    #[error("insufficient payment for asset {asset}: required {required}, received {received}")]
    InsufficientPayment {
        /// Asset index.
        asset: usize,
        /// Amount the pool requested.
        required: u128,
        /// Balance increase actually observed.
        received: u128,
    },

    /// No position exists for the `(owner, tick)` key.
    #[error("position not found")]
    PositionNotFound,

    /// A callback aborted the operation.
    #[error("callback failed: {0}")]
    Callback(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AmmError>;
