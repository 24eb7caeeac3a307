//! Per-tick and per-position state owned by a pool.
//!
//! The ledgers hold no hidden state beyond their maps; the pool passes in
//! the current tick and fee growth on every call.

mod position;
mod tick;
mod tick_bitmap;

pub use position::{PositionInfo, PositionLedger};
pub use tick::{TickInfo, TickLedger};
pub use tick_bitmap::TickBitmap;
