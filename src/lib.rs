//! Peg Keeper: regime observation for a tick-range liquidity vault
//!
//! Periodically reads pool and vault state and reports drift between the
//! vault's active regime and the regime implied by the current tick:
//! - Chain reader over the pool state view and the regime vault
//! - Tick/price model and regime classification
//! - Polling keeper loop with per-iteration failure isolation
//!
//! Read-only: nothing here submits transactions.

pub mod chain;
pub mod config;
pub mod core;
pub mod error;

pub use error::AppError;
