//! Chain access for the keeper
//!
//! This module provides the read-only abstraction over the pool state
//! reader and the regime vault, plus an ethers-rs implementation. The in-memory mock is only built for
//! tests or with the `test-utils` feature.

pub mod errors;
pub mod ethers_reader;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod traits;

// Re-export commonly used types for convenience
pub use errors::{ChainError, ChainResult};
pub use ethers_reader::EthersChainReader;
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::MockChainReader;
pub use traits::ChainReader;
