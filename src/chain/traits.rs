//! Chain reader trait definition
//!
//! The `ChainReader` trait is the read-only capability surface the keeper
//! needs from the chain: one pool-state call and four vault getters.

use async_trait::async_trait;
use ethers::types::H256;

use crate::chain::errors::ChainResult;
use crate::core::regime::TickRange;

/// Read-only view over the pool state reader and the regime vault
///
/// Implementations are shared behind an `Arc` and called concurrently
/// within a single snapshot fetch, so every method takes `&self`.
///
/// # Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
///
/// struct FixedReader { tick: i32 }
///
/// #[async_trait]
/// impl ChainReader for FixedReader {
///     async fn pool_tick(&self, _pool_id: H256) -> ChainResult<i32> {
///         Ok(self.tick)
///     }
///     // ... vault getters
/// }
/// ```
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `getSlot0(poolId).tick` from the state reader contract
    async fn pool_tick(&self, pool_id: H256) -> ChainResult<i32>;

    /// Raw `activeRegime()` ordinal from the vault
    async fn active_regime(&self) -> ChainResult<u8>;

    /// `normalRange()` from the vault
    async fn normal_range(&self) -> ChainResult<TickRange>;

    /// `mildRange()` from the vault
    async fn mild_range(&self) -> ChainResult<TickRange>;

    /// `severeRange()` from the vault
    async fn severe_range(&self) -> ChainResult<TickRange>;
}
