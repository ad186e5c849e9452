//! Scriptable in-memory chain reader for tests
//!
//! `MockChainReader` serves fixed pool/vault state and can be told to fail
//! the next N snapshot fetches, which is how transient RPC outages are
//! simulated in the keeper tests.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use ethers::types::H256;

use crate::chain::errors::{ChainError, ChainResult};
use crate::chain::traits::ChainReader;
use crate::core::regime::{RegimeConfig, TickRange};

#[derive(Debug, Clone)]
struct MockState {
    tick: i32,
    active_regime: u8,
    config: RegimeConfig,
}

/// In-memory chain reader with failure injection
pub struct MockChainReader {
    state: Mutex<MockState>,
    /// Remaining `pool_tick` calls that fail
    failures_remaining: AtomicU32,
    /// Error returned while failures remain
    failure: Mutex<ChainError>,
    /// Total calls across every method
    call_count: AtomicUsize,
}

impl MockChainReader {
    pub fn new(tick: i32, active_regime: u8, config: RegimeConfig) -> Self {
        Self {
            state: Mutex::new(MockState {
                tick,
                active_regime,
                config,
            }),
            failures_remaining: AtomicU32::new(0),
            failure: Mutex::new(ChainError::Rpc {
                method: "getSlot0",
                message: "mock outage".to_string(),
            }),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` fetches with `error` (raised by `pool_tick`)
    pub fn fail_next(&self, count: u32, error: ChainError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = error;
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn set_tick(&self, tick: i32) {
        self.lock_state().tick = tick;
    }

    pub fn set_active_regime(&self, ordinal: u8) {
        self.lock_state().active_regime = ordinal;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot_state(&self) -> MockState {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.lock_state().clone()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn pool_tick(&self, _pool_id: H256) -> ChainResult<i32> {
        let state = self.snapshot_state();
        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            let err = self
                .failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            return Err(err);
        }
        Ok(state.tick)
    }

    async fn active_regime(&self) -> ChainResult<u8> {
        Ok(self.snapshot_state().active_regime)
    }

    async fn normal_range(&self) -> ChainResult<TickRange> {
        Ok(self.snapshot_state().config.normal)
    }

    async fn mild_range(&self) -> ChainResult<TickRange> {
        Ok(self.snapshot_state().config.mild)
    }

    async fn severe_range(&self) -> ChainResult<TickRange> {
        Ok(self.snapshot_state().config.severe)
    }
}
