//! Per-iteration chain snapshot
//!
//! `SnapshotFetcher` issues the pool tick read and the four vault reads
//! concurrently and joins them into one immutable [`Snapshot`].
//!
//! # Consistency
//! The five reads are independent RPC round-trips and may be answered at
//! different block heights. A snapshot can therefore mix pool and vault
//! state from neighbouring blocks. No multicall batching is attempted.
//!
//! # Failure
//! Any single read failure fails the whole fetch; there is no partial
//! snapshot.

use std::sync::Arc;

use ethers::types::H256;
use serde::Serialize;

use crate::chain::{ChainReader, ChainResult};
use crate::core::price::{deviation_bps_from_peg, tick_to_price};
use crate::core::regime::{ActiveRegime, RegimeConfig};

/// State observed in one iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: i32,
    pub price: f64,
    /// Whole basis points, kept as f64 so extreme ticks are not clamped
    pub deviation_bps: f64,
    pub active_regime: ActiveRegime,
    pub config: RegimeConfig,
}

impl Snapshot {
    /// Derive price and deviation from the raw reads
    pub fn from_reads(tick: i32, active_regime: u8, config: RegimeConfig, peg: f64) -> Self {
        let price = tick_to_price(tick);
        Self {
            tick,
            price,
            deviation_bps: deviation_bps_from_peg(price, peg),
            active_regime: ActiveRegime::from(active_regime),
            config,
        }
    }
}

/// Fan-out reader producing one [`Snapshot`] per call
pub struct SnapshotFetcher {
    reader: Arc<dyn ChainReader>,
    pool_id: H256,
    peg: f64,
}

impl SnapshotFetcher {
    pub fn new(reader: Arc<dyn ChainReader>, pool_id: H256, peg: f64) -> Self {
        Self {
            reader,
            pool_id,
            peg,
        }
    }

    /// Read pool and vault state concurrently and assemble a snapshot
    pub async fn fetch(&self) -> ChainResult<Snapshot> {
        let reader = self.reader.as_ref();
        let (tick, active_regime, normal, mild, severe) = tokio::try_join!(
            reader.pool_tick(self.pool_id),
            reader.active_regime(),
            reader.normal_range(),
            reader.mild_range(),
            reader.severe_range(),
        )?;

        let config = RegimeConfig {
            normal,
            mild,
            severe,
        };
        Ok(Snapshot::from_reads(tick, active_regime, config, self.peg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainError, MockChainReader};
    use crate::core::regime::{Regime, TickRange};

    fn regime_config() -> RegimeConfig {
        RegimeConfig {
            normal: TickRange::new(-10, 10, true),
            mild: TickRange::new(-50, -11, true),
            severe: TickRange::new(-200, -51, false),
        }
    }

    #[tokio::test]
    async fn test_fetch_assembles_all_reads() {
        let reader = Arc::new(MockChainReader::new(-15, 1, regime_config()));
        let fetcher = SnapshotFetcher::new(reader.clone(), H256::zero(), 1.0);

        let snapshot = fetcher.fetch().await.unwrap();
        assert_eq!(snapshot.tick, -15);
        assert_eq!(snapshot.active_regime, ActiveRegime::Known(Regime::Mild));
        assert_eq!(snapshot.config, regime_config());
        assert_eq!(snapshot.deviation_bps, -15.0);
        assert!((snapshot.price - 0.998501).abs() < 1e-6);
        assert_eq!(reader.call_count(), 5);
    }

    #[tokio::test]
    async fn test_fetch_fails_whole_snapshot_on_single_error() {
        let reader = Arc::new(MockChainReader::new(0, 0, regime_config()));
        reader.fail_next(
            1,
            ChainError::Revert {
                method: "getSlot0",
                reason: "pool not initialized".to_string(),
            },
        );
        let fetcher = SnapshotFetcher::new(reader.clone(), H256::zero(), 1.0);

        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(err.reason(), "pool not initialized");

        // Next fetch recovers
        assert!(fetcher.fetch().await.is_ok());
    }

    #[test]
    fn test_from_reads_keeps_unknown_regime() {
        let snapshot = Snapshot::from_reads(0, 9, regime_config(), 1.0);
        assert_eq!(snapshot.active_regime, ActiveRegime::Unknown(9));
        assert_eq!(snapshot.price, 1.0);
        assert_eq!(snapshot.deviation_bps, 0.0);
    }

    #[test]
    fn test_from_reads_uses_configured_peg() {
        let snapshot = Snapshot::from_reads(0, 0, regime_config(), 0.99);
        assert_eq!(snapshot.deviation_bps, 100.0);
    }
}
