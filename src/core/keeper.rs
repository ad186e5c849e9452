//! Polling keeper loop
//!
//! Each iteration runs Fetching → Classifying → Reporting → Sleeping, then
//! starts over. Iterations never overlap: the next fetch starts only after
//! the previous report has been emitted and the full interval has elapsed.
//!
//! # Failure isolation
//! A failed fetch is logged as a single error line (revert reason when
//! available) and the loop goes straight to sleep. Nothing is retried
//! early and no failure ends the loop.
//!
//! # Shutdown
//! The loop suspends at two points per iteration, the joined chain reads
//! and the sleep. Both race against the [`CancellationToken`]; once it is
//! cancelled the loop returns its statistics.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::chain::{ChainError, ChainReader, ChainResult};
use crate::config::KeeperConfig;
use crate::core::report::{Report, ReportSink};
use crate::core::snapshot::{Snapshot, SnapshotFetcher};

/// Counters accumulated over the loop's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Iterations that reached the fetch stage
    pub iterations: u64,
    /// Iterations that emitted a report
    pub reports: u64,
    /// Iterations that ended in a transient read error
    pub failures: u64,
    /// Reports where the target differed from the active regime
    pub drift_reports: u64,
}

pub struct KeeperLoop {
    fetcher: SnapshotFetcher,
    sink: Arc<dyn ReportSink>,
    poll_interval: Duration,
    fetch_timeout: Option<Duration>,
    stats: LoopStats,
}

impl KeeperLoop {
    pub fn new(fetcher: SnapshotFetcher, sink: Arc<dyn ReportSink>, poll_interval: Duration) -> Self {
        Self {
            fetcher,
            sink,
            poll_interval,
            fetch_timeout: None,
            stats: LoopStats::default(),
        }
    }

    /// Wire a loop from configuration and a shared chain reader
    pub fn from_config(
        reader: Arc<dyn ChainReader>,
        config: &KeeperConfig,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let fetcher = SnapshotFetcher::new(reader, config.pool_id, config.target_price);
        Self::new(fetcher, sink, config.poll_interval).with_fetch_timeout(config.fetch_timeout)
    }

    /// Bound each snapshot fetch; `None` leaves timeouts to the chain client
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run one fetch → classify → report pass
    ///
    /// The report is emitted to the sink before returning. Errors are
    /// counted but not logged; logging is left to [`run`](Self::run).
    pub async fn run_once(&mut self) -> ChainResult<Report> {
        self.stats.iterations += 1;

        let snapshot = match self.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.stats.failures += 1;
                return Err(e);
            }
        };

        let report = Report::new(Utc::now(), snapshot);
        if report.decision.fell_back {
            warn!(
                tick = snapshot.tick,
                "Normal range disabled on vault, target regime fell back to Normal"
            );
        }
        if report.decision.needs_update {
            self.stats.drift_reports += 1;
            debug!(
                active = %snapshot.active_regime,
                target = %report.decision.target_regime,
                "Active regime differs from target"
            );
        }

        self.sink.emit(&report);
        self.stats.reports += 1;
        Ok(report)
    }

    async fn fetch(&self) -> ChainResult<Snapshot> {
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch())
                .await
                .map_err(|_| ChainError::Timeout(limit.as_millis() as u64))?,
            None => self.fetcher.fetch().await,
        }
    }

    /// Loop until `cancel` fires
    pub async fn run(mut self, cancel: CancellationToken) -> LoopStats {
        info!(
            poll_interval_secs = self.poll_interval.as_secs_f64(),
            "Keeper loop started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.run_once() => outcome,
            };

            if let Err(e) = outcome {
                error!(error = %e, "Loop error: {}", e.reason());
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!(
            iterations = self.stats.iterations,
            reports = self.stats.reports,
            failures = self.stats.failures,
            drift_reports = self.stats.drift_reports,
            "Keeper loop stopped"
        );
        self.stats
    }
}
