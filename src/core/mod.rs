//! Core module - Price model, regime classification, snapshots, keeper loop
//!
//! # Module Architecture
//!
//! This module uses **explicit re-exports** instead of glob exports (`pub use module::*`)
//! to provide better API visibility and prevent accidental public API changes.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{compute_target_regime, KeeperLoop, SnapshotFetcher};
//! ```

pub mod keeper;
pub mod price;
pub mod regime;
pub mod report;
pub mod snapshot;

// Explicit re-exports for price module
pub use price::{bps_to_percent, deviation_bps_from_peg, tick_to_price, DEFAULT_PEG};

// Explicit re-exports for regime module
pub use regime::{
    classify, compute_target_regime, ActiveRegime, Classification, Membership, Regime,
    RegimeConfig, TickRange,
};

// Explicit re-exports for snapshot module
pub use snapshot::{Snapshot, SnapshotFetcher};

// Explicit re-exports for report module
pub use report::{Decision, MemorySink, Report, ReportSink, TracingSink, REPORT_TARGET};

// Explicit re-exports for keeper module
pub use keeper::{KeeperLoop, LoopStats};
