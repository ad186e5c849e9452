//! Configuration types for the keeper
//!
//! `KeeperConfig` is built once at startup and shared read-only for the
//! lifetime of the process.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::{Address, H256};

use crate::core::price::DEFAULT_PEG;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_POLL_SECONDS: u64 = 15;
pub const DEFAULT_DEPEG_BPS: u32 = 25;
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 300;
pub const DEFAULT_MAX_FEE_GWEI: f64 = 30.0;

// ============================================================================
// Enums
// ============================================================================

/// How report lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Single human-readable line (default)
    #[default]
    Line,
    /// One JSON object per report
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ReportFormat::Line),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Line => write!(f, "line"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Parameters of the not-yet-built actuation path
///
/// Loaded and logged so misconfiguration is visible, but nothing in the
/// observation loop reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuationConfig {
    /// Deviation that would trigger a regime change (bps)
    pub depeg_bps: u32,
    /// Minimum spacing between regime changes
    pub cooldown: Duration,
    /// Gas fee ceiling in gwei
    pub max_fee_gwei: f64,
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            depeg_bps: DEFAULT_DEPEG_BPS,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECONDS),
            max_fee_gwei: DEFAULT_MAX_FEE_GWEI,
        }
    }
}

/// Root keeper configuration
#[derive(Clone)]
pub struct KeeperConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Signing key for a future write path (never used for reads)
    pub signer_key: Option<String>,
    /// Pool identifier passed to `getSlot0`
    pub pool_id: H256,
    /// State reader contract
    pub state_view: Address,
    /// Regime vault contract
    pub vault: Address,
    /// Hook contract, informational only
    pub hook: Option<Address>,
    pub chain_id: u64,
    /// Sleep between iterations
    pub poll_interval: Duration,
    /// Peg price deviation is measured against
    pub target_price: f64,
    /// Upper bound on one snapshot fetch; `None` leaves timeouts to the transport
    pub fetch_timeout: Option<Duration>,
    pub report_format: ReportFormat,
    pub actuation: ActuationConfig,
}

impl KeeperConfig {
    /// Config with required fields set and every optional field defaulted
    pub fn new(rpc_url: impl Into<String>, pool_id: H256, state_view: Address, vault: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            signer_key: None,
            pool_id,
            state_view,
            vault,
            hook: None,
            chain_id: DEFAULT_CHAIN_ID,
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECONDS),
            target_price: DEFAULT_PEG,
            fetch_timeout: None,
            report_format: ReportFormat::default(),
            actuation: ActuationConfig::default(),
        }
    }

    /// Print the effective configuration at startup
    pub fn log_summary(&self) {
        tracing::info!("=== Keeper Configuration ===");
        tracing::info!("  - POOL_ID: {:?}", self.pool_id);
        tracing::info!("  - STATE_VIEW: {:?}", self.state_view);
        tracing::info!("  - VAULT: {:?}", self.vault);
        if let Some(hook) = self.hook {
            tracing::info!("  - HOOK: {:?}", hook);
        }
        tracing::info!("  - Chain id: {}", self.chain_id);
        tracing::info!("  - Poll interval: {:?}", self.poll_interval);
        tracing::info!("  - Target price: {}", self.target_price);
        match self.fetch_timeout {
            Some(timeout) => tracing::info!("  - Fetch timeout: {:?}", timeout),
            None => tracing::info!("  - Fetch timeout: delegated to RPC client"),
        }
        tracing::info!("  - Report format: {}", self.report_format);
        tracing::info!(
            "  - Actuation (unused): depeg={}bps cooldown={:?} max_fee={}gwei",
            self.actuation.depeg_bps,
            self.actuation.cooldown,
            self.actuation.max_fee_gwei
        );
        tracing::info!("============================");
    }
}

impl fmt::Debug for KeeperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeeperConfig")
            .field("rpc_url", &self.rpc_url)
            .field("signer_key", &self.signer_key.as_ref().map(|_| "***REDACTED***"))
            .field("pool_id", &self.pool_id)
            .field("state_view", &self.state_view)
            .field("vault", &self.vault)
            .field("hook", &self.hook)
            .field("chain_id", &self.chain_id)
            .field("poll_interval", &self.poll_interval)
            .field("target_price", &self.target_price)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("report_format", &self.report_format)
            .field("actuation", &self.actuation)
            .finish()
    }
}
