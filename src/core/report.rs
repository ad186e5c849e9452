//! Decision derivation and report output
//!
//! A [`Decision`] is derived from a [`Snapshot`] and never stored. A
//! [`Report`] pairs the two with a timestamp and renders the per-iteration
//! status line:
//!
//! ```text
//! [2024-01-01T00:00:00.000Z] tick=-15 price=0.998501 dev=-0.15% active=Normal target=Mild needsUpdate=yes normal=[-10,10] enabled=yes in=no mild=[-50,-11] enabled=yes in=yes severe=[-200,-51] enabled=no in=no
//! ```
//!
//! Everything but the timestamp is a function of the snapshot.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ReportFormat;
use crate::core::price::bps_to_percent;
use crate::core::regime::{classify, ActiveRegime, Membership, Regime, TickRange};
use crate::core::snapshot::Snapshot;
use crate::error::AppError;

/// Tracing target for report lines
pub const REPORT_TARGET: &str = "peg_keeper::report";

/// What the keeper concludes from one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub target_regime: Regime,
    /// Normal range was disabled, so `target_regime` is the fallback
    pub fell_back: bool,
    pub needs_update: bool,
    pub membership: Membership,
}

impl Decision {
    pub fn evaluate(snapshot: &Snapshot) -> Self {
        let outcome = classify(snapshot.tick, &snapshot.config);
        let target_regime = outcome.regime();
        Self {
            target_regime,
            fell_back: outcome.is_fallback(),
            needs_update: snapshot.active_regime != ActiveRegime::Known(target_regime),
            membership: Membership::of(snapshot.tick, &snapshot.config),
        }
    }
}

/// One iteration's output
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub snapshot: Snapshot,
    pub decision: Decision,
}

impl Report {
    pub fn new(timestamp: DateTime<Utc>, snapshot: Snapshot) -> Self {
        let decision = Decision::evaluate(&snapshot);
        Self {
            timestamp,
            snapshot,
            decision,
        }
    }

    /// ISO-8601 UTC with millisecond precision
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Render as a single JSON object
    pub fn to_json(&self) -> Result<String, AppError> {
        let s = &self.snapshot;
        let d = &self.decision;
        let view = ReportJson {
            timestamp: self.timestamp_iso(),
            tick: s.tick,
            price: s.price,
            deviation_bps: s.deviation_bps,
            active: s.active_regime.to_string(),
            target: d.target_regime.to_string(),
            needs_update: d.needs_update,
            fell_back: d.fell_back,
            normal: RangeJson::new(&s.config.normal, d.membership.in_normal),
            mild: RangeJson::new(&s.config.mild, d.membership.in_mild),
            severe: RangeJson::new(&s.config.severe, d.membership.in_severe),
        };
        Ok(serde_json::to_string(&view)?)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, name: &str, range: &TickRange, member: bool) -> fmt::Result {
    write!(
        f,
        "{}=[{},{}] enabled={} in={}",
        name,
        range.tick_lower,
        range.tick_upper,
        yes_no(range.enabled),
        yes_no(member)
    )
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        let d = &self.decision;
        write!(
            f,
            "[{}] tick={} price={:.6} dev={:.2}% active={} target={} needsUpdate={} ",
            self.timestamp_iso(),
            s.tick,
            s.price,
            bps_to_percent(s.deviation_bps),
            s.active_regime,
            d.target_regime,
            yes_no(d.needs_update)
        )?;
        write_range(f, "normal", &s.config.normal, d.membership.in_normal)?;
        f.write_str(" ")?;
        write_range(f, "mild", &s.config.mild, d.membership.in_mild)?;
        f.write_str(" ")?;
        write_range(f, "severe", &s.config.severe, d.membership.in_severe)
    }
}

#[derive(Serialize)]
struct RangeJson {
    lower: i32,
    upper: i32,
    enabled: bool,
    member: bool,
}

impl RangeJson {
    fn new(range: &TickRange, member: bool) -> Self {
        Self {
            lower: range.tick_lower,
            upper: range.tick_upper,
            enabled: range.enabled,
            member,
        }
    }
}

#[derive(Serialize)]
struct ReportJson {
    timestamp: String,
    tick: i32,
    price: f64,
    deviation_bps: f64,
    active: String,
    target: String,
    needs_update: bool,
    fell_back: bool,
    normal: RangeJson,
    mild: RangeJson,
    severe: RangeJson,
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination for iteration reports
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: &Report);
}

/// Emits reports as `info` events under [`REPORT_TARGET`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    format: ReportFormat,
}

impl TracingSink {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }
}

impl ReportSink for TracingSink {
    fn emit(&self, report: &Report) {
        match self.format {
            ReportFormat::Line => info!(target: REPORT_TARGET, "{}", report),
            ReportFormat::Json => match report.to_json() {
                Ok(json) => info!(target: REPORT_TARGET, "{}", json),
                Err(e) => {
                    tracing::error!(error = %e, "Report serialization failed, falling back to line");
                    info!(target: REPORT_TARGET, "{}", report);
                }
            },
        }
    }
}

/// Keeps every report in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Report>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: &Report) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
    }
}
