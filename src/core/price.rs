//! Tick ↔ price conversion and peg deviation
//!
//! Prices are `1.0001^tick` in plain f64. Deviation is expressed in basis
//! points and rounded half away from zero (`f64::round`), so a deviation of
//! exactly 312.5 bps reports as 313 and -312.5 bps as -313.
//!
//! The rounded deviation stays an integer-valued f64: near the protocol's
//! tick limits it exceeds every native integer range (about 3.4e42 bps at
//! `MAX_TICK`).

/// Base of the tick price scale
pub const TICK_BASE: f64 = 1.0001;

/// Basis points per unit of price
pub const BPS_PER_UNIT: f64 = 10_000.0;

/// Default peg price
pub const DEFAULT_PEG: f64 = 1.0;

/// Smallest tick the pool protocol accepts
pub const MIN_TICK: i32 = -887_272;

/// Largest tick the pool protocol accepts
pub const MAX_TICK: i32 = 887_272;

/// Price implied by `tick`
pub fn tick_to_price(tick: i32) -> f64 {
    TICK_BASE.powf(tick as f64)
}

/// Signed deviation of `price` from `peg` in basis points, rounded to a whole number
pub fn deviation_bps_from_peg(price: f64, peg: f64) -> f64 {
    // `+ 0.0` folds a rounded -0.0 into 0.0
    ((price - peg) * BPS_PER_UNIT).round() + 0.0
}

/// Basis points rendered as a percentage (`125` → `1.25`)
pub fn bps_to_percent(bps: f64) -> f64 {
    bps / 100.0
}
