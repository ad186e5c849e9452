//! Regime classification
//!
//! Maps the current pool tick and the vault's configured tick ranges to the
//! regime the vault *should* be in. Everything here is pure: no I/O, no
//! clock, no history.
//!
//! # Ranges
//! The vault configures three nested inclusive tick intervals:
//! - **Normal**: tight band around the peg
//! - **Mild**: wider band, configured symmetrically about tick zero
//! - **Severe**: everything outside Mild
//!
//! The above-peg Mild boundary is taken as the mirror of `mild.tick_lower`
//! (`tick <= -mild.tick_lower`). The ranges read from chain cannot confirm
//! that the vault really is symmetric, so an asymmetric Mild range is
//! classified with the mirrored bound anyway.

use std::fmt;

use serde::Serialize;

/// Target regime of the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Regime {
    Normal,
    Mild,
    Severe,
}

impl Regime {
    /// On-chain ordinal (`0=Normal, 1=Mild, 2=Severe`)
    pub fn ordinal(self) -> u8 {
        match self {
            Regime::Normal => 0,
            Regime::Mild => 1,
            Regime::Severe => 2,
        }
    }

    /// Decode an on-chain ordinal; `None` for anything outside 0..=2
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(Regime::Normal),
            1 => Some(Regime::Mild),
            2 => Some(Regime::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Normal => write!(f, "Normal"),
            Regime::Mild => write!(f, "Mild"),
            Regime::Severe => write!(f, "Severe"),
        }
    }
}

/// Regime as read from the vault's `activeRegime()`
///
/// Unrecognized ordinals are kept verbatim so they can be displayed
/// rather than coerced into a known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActiveRegime {
    Known(Regime),
    Unknown(u8),
}

impl From<u8> for ActiveRegime {
    fn from(value: u8) -> Self {
        match Regime::from_ordinal(value) {
            Some(regime) => ActiveRegime::Known(regime),
            None => ActiveRegime::Unknown(value),
        }
    }
}

impl fmt::Display for ActiveRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveRegime::Known(regime) => write!(f, "{}", regime),
            ActiveRegime::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

/// Inclusive tick interval as stored by the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub enabled: bool,
}

impl TickRange {
    pub fn new(tick_lower: i32, tick_upper: i32, enabled: bool) -> Self {
        Self {
            tick_lower,
            tick_upper,
            enabled,
        }
    }

    /// Shorthand for a range that is switched off
    pub fn disabled(tick_lower: i32, tick_upper: i32) -> Self {
        Self::new(tick_lower, tick_upper, false)
    }

    /// `tick_lower <= tick <= tick_upper`, ignoring `enabled`
    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick <= self.tick_upper
    }

    /// Bounds check gated by `enabled`
    pub fn admits(&self, tick: i32) -> bool {
        self.enabled && self.contains(tick)
    }

    /// Mirror of the lower bound, used as the above-peg boundary
    ///
    /// Widened to i64 so `-i32::MIN` cannot overflow.
    pub fn mirrored_upper(&self) -> i64 {
        -(self.tick_lower as i64)
    }
}

/// The three ranges read from the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegimeConfig {
    pub normal: TickRange,
    pub mild: TickRange,
    pub severe: TickRange,
}

/// Per-range membership flags for display
///
/// `in_normal` is a plain bounds check; `in_mild` and `in_severe` also
/// require the range to be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub in_normal: bool,
    pub in_mild: bool,
    pub in_severe: bool,
}

impl Membership {
    pub fn of(tick: i32, config: &RegimeConfig) -> Self {
        Self {
            in_normal: config.normal.contains(tick),
            in_mild: config.mild.admits(tick),
            in_severe: config.severe.admits(tick),
        }
    }
}

/// Outcome of a classification, distinguishing the disabled-Normal fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The tick was placed against the configured ranges
    Classified(Regime),
    /// Normal range disabled; `Normal` returned without looking at the tick
    Fallback,
}

impl Classification {
    pub fn regime(self) -> Regime {
        match self {
            Classification::Classified(regime) => regime,
            Classification::Fallback => Regime::Normal,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Classification::Fallback)
    }
}

/// Classify `tick` against `config`, keeping track of the fallback case
pub fn classify(tick: i32, config: &RegimeConfig) -> Classification {
    let normal = &config.normal;
    if !normal.enabled {
        return Classification::Fallback;
    }

    if normal.contains(tick) {
        return Classification::Classified(Regime::Normal);
    }

    let mild = &config.mild;
    let regime = if tick < normal.tick_lower {
        // Below peg
        if mild.enabled && tick >= mild.tick_lower {
            Regime::Mild
        } else {
            Regime::Severe
        }
    } else if tick > normal.tick_upper {
        // Above peg, mirrored Mild boundary
        if mild.enabled && (tick as i64) <= mild.mirrored_upper() {
            Regime::Mild
        } else {
            Regime::Severe
        }
    } else {
        // Only reachable with an inverted normal range
        Regime::Normal
    };

    Classification::Classified(regime)
}

/// Target regime for `tick`; a disabled Normal range yields `Normal`
pub fn compute_target_regime(tick: i32, config: &RegimeConfig) -> Regime {
    classify(tick, config).regime()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config_b() -> RegimeConfig {
        RegimeConfig {
            normal: TickRange::new(-10, 10, true),
            mild: TickRange::new(-50, -11, true),
            severe: TickRange::disabled(0, 0),
        }
    }

    #[test]
    fn test_scenario_a_tick_at_peg_is_normal() {
        let config = RegimeConfig {
            normal: TickRange::new(-10, 10, true),
            mild: TickRange::disabled(0, 0),
            severe: TickRange::disabled(0, 0),
        };
        assert_eq!(compute_target_regime(0, &config), Regime::Normal);
    }

    #[test]
    fn test_scenario_b_below_peg_within_mild() {
        assert_eq!(compute_target_regime(-15, &config_b()), Regime::Mild);
    }

    #[test]
    fn test_scenario_c_below_mild_is_severe() {
        assert_eq!(compute_target_regime(-60, &config_b()), Regime::Severe);
    }

    #[test]
    fn test_scenario_d_above_peg_uses_mirrored_bound() {
        assert_eq!(compute_target_regime(60, &config_b()), Regime::Mild);
        assert_eq!(compute_target_regime(50, &config_b()), Regime::Mild);
    }

    #[test]
    fn test_scenario_e_above_mirrored_bound_is_severe() {
        assert_eq!(compute_target_regime(70, &config_b()), Regime::Severe);
        assert_eq!(compute_target_regime(51, &config_b()), Regime::Severe);
    }

    #[test]
    fn test_normal_bounds_are_inclusive() {
        let config = config_b();
        assert_eq!(compute_target_regime(-10, &config), Regime::Normal);
        assert_eq!(compute_target_regime(10, &config), Regime::Normal);
        assert_eq!(compute_target_regime(-11, &config), Regime::Mild);
        assert_eq!(compute_target_regime(11, &config), Regime::Mild);
    }

    #[test]
    fn test_mild_lower_bound_inclusive() {
        let config = config_b();
        assert_eq!(compute_target_regime(-50, &config), Regime::Mild);
        assert_eq!(compute_target_regime(-51, &config), Regime::Severe);
    }

    #[test]
    fn test_disabled_mild_goes_straight_to_severe() {
        let mut config = config_b();
        config.mild.enabled = false;
        assert_eq!(compute_target_regime(-15, &config), Regime::Severe);
        assert_eq!(compute_target_regime(15, &config), Regime::Severe);
    }

    #[test]
    fn test_asymmetric_mild_still_uses_mirrored_bound() {
        // Upper side configured to 30, but classification mirrors -50
        let mut config = config_b();
        config.mild = TickRange::new(-50, 30, true);
        assert_eq!(compute_target_regime(40, &config), Regime::Mild);
    }

    #[test]
    fn test_disabled_normal_reports_fallback() {
        let mut config = config_b();
        config.normal.enabled = false;
        let outcome = classify(-1000, &config);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.regime(), Regime::Normal);
    }

    #[test]
    fn test_extreme_ticks_do_not_overflow() {
        let config = RegimeConfig {
            normal: TickRange::new(-10, 10, true),
            mild: TickRange::new(i32::MIN, -11, true),
            severe: TickRange::disabled(0, 0),
        };
        assert_eq!(compute_target_regime(i32::MAX, &config), Regime::Mild);
        assert_eq!(compute_target_regime(i32::MIN, &config), Regime::Mild);
    }

    #[test]
    fn test_inverted_normal_range_falls_back_to_normal() {
        let config = RegimeConfig {
            normal: TickRange::new(10, -10, true),
            mild: TickRange::new(-50, -11, true),
            severe: TickRange::disabled(0, 0),
        };
        assert_eq!(compute_target_regime(0, &config), Regime::Normal);
    }

    #[test]
    fn test_active_regime_preserves_unknown_ordinal() {
        assert_eq!(ActiveRegime::from(1), ActiveRegime::Known(Regime::Mild));
        assert_eq!(ActiveRegime::from(7), ActiveRegime::Unknown(7));
        assert_eq!(ActiveRegime::from(7).to_string(), "Unknown(7)");
        assert_eq!(ActiveRegime::from(2).to_string(), "Severe");
    }

    #[test]
    fn test_ordinal_round_trip_for_known_regimes() {
        for regime in [Regime::Normal, Regime::Mild, Regime::Severe] {
            assert_eq!(Regime::from_ordinal(regime.ordinal()), Some(regime));
        }
        assert_eq!(Regime::from_ordinal(3), None);
    }

    #[test]
    fn test_membership_gating() {
        let config = RegimeConfig {
            normal: TickRange::new(-10, 10, false),
            mild: TickRange::new(-50, 50, false),
            severe: TickRange::new(-200, 200, true),
        };
        let m = Membership::of(5, &config);
        // Normal membership ignores the enabled flag
        assert!(m.in_normal);
        assert!(!m.in_mild);
        assert!(m.in_severe);
    }

    fn arb_range() -> impl Strategy<Value = TickRange> {
        (-887_272i32..=887_272, -887_272i32..=887_272, any::<bool>())
            .prop_map(|(a, b, enabled)| TickRange::new(a.min(b), a.max(b), enabled))
    }

    fn arb_config() -> impl Strategy<Value = RegimeConfig> {
        (arb_range(), arb_range(), arb_range()).prop_map(|(normal, mild, severe)| RegimeConfig {
            normal,
            mild,
            severe,
        })
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(tick in any::<i32>(), config in arb_config()) {
            prop_assert_eq!(compute_target_regime(tick, &config), compute_target_regime(tick, &config));
        }

        #[test]
        fn prop_ticks_inside_enabled_normal_are_normal(config in arb_config(), offset in 0u32..1_000_000) {
            let mut config = config;
            config.normal.enabled = true;
            let width = (config.normal.tick_upper as i64 - config.normal.tick_lower as i64) as u64;
            let tick = (config.normal.tick_lower as i64 + (offset as u64 % (width + 1)) as i64) as i32;
            prop_assert_eq!(compute_target_regime(tick, &config), Regime::Normal);
        }

        #[test]
        fn prop_disabled_normal_always_normal(tick in any::<i32>(), config in arb_config()) {
            let mut config = config;
            config.normal.enabled = false;
            prop_assert_eq!(compute_target_regime(tick, &config), Regime::Normal);
        }
    }
}
