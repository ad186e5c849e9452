//! Configuration loader for environment variables
//!
//! Values come from the process environment (populated from `.env` by
//! `dotenvy` in `main`). Parsing goes through a lookup function so tests
//! can supply a map instead of touching the real environment.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::{Address, H256};

use crate::error::{AppError, Result};

use super::types::{
    ActuationConfig, KeeperConfig, ReportFormat, DEFAULT_CHAIN_ID, DEFAULT_COOLDOWN_SECONDS,
    DEFAULT_DEPEG_BPS, DEFAULT_MAX_FEE_GWEI, DEFAULT_POLL_SECONDS,
};
use crate::core::price::DEFAULT_PEG;

/// Load configuration from the process environment
///
/// # Returns
/// * `Ok(KeeperConfig)` - All required values present and parseable
/// * `Err(AppError::Config)` - Message names the offending variable
pub fn load_config() -> Result<KeeperConfig> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Load configuration from an in-memory map (useful for testing)
pub fn load_config_from_map(vars: &HashMap<String, String>) -> Result<KeeperConfig> {
    load_config_with(|key| vars.get(key).cloned())
}

/// Load configuration through an arbitrary lookup
pub fn load_config_with<F>(lookup: F) -> Result<KeeperConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    // Required, checked in a fixed order so the first missing one is reported
    let rpc_url = get("RPC_URL")
        .or_else(|| get("ARB_RPC"))
        .ok_or_else(|| missing("RPC_URL"))?;
    let pool_id = get("POOL_ID").ok_or_else(|| missing("POOL_ID"))?;
    let state_view = get("STATE_VIEW_ADDRESS").ok_or_else(|| missing("STATE_VIEW_ADDRESS"))?;
    let vault = get("VAULT_ADDRESS").ok_or_else(|| missing("VAULT_ADDRESS"))?;

    let pool_id: H256 = parse_value("POOL_ID", &pool_id)?;
    let state_view: Address = parse_value("STATE_VIEW_ADDRESS", &state_view)?;
    let vault: Address = parse_value("VAULT_ADDRESS", &vault)?;

    let hook = get("HOOK_ADDRESS")
        .map(|raw| parse_value::<Address>("HOOK_ADDRESS", &raw))
        .transpose()?;

    let chain_id = parse_or("CHAIN_ID", get("CHAIN_ID"), DEFAULT_CHAIN_ID)?;

    let poll_seconds = parse_or("POLL_SECONDS", get("POLL_SECONDS"), DEFAULT_POLL_SECONDS)?;
    if poll_seconds == 0 {
        return Err(AppError::Config("POLL_SECONDS must be > 0".to_string()));
    }

    let target_price: f64 = parse_or("TARGET_PRICE", get("TARGET_PRICE"), DEFAULT_PEG)?;
    if !target_price.is_finite() || target_price <= 0.0 {
        return Err(AppError::Config(format!(
            "TARGET_PRICE must be a positive number (got {})",
            target_price
        )));
    }

    let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
        Some(raw) => {
            let secs: u64 = parse_value("FETCH_TIMEOUT_SECS", &raw)?;
            (secs > 0).then(|| Duration::from_secs(secs))
        }
        None => None,
    };

    let report_format = match get("REPORT_FORMAT") {
        Some(raw) => raw
            .parse::<ReportFormat>()
            .map_err(|e| AppError::Config(format!("REPORT_FORMAT: {}", e)))?,
        None => ReportFormat::default(),
    };

    let actuation = ActuationConfig {
        depeg_bps: parse_or("DEPEG_BPS", get("DEPEG_BPS"), DEFAULT_DEPEG_BPS)?,
        cooldown: Duration::from_secs(parse_or(
            "COOLDOWN_SECONDS",
            get("COOLDOWN_SECONDS"),
            DEFAULT_COOLDOWN_SECONDS,
        )?),
        max_fee_gwei: parse_or("MAX_FEE_GWEI", get("MAX_FEE_GWEI"), DEFAULT_MAX_FEE_GWEI)?,
    };

    Ok(KeeperConfig {
        rpc_url,
        signer_key: get("PRIVATE_KEY"),
        pool_id,
        state_view,
        vault,
        hook,
        chain_id,
        poll_interval: Duration::from_secs(poll_seconds),
        target_price,
        fetch_timeout,
        report_format,
        actuation,
    })
}

fn missing(key: &str) -> AppError {
    AppError::Config(format!("Missing {}", key))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", key, raw, e)))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const POOL_ID: &str = "0x8aa4e11cbdf30eedc92100f4c8a31ff748e201d44712cc8c90d189edaa8e4e47";
    const STATE_VIEW: &str = "0x76fd297e2d437cd7f76d50f01afe6160f86e9990";
    const VAULT: &str = "0x1111111111111111111111111111111111111111";

    fn required() -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("RPC_URL".to_string(), "http://localhost:8545".to_string());
        vars.insert("POOL_ID".to_string(), POOL_ID.to_string());
        vars.insert("STATE_VIEW_ADDRESS".to_string(), STATE_VIEW.to_string());
        vars.insert("VAULT_ADDRESS".to_string(), VAULT.to_string());
        vars
    }

    fn expect_config_error(vars: &HashMap<String, String>) -> String {
        match load_config_from_map(vars) {
            Err(AppError::Config(msg)) => msg,
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_map(&required()).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.pool_id, POOL_ID.parse::<H256>().unwrap());
        assert_eq!(config.vault, VAULT.parse::<Address>().unwrap());
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.target_price, 1.0);
        assert!(config.signer_key.is_none());
        assert!(config.hook.is_none());
        assert!(config.fetch_timeout.is_none());
    }

    #[test]
    fn test_each_missing_required_field_is_named() {
        for key in ["RPC_URL", "POOL_ID", "STATE_VIEW_ADDRESS", "VAULT_ADDRESS"] {
            let mut vars = required();
            vars.remove(key);
            let msg = expect_config_error(&vars);
            assert_eq!(msg, format!("Missing {}", key));
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = required();
        vars.insert("VAULT_ADDRESS".to_string(), "   ".to_string());
        assert_eq!(expect_config_error(&vars), "Missing VAULT_ADDRESS");
    }

    #[test]
    fn test_arb_rpc_alias() {
        let mut vars = required();
        vars.remove("RPC_URL");
        vars.insert("ARB_RPC".to_string(), "http://arb:8545".to_string());
        let config = load_config_from_map(&vars).unwrap();
        assert_eq!(config.rpc_url, "http://arb:8545");
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = required();
        vars.insert("CHAIN_ID".to_string(), "42161".to_string());
        vars.insert("POLL_SECONDS".to_string(), "20".to_string());
        vars.insert("TARGET_PRICE".to_string(), "0.999".to_string());
        vars.insert("DEPEG_BPS".to_string(), "50".to_string());
        vars.insert("COOLDOWN_SECONDS".to_string(), "600".to_string());
        vars.insert("MAX_FEE_GWEI".to_string(), "12.5".to_string());
        vars.insert("FETCH_TIMEOUT_SECS".to_string(), "10".to_string());
        vars.insert("REPORT_FORMAT".to_string(), "json".to_string());
        vars.insert("PRIVATE_KEY".to_string(), "0xabc".to_string());
        vars.insert("HOOK_ADDRESS".to_string(), VAULT.to_string());

        let config = load_config_from_map(&vars).unwrap();
        assert_eq!(config.chain_id, 42161);
        assert_eq!(config.poll_interval, Duration::from_secs(20));
        assert_eq!(config.target_price, 0.999);
        assert_eq!(config.actuation.depeg_bps, 50);
        assert_eq!(config.actuation.cooldown, Duration::from_secs(600));
        assert_eq!(config.actuation.max_fee_gwei, 12.5);
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.signer_key.as_deref(), Some("0xabc"));
        assert!(config.hook.is_some());
    }

    #[test]
    fn test_zero_fetch_timeout_disables_it() {
        let mut vars = required();
        vars.insert("FETCH_TIMEOUT_SECS".to_string(), "0".to_string());
        assert!(load_config_from_map(&vars).unwrap().fetch_timeout.is_none());
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut vars = required();
        vars.insert("STATE_VIEW_ADDRESS".to_string(), "not-an-address".to_string());
        let msg = expect_config_error(&vars);
        assert!(msg.contains("Invalid STATE_VIEW_ADDRESS"), "Got: {}", msg);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let mut vars = required();
        vars.insert("POLL_SECONDS".to_string(), "fast".to_string());
        let msg = expect_config_error(&vars);
        assert!(msg.contains("Invalid POLL_SECONDS"), "Got: {}", msg);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let mut vars = required();
        vars.insert("POLL_SECONDS".to_string(), "0".to_string());
        assert!(expect_config_error(&vars).contains("POLL_SECONDS"));
    }

    #[test]
    fn test_non_positive_target_price_is_rejected() {
        let mut vars = required();
        vars.insert("TARGET_PRICE".to_string(), "-1".to_string());
        assert!(expect_config_error(&vars).contains("TARGET_PRICE"));
    }

    #[test]
    #[serial(env)]
    fn test_load_config_reads_process_env() {
        for (key, value) in required() {
            std::env::set_var(key, value);
        }
        std::env::set_var("POLL_SECONDS", "7");

        let config = load_config().unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(7));

        for key in required().keys() {
            std::env::remove_var(key);
        }
        std::env::remove_var("POLL_SECONDS");
    }
}
