//! ethers-rs implementation of [`ChainReader`]
//!
//! Contract bindings are built at runtime from the human-readable ABI of
//! the two contracts the keeper reads. One HTTP provider is created by
//! [`EthersChainReader::connect`] and reused for every call; there is no
//! process-wide provider.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::parse_abi;
use ethers::contract::{Contract, ContractError};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, H256, U256};
use tracing::{debug, info, warn};

use crate::chain::errors::{ChainError, ChainResult};
use crate::chain::traits::ChainReader;
use crate::config::KeeperConfig;
use crate::core::regime::TickRange;
use crate::error::AppError;

/// Pool state reader (Uniswap v4 `StateView`)
pub const STATE_VIEW_ABI: &[&str] = &[
    "function getSlot0(bytes32 poolId) external view returns (uint160 sqrtPriceX96, int24 tick, uint24 protocolFee, uint24 lpFee)",
];

/// Regime vault getters
pub const VAULT_ABI: &[&str] = &[
    "function activeRegime() external view returns (uint8)",
    "function normalRange() external view returns (int24 tickLower, int24 tickUpper, bool enabled)",
    "function mildRange() external view returns (int24 tickLower, int24 tickUpper, bool enabled)",
    "function severeRange() external view returns (int24 tickLower, int24 tickUpper, bool enabled)",
];

type HttpContract = Contract<Provider<Http>>;

/// Chain reader over a JSON-RPC HTTP endpoint
pub struct EthersChainReader {
    provider: Arc<Provider<Http>>,
    state_view: HttpContract,
    vault: HttpContract,
}

impl EthersChainReader {
    /// Build the provider and both contract bindings from configuration
    ///
    /// No network traffic happens here; a bad endpoint only shows up on
    /// the first read.
    pub fn connect(config: &KeeperConfig) -> Result<Self, AppError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| AppError::Config(format!("Invalid RPC_URL '{}': {}", config.rpc_url, e)))?;
        let provider = Arc::new(provider);

        let reader = Self::with_provider(provider, config.state_view, config.vault)?;
        info!(
            state_view = ?config.state_view,
            vault = ?config.vault,
            "Chain reader initialized"
        );
        Ok(reader)
    }

    /// Bind contracts to an existing provider
    pub fn with_provider(
        provider: Arc<Provider<Http>>,
        state_view: Address,
        vault: Address,
    ) -> Result<Self, AppError> {
        let state_view_abi =
            parse_abi(STATE_VIEW_ABI).map_err(|e| AppError::Chain(ChainError::Abi(e.to_string())))?;
        let vault_abi =
            parse_abi(VAULT_ABI).map_err(|e| AppError::Chain(ChainError::Abi(e.to_string())))?;

        Ok(Self {
            state_view: Contract::new(state_view, state_view_abi, Arc::clone(&provider)),
            vault: Contract::new(vault, vault_abi, Arc::clone(&provider)),
            provider,
        })
    }

    /// Compare the node's chain id with the configured one
    ///
    /// Mismatch or lookup failure is only logged.
    pub async fn verify_chain_id(&self, expected: u64) {
        match self.provider.get_chainid().await {
            Ok(actual) if actual == U256::from(expected) => {
                debug!(chain_id = expected, "Chain id confirmed");
            }
            Ok(actual) => {
                warn!(
                    expected = expected,
                    actual = %actual,
                    "RPC endpoint reports a different chain id than CHAIN_ID"
                );
            }
            Err(e) => {
                warn!(error = %e, "Could not query chain id from RPC endpoint");
            }
        }
    }

    async fn read_range(&self, method: &'static str) -> ChainResult<TickRange> {
        let (tick_lower, tick_upper, enabled): (i32, i32, bool) = self
            .vault
            .method::<_, (i32, i32, bool)>(method, ())
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(|e| map_contract_error(method, e))?;
        Ok(TickRange::new(tick_lower, tick_upper, enabled))
    }
}

/// Revert reason if one decodes, otherwise the provider message
fn map_contract_error<M: Middleware>(method: &'static str, err: ContractError<M>) -> ChainError {
    if let Some(reason) = err.decode_revert::<String>() {
        return ChainError::Revert { method, reason };
    }
    match err {
        ContractError::DetokenizationError(e) => ChainError::Abi(format!("{}: {}", method, e)),
        ContractError::AbiError(e) => ChainError::Abi(format!("{}: {}", method, e)),
        other => ChainError::Rpc {
            method,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl ChainReader for EthersChainReader {
    async fn pool_tick(&self, pool_id: H256) -> ChainResult<i32> {
        let (_sqrt_price_x96, tick, _protocol_fee, _lp_fee): (U256, i32, u32, u32) = self
            .state_view
            .method::<_, (U256, i32, u32, u32)>("getSlot0", pool_id)
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(|e| map_contract_error("getSlot0", e))?;
        Ok(tick)
    }

    async fn active_regime(&self) -> ChainResult<u8> {
        self.vault
            .method::<_, u8>("activeRegime", ())
            .map_err(|e| ChainError::Abi(e.to_string()))?
            .call()
            .await
            .map_err(|e| map_contract_error("activeRegime", e))
    }

    async fn normal_range(&self) -> ChainResult<TickRange> {
        self.read_range("normalRange").await
    }

    async fn mild_range(&self) -> ChainResult<TickRange> {
        self.read_range("mildRange").await
    }

    async fn severe_range(&self) -> ChainResult<TickRange> {
        self.read_range("severeRange").await
    }
}
