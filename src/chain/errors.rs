//! Chain reader error types
//!
//! All failures of the read-only chain calls are wrapped in `ChainError`.
//! The keeper loop treats every variant as transient.

use thiserror::Error;

/// Errors produced by a [`ChainReader`](crate::chain::ChainReader) call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Contract call reverted with a decodable reason
    #[error("{method} reverted: {reason}")]
    Revert { method: &'static str, reason: String },

    /// Transport or node-side failure
    #[error("RPC error in {method}: {message}")]
    Rpc { method: &'static str, message: String },

    /// ABI encoding/decoding failure
    #[error("ABI error: {0}")]
    Abi(String),

    /// The whole fetch did not complete in time
    #[error("Chain read timed out after {0}ms")]
    Timeout(u64),
}

impl ChainError {
    /// Most specific detail available for a single log line.
    ///
    /// A revert reason wins over anything else; otherwise the full message.
    pub fn reason(&self) -> String {
        match self {
            ChainError::Revert { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for chain reads
pub type ChainResult<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_display() {
        let err = ChainError::Revert {
            method: "activeRegime",
            reason: "paused".to_string(),
        };
        assert_eq!(err.to_string(), "activeRegime reverted: paused");
    }

    #[test]
    fn test_reason_prefers_revert_reason() {
        let err = ChainError::Revert {
            method: "getSlot0",
            reason: "pool not initialized".to_string(),
        };
        assert_eq!(err.reason(), "pool not initialized");
    }

    #[test]
    fn test_reason_falls_back_to_message() {
        let err = ChainError::Rpc {
            method: "normalRange",
            message: "connection refused".to_string(),
        };
        assert_eq!(err.reason(), "RPC error in normalRange: connection refused");
    }

    #[test]
    fn test_timeout_display() {
        let err = ChainError::Timeout(5000);
        assert_eq!(err.to_string(), "Chain read timed out after 5000ms");
    }
}
