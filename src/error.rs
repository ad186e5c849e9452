//! Application-wide error types using thiserror
//!
//! Configuration problems are fatal at startup; chain errors are transient
//! and only surface here when a caller chooses to propagate them.

use crate::chain::errors::ChainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
