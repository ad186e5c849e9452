//! Configuration module for keeper settings and environment loading
//!
//! This module provides:
//! - Configuration types (`KeeperConfig`, `ActuationConfig`, `ReportFormat`)
//! - Environment loading functionality (`load_config`)
//! - Logging configuration (`init_logging`)

mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{ActuationConfig, KeeperConfig, ReportFormat};

// Re-export loader functions
pub use loader::{load_config, load_config_from_map, load_config_with};

// Re-export logging functions
pub use logging::init_logging;
