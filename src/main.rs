//! Peg Keeper Entry Point
//!
//! Orchestrates:
//! 1. Config + logging initialization
//! 2. Chain reader construction
//! 3. Keeper loop on its own task
//! 4. Ctrl+C graceful shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use peg_keeper::chain::{ChainReader, EthersChainReader};
use peg_keeper::config::{init_logging, load_config};
use peg_keeper::core::{KeeperLoop, TracingSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // 1. Config + logging
    // =========================================================================
    dotenvy::dotenv().ok();
    init_logging();

    info!("=== Peg Keeper (price + regimes) ===");

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("[ERROR] Configuration failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    config.log_summary();

    // =========================================================================
    // 2. Chain reader
    // =========================================================================
    let reader = match EthersChainReader::connect(&config) {
        Ok(reader) => reader,
        Err(e) => {
            error!("[ERROR] Chain reader setup failed: {}", e);
            std::process::exit(1);
        }
    };
    reader.verify_chain_id(config.chain_id).await;
    let reader: Arc<dyn ChainReader> = Arc::new(reader);

    // =========================================================================
    // 3. Keeper loop
    // =========================================================================
    let sink = Arc::new(TracingSink::new(config.report_format));
    let keeper = KeeperLoop::from_config(reader, &config, sink);

    let cancel = CancellationToken::new();
    let keeper_handle = tokio::spawn(keeper.run(cancel.clone()));

    // =========================================================================
    // 4. Wait for Ctrl+C → graceful shutdown
    // =========================================================================
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("[SHUTDOWN] Graceful shutdown initiated");
                shutdown.cancel();
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for Ctrl+C signal");
            }
        }
    });

    match keeper_handle.await {
        Ok(stats) => {
            info!(iterations = stats.iterations, failures = stats.failures, "=== Shutdown complete ===");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Keeper task aborted");
            std::process::exit(1);
        }
    }
}
