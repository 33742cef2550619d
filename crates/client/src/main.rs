//! Slipbowl command-line client.
//!
//! Composition root: loads `.env`, configures logging, reads the store and
//! client configuration from the environment, and runs a scripted table on
//! an in-process store.
//!
//! ```bash
//! slipbowl Ann Bo Cy
//! RUST_LOG=debug SLIPBOWL_LIVENESS_TIMEOUT_MS=1500 slipbowl
//! ```

mod logging;
mod table;

use anyhow::Result;
use runtime::{ClientConfig, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _log_guard = logging::setup_logging()?;

    let store_config = StoreConfig::from_env();
    let client_config = ClientConfig::from_env();
    tracing::info!(
        "Liveness timeout: {:?}, heartbeat: {:?}",
        store_config.liveness_timeout,
        client_config.heartbeat_interval
    );

    let mut nicknames: Vec<String> = std::env::args().skip(1).collect();
    if nicknames.is_empty() {
        nicknames = ["Ann", "Bo", "Cy"].map(String::from).to_vec();
    }

    table::run(&nicknames, store_config, client_config).await?;

    tracing::info!("Table closed");
    Ok(())
}
