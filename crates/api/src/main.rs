//! Property Price Estimator - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== Property Price Estimator v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Loading artifacts: scaler={}, model={}",
        config.artifacts.scaler_path, config.artifacts.model_path
    );

    run_server(config).await
}
