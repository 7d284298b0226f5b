//! HTTP server for the crew pay engine.
//!
//! Reads `CREW_PAY_CONFIG_DIR` (default `./config/crew`) and
//! `CREW_PAY_ADDR` (default `0.0.0.0:8080`). Log levels follow `RUST_LOG`.

use std::env;

use crew_pay_engine::api::{AppState, create_router};
use crew_pay_engine::config::ConfigLoader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/crew";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_dir = env::var("CREW_PAY_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let addr = env::var("CREW_PAY_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());

    let config = match ConfigLoader::load(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            error!(config_dir = %config_dir, error = %err, "Failed to load configuration");
            return Err(err.into());
        }
    };
    info!(
        config_dir = %config_dir,
        airline = %config.config().airline().code,
        rate_versions = config.config().rates().versions().len(),
        "Configuration loaded"
    );

    let router = create_router(AppState::in_memory(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, router).await?;
    Ok(())
}
