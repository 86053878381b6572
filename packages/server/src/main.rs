#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the shelter stats API server.
//!
//! Reads the dashboard config from `SHELTER_STATS_CONFIG` when set,
//! otherwise uses the embedded default.

use std::path::PathBuf;

use shelter_stats_dashboard::{Dashboard, DashboardConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config_path = std::env::var_os("SHELTER_STATS_CONFIG").map(PathBuf::from);
    let config = DashboardConfig::load_or_default(config_path.as_deref())?;
    let dashboard = Dashboard::from_config(config)?;

    shelter_stats_server::run_server(dashboard).await?;

    Ok(())
}
