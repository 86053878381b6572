#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the shelter dashboard.
//!
//! `summary` renders the dashboard once to stdout, `categories` lists the
//! animal types in the current snapshot and `serve` starts the JSON API.

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shelter_stats_analytics_models::CategorySelection;
use shelter_stats_dashboard::{Dashboard, DashboardConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "shelter_stats", about = "Animal shelter dashboard")]
struct Cli {
    /// Dashboard config file. Defaults to the embedded configuration.
    #[arg(long, global = true, env = "SHELTER_STATS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every view once to stdout
    Summary {
        /// Comma-separated animal types to list (default: all). Labels
        /// containing commas cannot be selected.
        #[arg(long)]
        types: Option<String>,
        /// Output format (`text` or `json`)
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the animal types present in the data
    Categories,
    /// Start the HTTP API server (`BIND_ADDR`/`PORT` select the address)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    if cli.config.is_none() {
        log::debug!("No config file given, using embedded defaults");
    }
    let dashboard = Dashboard::from_config(config)?;

    match cli.command {
        Commands::Summary { types, format } => {
            let selection = types
                .as_deref()
                .map_or(CategorySelection::All, CategorySelection::from_csv);
            let session = dashboard.session(selection).await?;

            let mut renderer = format.renderer(std::io::stdout().lock());
            session.render(renderer.as_mut())?;
        }
        Commands::Categories => {
            let mut out = std::io::stdout().lock();
            for option in dashboard.category_options().await? {
                writeln!(out, "{option}")?;
            }
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_rt::System::new().block_on(shelter_stats_server::run_server(dashboard))
            })
            .await??;
        }
    }

    Ok(())
}
