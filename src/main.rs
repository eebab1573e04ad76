//! Visitor profile service.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                 VISITOR PROFILE                  │
//!                         │                                                  │
//!   POST /api/client-info │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!   ──────────────────────┼─▶│  http   │───▶│  device  │    │    geo     │   │
//!                         │  │ server  │    │classifier│    │  resolver  │───┼──▶ public-IP provider
//!                         │  └────┬────┘    └────┬─────┘    └─────┬──────┘───┼──▶ geolocation provider
//!                         │       │              │                │          │
//!                         │       ▼              ▼                ▼          │
//!   JSON profile          │  ┌──────────────────────────────────────────┐    │
//!   ◀─────────────────────┼──│          profile (ClientProfile)         │    │
//!                         │  └──────────────────────────────────────────┘    │
//!                         │                                                  │
//!                         │   config · observability · lifecycle             │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use visitor_profile::config;
use visitor_profile::lifecycle::startup;
use visitor_profile::observability::logging;

#[derive(Parser)]
#[command(name = "visitor-profile")]
#[command(about = "Visitor profile API with IP geolocation enrichment", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:3000).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    let _ = dotenv::dotenv();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("visitor-profile v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await
}
