//! Strictly Rooms - server entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use strictly_rooms::{ServerConfig, ThreadRandom};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => {
            info!("No config file given, using defaults");
            ServerConfig::default()
        }
    }
    .with_overrides(cli.host, cli.port);

    info!(
        host = %config.host(),
        port = config.port(),
        grace_period_secs = config.grace_period_secs(),
        room_ttl_secs = config.room_ttl_secs(),
        "Starting Strictly Rooms server"
    );
    strictly_rooms::server::serve(config, Box::new(ThreadRandom)).await
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_rooms=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
