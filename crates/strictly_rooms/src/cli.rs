//! Command-line interface for strictly_rooms.

use clap::Parser;

/// Strictly Rooms - two-player tic-tac-toe rooms over WebSocket
#[derive(Parser, Debug)]
#[command(name = "strictly_rooms")]
#[command(about = "Tic-tac-toe room server with reconnection grace windows", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Port to bind to (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,
}
