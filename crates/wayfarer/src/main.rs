//! Wayfarer - streaming travel discovery
//!
//! Main entry point for the Wayfarer CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, discover, last, replay};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Wayfarer - streaming travel discovery
#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: from config, then http://127.0.0.1:8000)
    #[arg(long, global = true, env = "WAYFARER_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stream a discovery for a free-text request
    Discover(discover::DiscoverArgs),

    /// Assemble a captured event stream offline
    Replay(replay::ReplayArgs),

    /// Show the last completed session
    Last(last::LastArgs),

    /// Show the effective configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "wayfarer=debug,wayfarer_client=debug,wayfarer_stream=debug,wayfarer_session=debug,wayfarer_config=debug,info"
    } else {
        "wayfarer=info,wayfarer_client=warn,wayfarer_stream=warn,wayfarer_session=warn,warn"
    };

    let paths = wayfarer_config::ConfigPaths::discover();
    let log_dir = paths.log_dir().unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "wayfarer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "wayfarer=trace,wayfarer_client=trace,wayfarer_stream=trace,wayfarer_session=trace,wayfarer_config=trace,info",
                )),
        )
        .init();

    let loaded = paths.load()?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    // Get server URL
    let server_url = cli
        .server
        .unwrap_or_else(|| loaded.config.server().url);

    // Create context for commands
    let ctx = commands::Context {
        server_url,
        json_output: cli.json,
        verbose: cli.verbose,
        loaded,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Discover(args) => discover::run(args, &ctx).await,
        Commands::Replay(args) => replay::run(args, &ctx).await,
        Commands::Last(args) => last::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
