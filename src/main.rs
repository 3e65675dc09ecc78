//! Pi Balance Sweeper - unattended residual-fund collection
//!
//! # WARNING
//! - This tool moves real funds. Double-check the destination address.
//! - Merge mode permanently closes source accounts.
//! - Seed phrases grant full control of their wallets; guard the wallet
//!   list file accordingly.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

// Use the library crate
use pi_sweeper::cli::commands;
use pi_sweeper::config::{Config, Mode};

/// Pi Balance Sweeper - drains derived wallets into one destination
#[derive(Parser)]
#[command(name = "sweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "sweeper.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the sweep loop
    Start {
        /// Build and log envelopes without submitting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show per-wallet balances (no submissions)
    Status,

    /// Show current configuration (secrets masked)
    Config,

    /// Check Horizon, destination, and notifier health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pi_sweeper=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    startup_checks(&config);

    // Execute command
    let result = match cli.command {
        Commands::Start { dry_run } => commands::start(&config, dry_run).await,
        Commands::Status => commands::status(&config).await,
        Commands::Config => commands::show_config(&config),
        Commands::Health => commands::health(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Log the operating mode loudly before anything irreversible happens
fn startup_checks(config: &Config) {
    info!("Destination: {}", config.sweep.destination);

    match config.sweep.mode {
        Mode::Drain => info!(
            "Mode: drain, leaving {} behind per wallet",
            config.sweep.reserve
        ),
        Mode::Merge => warn!(
            "Mode: MERGE - source accounts will be permanently closed after sweeping"
        ),
    }

    if config.submit.proxies.is_empty() {
        info!("No proxy channels configured, submitting direct only");
    }
}
