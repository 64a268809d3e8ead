//! TraceChain - supply-chain traceability on the Internet Computer
//!
//! Main entry point for the TraceChain CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracechain_config::{LoadedConfig, Network};

mod commands;

use commands::{auth, config, debug, events, partner, product, system, user};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// TraceChain - supply-chain traceability on the Internet Computer
#[derive(Parser)]
#[command(name = "tracechain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Network to use: local or ic
    #[arg(long, global = true)]
    pub network: Option<Network>,

    /// Use this config file instead of discovering one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Internet Identity authentication
    Auth(auth::AuthArgs),

    /// Check that the canister answers
    Ping,

    /// Show canister status
    Status,

    /// Show supply-chain analytics
    Analytics,

    /// User registration and verification
    User(user::UserArgs),

    /// Product registration and lookup
    Product(product::ProductArgs),

    /// Supply-chain events
    Events(events::EventsArgs),

    /// Partner registration and listing
    Partner(partner::PartnerArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Diagnose configuration, login and canister connectivity
    Debug,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) plus a daily JSON log file
    let filter = if cli.verbose {
        "tracechain=debug,tracechain_auth=debug,tracechain_client=debug,tracechain_config=debug,info"
    } else {
        "tracechain=warn,tracechain_auth=warn,tracechain_client=warn,error"
    };

    let log_dir = tracechain_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tracechain.log");
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
                    "tracechain=trace,tracechain_auth=trace,tracechain_client=trace,tracechain_config=trace,info",
                )),
        )
        .init();

    let loaded = load_configuration(&cli)?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    let endpoint = tracechain_config::Endpoint::resolve(&loaded.config)
        .context("Invalid configuration")?;

    // Create context for commands
    let ctx = commands::Context {
        endpoint,
        loaded,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Ping => system::ping(&ctx).await,
        Commands::Status => system::status(&ctx).await,
        Commands::Analytics => system::analytics(&ctx).await,
        Commands::User(args) => user::run(args, &ctx).await,
        Commands::Product(args) => product::run(args, &ctx).await,
        Commands::Events(args) => events::run(args, &ctx).await,
        Commands::Partner(args) => partner::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Debug => debug::run(&ctx).await,
    }
}

/// Files, then environment, then flags.
fn load_configuration(cli: &Cli) -> Result<LoadedConfig> {
    let mut loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: tracechain_config::load_config_file(path)?,
            sources: vec![tracechain_config::ConfigSource {
                path: path.clone(),
                loaded: true,
            }],
            warnings: Vec::new(),
        },
        None => tracechain_config::load_config(None)?,
    };

    loaded.config.apply_env()?;
    if let Some(network) = cli.network {
        loaded.config.network.name = Some(network);
    }
    Ok(loaded)
}
