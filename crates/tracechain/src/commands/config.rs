//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;

use super::{Context, field, heading};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show which config files are checked and loaded
    Path,
}

/// Resolved settings for JSON output.
#[derive(Debug, Serialize)]
pub(crate) struct ResolvedConfig {
    pub network: String,
    pub host: String,
    pub supply_chain_canister: String,
    pub internet_identity_canister: String,
    pub identity_provider: String,
    pub fetch_root_key: bool,
    pub max_time_to_live_secs: u64,
    pub login_timeout_secs: u64,
    pub window_features: String,
    pub data_dir: String,
}

impl ResolvedConfig {
    pub(crate) fn from_context(ctx: &Context) -> Self {
        let e = &ctx.endpoint;
        Self {
            network: e.network.to_string(),
            host: e.host.to_string(),
            supply_chain_canister: e.supply_chain_canister.clone(),
            internet_identity_canister: e.internet_identity_canister.clone(),
            identity_provider: e.identity_provider.to_string(),
            fetch_root_key: e.fetch_root_key,
            max_time_to_live_secs: e.max_time_to_live.as_secs(),
            login_timeout_secs: e.login_timeout.as_secs(),
            window_features: e.window_features.clone(),
            data_dir: e.data_dir.display().to_string(),
        }
    }
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let resolved = ResolvedConfig::from_context(ctx);
    if ctx.json_output {
        return ctx.print_json(&resolved);
    }

    print_resolved(&resolved);
    println!();
    Ok(())
}

pub(crate) fn print_resolved(resolved: &ResolvedConfig) {
    heading("Configuration");
    println!();
    field("Network", &resolved.network);
    field("Host", &resolved.host);
    field("Supply chain canister", &resolved.supply_chain_canister);
    field("Internet Identity", &resolved.internet_identity_canister);
    field("Identity provider", &resolved.identity_provider);
    field("Fetch root key", resolved.fetch_root_key);
    field("Max session", format!("{}s", resolved.max_time_to_live_secs));
    field("Login timeout", format!("{}s", resolved.login_timeout_secs));
    field("Data dir", &resolved.data_dir);
}

fn cmd_path(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let sources: Vec<_> = ctx
            .loaded
            .sources
            .iter()
            .map(|s| serde_json::json!({ "path": s.path.display().to_string(), "loaded": s.loaded }))
            .collect();
        return ctx.print_json(&sources);
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    heading("Config files (lowest precedence first)");
    println!();
    for source in &ctx.loaded.sources {
        let marker = if source.loaded {
            green.apply_to("●").to_string()
        } else {
            dim.apply_to("○").to_string()
        };
        println!("  {} {}", marker, source.path.display());
    }
    for warning in &ctx.loaded.warnings {
        let yellow = Style::new().yellow();
        println!("  {} {}", yellow.apply_to("!"), warning);
    }
    println!();
    println!(
        "  {}",
        dim.apply_to("TRACECHAIN_* environment variables and flags override these files")
    );
    println!();
    Ok(())
}
