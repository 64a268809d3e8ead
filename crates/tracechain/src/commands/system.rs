//! System commands - connectivity, canister status and analytics.

use anyhow::Result;
use console::Style;
use serde::Serialize;

use super::{Context, field, heading};

/// Ping result for JSON output.
#[derive(Debug, Serialize)]
struct PingOutput {
    reachable: bool,
    canister_id: String,
    host: String,
}

/// Run the ping command.
pub async fn ping(ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let reachable = connection.proxy().test_connection().await;

    if ctx.json_output {
        ctx.print_json(&PingOutput {
            reachable,
            canister_id: ctx.endpoint.supply_chain_canister.clone(),
            host: ctx.endpoint.host.to_string(),
        })?;
    } else if reachable {
        let green = Style::new().green();
        println!(
            "{} Canister {} is reachable",
            green.apply_to("✓"),
            ctx.endpoint.supply_chain_canister
        );
    } else {
        let red = Style::new().red();
        let dim = Style::new().dim();
        println!(
            "{} Canister {} is not reachable",
            red.apply_to("✗"),
            ctx.endpoint.supply_chain_canister
        );
        if connection.session().current_identity().is_none() {
            println!("  {}", dim.apply_to("Sign in first: tracechain auth login"));
        } else if !ctx.verbose {
            println!("  {}", dim.apply_to("Re-run with --verbose for details"));
        }
    }

    if !reachable {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the status command.
pub async fn status(ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let status = connection.proxy().get_canister_status().await?;

    if ctx.json_output {
        return ctx.print_json(&status);
    }

    let green = Style::new().green();
    heading("Canister Status");
    println!();
    field("Status", green.apply_to("● running"));
    field("Canister", &ctx.endpoint.supply_chain_canister);
    field("Network", ctx.endpoint.network);
    field("Version", &status.version);
    field("Uptime", format_uptime(status.uptime));
    field("Products", status.total_products);
    field("Users", status.total_users);
    field("Events", status.total_events);
    println!();
    Ok(())
}

/// Run the analytics command.
pub async fn analytics(ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let analytics = connection.proxy().get_analytics().await?;

    if ctx.json_output {
        return ctx.print_json(&analytics);
    }

    heading("Supply Chain Analytics");
    println!();
    field("Products", analytics.total_products);
    field("Active shipments", analytics.active_shipments);
    field("Completed deliveries", analytics.completed_deliveries);
    field(
        "Avg. ethical score",
        format!("{:.1}", analytics.average_ethical_score),
    );
    field("Partners", analytics.total_partners);
    field("Users", analytics.total_users);
    println!();
    Ok(())
}

/// Uptime arrives in nanoseconds.
fn format_uptime(nanos: u64) -> String {
    let secs = nanos / 1_000_000_000;
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let minutes = rem / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs % 60)
    }
}
