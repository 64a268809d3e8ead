//! Debug command - end-to-end diagnostics.
//!
//! Walks the same path a real call takes and reports where it breaks:
//! configuration, replica reachability, identity provider reachability,
//! login state, and finally a canister status call.

use std::time::Duration;

use anyhow::Result;
use console::Style;
use serde::Serialize;
use tracechain_config::Network;

use super::config::{ResolvedConfig, print_resolved};
use super::{Context, field, heading, or_dash};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct DebugReport {
    config: ResolvedConfig,
    replica: Probe,
    identity_provider: Probe,
    session_state: String,
    authenticated: bool,
    principal: Option<String>,
    session_error: Option<String>,
    canister_reachable: bool,
    canister_status: Option<tracechain_types::CanisterStatus>,
    canister_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Probe {
    url: String,
    reachable: bool,
    detail: String,
}

/// Run the debug command.
pub async fn run(ctx: &Context) -> Result<()> {
    let http = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;

    let replica_url = ctx.endpoint.host.join("api/v2/status")?;
    let replica = probe(&http, replica_url.as_str()).await;
    let identity_provider = probe(&http, ctx.endpoint.identity_provider.as_str()).await;

    let connection = ctx.connect().await?;
    let session = connection.session();
    let authenticated = session.is_authenticated().await;

    let (canister_status, canister_error) = match connection.proxy().get_canister_status().await {
        Ok(status) => (Some(status), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let report = DebugReport {
        config: ResolvedConfig::from_context(ctx),
        replica,
        identity_provider,
        session_state: session.state().to_string(),
        authenticated,
        principal: session.principal().map(|p| p.to_text()),
        session_error: session.last_error(),
        canister_reachable: canister_status.is_some(),
        canister_status,
        canister_error,
    };

    if ctx.json_output {
        return ctx.print_json(&report);
    }

    print_report(ctx, &report);
    Ok(())
}

async fn probe(http: &reqwest::Client, url: &str) -> Probe {
    match http.get(url).send().await {
        Ok(response) => Probe {
            url: url.to_string(),
            reachable: true,
            detail: format!("HTTP {}", response.status().as_u16()),
        },
        Err(e) => Probe {
            url: url.to_string(),
            reachable: false,
            detail: e.to_string(),
        },
    }
}

fn print_report(ctx: &Context, report: &DebugReport) {
    let green = Style::new().green();
    let red = Style::new().red();
    let dim = Style::new().dim();
    let badge = |ok: bool, yes: &str, no: &str| {
        if ok {
            green.apply_to(format!("● {}", yes)).to_string()
        } else {
            red.apply_to(format!("● {}", no)).to_string()
        }
    };

    print_resolved(&report.config);
    let sources = ctx.loaded.loaded_from();
    if sources.is_empty() {
        field("Config files", dim.apply_to("none (defaults)"));
    } else {
        for path in sources {
            field("Config file", path.display());
        }
    }

    heading("Connectivity");
    println!();
    let replica_name = match ctx.endpoint.network {
        Network::Local => "Local replica",
        Network::Ic => "IC boundary node",
    };
    field(replica_name, badge(report.replica.reachable, "reachable", "unreachable"));
    field("", dim.apply_to(&report.replica.url));
    field(
        "Identity provider",
        badge(report.identity_provider.reachable, "reachable", "unreachable"),
    );
    field("", dim.apply_to(&report.identity_provider.url));
    if ctx.verbose {
        field("Replica detail", &report.replica.detail);
        field("Provider detail", &report.identity_provider.detail);
    }

    heading("Session");
    println!();
    field("State", &report.session_state);
    field(
        "Provider says",
        badge(report.authenticated, "authenticated", "not authenticated"),
    );
    field("Principal", or_dash(report.principal.as_deref()));
    if let Some(error) = &report.session_error {
        field("Last error", red.apply_to(error));
    }

    heading("Canister");
    println!();
    field(
        "Status call",
        badge(report.canister_reachable, "ok", "failed"),
    );
    if let Some(status) = &report.canister_status {
        field("Version", &status.version);
        field("Products", status.total_products);
        field("Users", status.total_users);
        field("Events", status.total_events);
    }
    if let Some(error) = &report.canister_error {
        field("Error", red.apply_to(error));
    }

    if !report.replica.reachable && ctx.endpoint.network == Network::Local {
        println!();
        println!("  {}", dim.apply_to("Start the local replica with: dfx start --background"));
    }
    println!();
}
