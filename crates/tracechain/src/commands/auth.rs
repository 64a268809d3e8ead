//! Auth command - Internet Identity login management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;
use tracechain_auth::SessionState;

use super::{Context, field, format_timestamp, heading, or_dash};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with Internet Identity in the browser
    Login {
        /// Only print the login URL; do not open a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Forget the stored delegation
    Logout,

    /// Show authentication status
    Status,

    /// Print the authenticated principal
    Whoami,
}

/// Authentication status for JSON output.
#[derive(Debug, Serialize)]
struct AuthStatus {
    state: String,
    authenticated: bool,
    principal: Option<String>,
    expires_at: Option<u64>,
    identity_provider: String,
    error: Option<String>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { no_browser } => cmd_login(ctx, !no_browser).await,
        AuthCommand::Logout => cmd_logout(ctx).await,
        AuthCommand::Status => cmd_status(ctx).await,
        AuthCommand::Whoami => cmd_whoami(ctx).await,
    }
}

async fn cmd_login(ctx: &Context, open_browser: bool) -> Result<()> {
    let connection = ctx.connect_with(open_browser).await?;
    let session = connection.session();

    if let Some(identity) = session.current_identity()
        && !ctx.json_output
    {
        let dim = Style::new().dim();
        println!(
            "{}",
            dim.apply_to(format!("Replacing existing session for {}", identity))
        );
    }

    if !session.login().await {
        let reason = session
            .last_error()
            .unwrap_or_else(|| "unknown error".to_string());
        anyhow::bail!("Login failed: {}", reason);
    }

    let identity = session
        .current_identity()
        .ok_or_else(|| anyhow::anyhow!("Login reported success without an identity"))?;

    if ctx.json_output {
        ctx.print_json(&serde_json::json!({
            "authenticated": true,
            "principal": identity.principal().to_text(),
            "expires_at": identity.expires_at(),
        }))?;
    } else {
        let green = Style::new().green();
        println!("{} Logged in as {}", green.apply_to("✓"), identity);
        if let Some(expires) = identity.expires_at() {
            let dim = Style::new().dim();
            println!(
                "{}",
                dim.apply_to(format!("Session valid until {}", format_timestamp(expires)))
            );
        }
    }
    Ok(())
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    connection.session().logout().await;

    if ctx.json_output {
        ctx.print_json(&serde_json::json!({ "authenticated": false }))?;
    } else {
        let green = Style::new().green();
        println!("{} Logged out", green.apply_to("✓"));
    }
    Ok(())
}

async fn cmd_status(ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let session = connection.session();
    // Reconciles the local state with the stored credential.
    let authenticated = session.is_authenticated().await;
    let state = session.state();
    let identity = session.current_identity();

    let status = AuthStatus {
        state: state.to_string(),
        authenticated,
        principal: identity.as_ref().map(|i| i.principal().to_text()),
        expires_at: identity.as_ref().and_then(|i| i.expires_at()),
        identity_provider: ctx.endpoint.identity_provider.to_string(),
        error: session.last_error(),
    };

    if ctx.json_output {
        return ctx.print_json(&status);
    }

    let green = Style::new().green();
    let red = Style::new().red();

    heading("Authentication");
    println!();
    let badge = if status.authenticated {
        green.apply_to("● authenticated").to_string()
    } else {
        red.apply_to("● not authenticated").to_string()
    };
    field("Status", badge);
    field("Principal", or_dash(status.principal.as_deref()));
    field(
        "Expires",
        or_dash(status.expires_at.map(format_timestamp)),
    );
    field("Identity provider", &status.identity_provider);
    if let SessionState::Error(message) = &state {
        field("Last error", red.apply_to(message));
    }
    if !status.authenticated {
        println!();
        let dim = Style::new().dim();
        println!("  {}", dim.apply_to("Sign in with: tracechain auth login"));
    }
    println!();
    Ok(())
}

async fn cmd_whoami(ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let identity = connection
        .session()
        .current_identity()
        .ok_or_else(|| anyhow::anyhow!("Not authenticated; run `tracechain auth login` first"))?;

    if ctx.json_output {
        ctx.print_json(&serde_json::json!({ "principal": identity.principal().to_text() }))
    } else {
        println!("{}", identity);
        Ok(())
    }
}
