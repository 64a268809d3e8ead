//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod debug;
pub mod events;
pub mod partner;
pub mod product;
pub mod system;
pub mod user;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use console::Style;
use tracechain_auth::{LoopbackBroker, open_in_browser};
use tracechain_client::Connection;
use tracechain_config::{Endpoint, LoadedConfig};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved network endpoint.
    pub endpoint: Endpoint,
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build a connection and restore any persisted session.
    pub async fn connect(&self) -> Result<Connection> {
        self.connect_with(true).await
    }

    /// Like [`connect`](Self::connect). A login started through the
    /// returned connection opens the browser only when `open_browser` is set.
    pub async fn connect_with(&self, open_browser: bool) -> Result<Connection> {
        let broker = LoopbackBroker::from_endpoint(&self.endpoint).with_url_handler(move |request| {
            print_login_url(&request.url);
            if open_browser {
                open_in_browser(request);
            }
        });

        let connection = Connection::with_broker(&self.endpoint, Arc::new(broker))?;
        connection.session().initialize().await;
        Ok(connection)
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Print the login URL on stderr, so `--json` output stays clean.
fn print_login_url(url: &str) {
    let dim = Style::new().dim();
    eprintln!();
    eprintln!("Open this URL in your browser to sign in with Internet Identity:");
    eprintln!();
    eprintln!("  {}", url);
    eprintln!();
    eprintln!("{}", dim.apply_to("Waiting for the identity provider..."));
}

/// Print a bold heading with a rule under it.
pub fn heading(title: &str) {
    let dim = Style::new().dim();
    println!();
    println!("{}", console::style(title).bold());
    println!("{}", dim.apply_to("─".repeat(40)));
}

/// Print an aligned `label: value` line.
pub fn field(label: &str, value: impl std::fmt::Display) {
    let dim = Style::new().dim();
    println!("  {:<22} {}", dim.apply_to(format!("{}:", label)), value);
}

/// Render a canister timestamp (nanoseconds since the epoch).
pub fn format_timestamp(nanos: u64) -> String {
    i64::try_from(nanos)
        .map(DateTime::<Utc>::from_timestamp_nanos)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|_| nanos.to_string())
}

/// Parse a `YYYY-MM-DD` date or an RFC 3339 timestamp into canister nanoseconds.
pub fn parse_timestamp(value: &str) -> std::result::Result<u64, String> {
    let parsed = if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .ok_or_else(|| format!("invalid date: {}", value))?
    } else {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got {:?}", value))?
    };

    parsed
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| format!("timestamp out of range: {}", value))
}

/// Current time in canister nanoseconds.
pub fn now_nanos() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}

/// Parse a textual principal.
pub fn parse_principal(value: &str) -> std::result::Result<candid::Principal, String> {
    candid::Principal::from_text(value).map_err(|e| format!("invalid principal: {}", e))
}

/// Render an optional value, dimmed when absent.
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => Style::new().dim().apply_to("-").to_string(),
    }
}

/// Render a list, dimmed when empty.
pub fn list(values: &[String]) -> String {
    if values.is_empty() {
        or_dash(None::<String>)
    } else {
        values.join(", ")
    }
}
