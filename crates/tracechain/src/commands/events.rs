//! Events command - supply-chain event history.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use tracechain_types::{EventStatus, SupplyChainEvent, SupplyChainEventInput, SupplyChainStage};

use super::{Context, format_timestamp, heading, parse_timestamp};

/// Arguments for the events command.
#[derive(Args, Debug)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List a product's events
    List {
        /// Product id
        product_id: String,
    },

    /// Record an event against a product
    Add(AddEventArgs),
}

#[derive(Args, Debug)]
pub struct AddEventArgs {
    /// Product id
    pub product_id: String,

    /// raw_material_sourcing, manufacturing, quality_control, packaging,
    /// shipping, distribution or retail
    #[arg(long)]
    pub stage: SupplyChainStage,

    #[arg(long)]
    pub location: String,

    /// pending, in_progress, completed or failed
    #[arg(long, default_value = "pending")]
    pub status: EventStatus,

    #[arg(long, default_value = "")]
    pub details: String,

    /// Certification (repeatable)
    #[arg(long = "certification")]
    pub certifications: Vec<String>,

    /// Estimated arrival (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub eta: Option<u64>,

    /// Extra metadata as key=value (repeatable)
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

impl From<AddEventArgs> for SupplyChainEventInput {
    fn from(args: AddEventArgs) -> Self {
        SupplyChainEventInput {
            product_id: args.product_id,
            stage: args.stage,
            location: args.location,
            status: args.status,
            details: args.details,
            certifications: args.certifications,
            estimated_arrival: args.eta,
            metadata: args.metadata.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

/// Run the events command.
pub async fn run(args: EventsArgs, ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let proxy = connection.proxy();

    match args.command {
        EventsCommand::List { product_id } => {
            let events = proxy.get_supply_chain_events(&product_id).await?;
            if ctx.json_output {
                return ctx.print_json(&events);
            }

            heading(&format!("Supply chain for {}", product_id));
            println!();
            if events.is_empty() {
                let dim = Style::new().dim();
                println!("  {}", dim.apply_to("No events recorded"));
            }
            for event in &events {
                print_event_line(event);
                if ctx.verbose {
                    print_event_detail(event);
                }
            }
            println!();
            Ok(())
        }
        EventsCommand::Add(args) => {
            let id = proxy.add_supply_chain_event(args.into()).await?;
            if ctx.json_output {
                ctx.print_json(&serde_json::json!({ "id": id }))
            } else {
                let green = Style::new().green();
                println!("{} Event recorded: {}", green.apply_to("✓"), style(&id).bold());
                Ok(())
            }
        }
    }
}

/// One line per event: time, stage, status, location, actor.
pub fn print_event_line(event: &SupplyChainEvent) {
    let dim = Style::new().dim();
    let status = match event.status {
        EventStatus::Completed => Style::new().green(),
        EventStatus::InProgress => Style::new().yellow(),
        EventStatus::Pending => Style::new().dim(),
        EventStatus::Failed => Style::new().red(),
    };
    println!(
        "  {} {:<22} {} {} {}",
        dim.apply_to(format_timestamp(event.timestamp)),
        event.stage.as_str(),
        status.apply_to(format!("{:<12}", event.status.as_str())),
        event.location,
        dim.apply_to(format!("({})", event.actor)),
    );
}

fn print_event_detail(event: &SupplyChainEvent) {
    let dim = Style::new().dim();
    if !event.details.is_empty() {
        println!("      {}", event.details);
    }
    if let Some(eta) = event.estimated_arrival {
        println!("      {} {}", dim.apply_to("eta"), format_timestamp(eta));
    }
    if !event.certifications.is_empty() {
        println!(
            "      {} {}",
            dim.apply_to("certified"),
            event.certifications.join(", ")
        );
    }
    for (key, value) in &event.metadata {
        println!("      {} {}", dim.apply_to(format!("{}=", key)), value);
    }
}

fn parse_key_value(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("carrier = Maersk").unwrap(),
            ("carrier".to_string(), "Maersk".to_string())
        );
        assert_eq!(
            parse_key_value("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_event_args_collect_metadata() {
        let input: SupplyChainEventInput = AddEventArgs {
            product_id: "CT-1".into(),
            stage: SupplyChainStage::Shipping,
            location: "Rotterdam".into(),
            status: EventStatus::InProgress,
            details: String::new(),
            certifications: vec![],
            eta: None,
            metadata: vec![("vessel".into(), "Emma".into()), ("berth".into(), "7".into())],
        }
        .into();
        assert_eq!(input.metadata.len(), 2);
        assert_eq!(input.metadata["vessel"], "Emma");
    }
}
