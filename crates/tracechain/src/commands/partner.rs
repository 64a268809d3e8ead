//! Partner command - registration and listing.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use tracechain_types::{PartnerRegistration, PartnerType};

use super::{Context, heading};

/// Arguments for the partner command.
#[derive(Args, Debug)]
pub struct PartnerArgs {
    #[command(subcommand)]
    pub command: PartnerCommand,
}

#[derive(Subcommand, Debug)]
pub enum PartnerCommand {
    /// List registered partners
    List,

    /// Register the signed-in principal as a partner
    Register {
        #[arg(long)]
        company: String,

        /// manufacturer, supplier, logistics_provider, distributor,
        /// retailer or certification_body
        #[arg(long = "type")]
        partner_type: PartnerType,

        #[arg(long)]
        email: String,

        /// Contact person
        #[arg(long)]
        contact: String,

        /// Certification (repeatable)
        #[arg(long = "certification")]
        certifications: Vec<String>,
    },
}

/// Run the partner command.
pub async fn run(args: PartnerArgs, ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let proxy = connection.proxy();

    match args.command {
        PartnerCommand::List => {
            let partners = proxy.get_partners().await?;
            if ctx.json_output {
                return ctx.print_json(&partners);
            }

            let dim = Style::new().dim();
            let green = Style::new().green();
            heading("Partners");
            println!();
            if partners.is_empty() {
                println!("  {}", dim.apply_to("No partners registered"));
            }
            for partner in &partners {
                let verified = if partner.verified {
                    green.apply_to("✓").to_string()
                } else {
                    dim.apply_to("·").to_string()
                };
                println!(
                    "  {} {} {} {}",
                    verified,
                    style(&partner.company_name).bold(),
                    dim.apply_to(format!("[{}]", partner.partner_type)),
                    dim.apply_to(format!(
                        "{} <{}> rep {}",
                        partner.contact_person, partner.contact_email, partner.reputation_score
                    )),
                );
            }
            println!();
            Ok(())
        }
        PartnerCommand::Register {
            company,
            partner_type,
            email,
            contact,
            certifications,
        } => {
            proxy
                .register_partner(PartnerRegistration {
                    company_name: company.clone(),
                    partner_type,
                    contact_email: email,
                    contact_person: contact,
                    certifications,
                })
                .await?;
            if ctx.json_output {
                ctx.print_json(&serde_json::json!({ "registered": company }))
            } else {
                let green = Style::new().green();
                println!("{} Partner registered: {}", green.apply_to("✓"), company);
                Ok(())
            }
        }
    }
}
