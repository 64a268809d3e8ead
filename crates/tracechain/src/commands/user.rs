//! User command - registration, profile and verification.

use anyhow::Result;
use candid::Principal;
use clap::{Args, Subcommand};
use console::Style;
use tracechain_types::{User, UserRegistration, UserRole};

use super::{Context, field, format_timestamp, heading, parse_principal};

/// Arguments for the user command.
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show the signed-in user's profile
    Get,

    /// Register the signed-in principal as a user
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        company: String,

        /// manufacturer, logistics_provider, retailer, quality_assurance,
        /// supply_chain_manager, admin or consumer
        #[arg(long, default_value = "consumer")]
        role: UserRole,
    },

    /// Mark a user as verified (requires verification rights)
    Verify {
        /// Principal of the user
        #[arg(value_parser = parse_principal)]
        principal: Principal,

        /// Revoke verification instead of granting it
        #[arg(long)]
        revoke: bool,
    },
}

/// Run the user command.
pub async fn run(args: UserArgs, ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let proxy = connection.proxy();

    match args.command {
        UserCommand::Get => {
            let user = proxy.get_user().await?;
            print_user(ctx, &user)
        }
        UserCommand::Register {
            email,
            first_name,
            last_name,
            company,
            role,
        } => {
            let user = proxy
                .register_user(UserRegistration {
                    email,
                    first_name,
                    last_name,
                    company,
                    role,
                })
                .await?;
            if !ctx.json_output {
                let green = Style::new().green();
                println!("{} Registered {}", green.apply_to("✓"), user.display_name());
            }
            print_user(ctx, &user)
        }
        UserCommand::Verify { principal, revoke } => {
            proxy.update_user_verification(principal, !revoke).await?;
            if ctx.json_output {
                ctx.print_json(&serde_json::json!({
                    "principal": principal.to_text(),
                    "verified": !revoke,
                }))
            } else {
                let green = Style::new().green();
                let action = if revoke { "Revoked verification for" } else { "Verified" };
                println!("{} {} {}", green.apply_to("✓"), action, principal);
                Ok(())
            }
        }
    }
}

fn print_user(ctx: &Context, user: &User) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(user);
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    let check = |allowed: bool| {
        if allowed {
            green.apply_to("yes").to_string()
        } else {
            dim.apply_to("no").to_string()
        }
    };

    heading(&user.display_name());
    println!();
    field("Principal", user.id);
    field("Email", &user.email);
    field("Company", &user.company);
    field("Role", user.role);
    field("Verified", check(user.is_verified));
    field("Registered", format_timestamp(user.created_at));
    println!();
    println!("  {}", dim.apply_to("Permissions"));
    field("Register products", check(user.permissions.can_register_products));
    field("Update supply chain", check(user.permissions.can_update_supply_chain));
    field("Manage partners", check(user.permissions.can_manage_partners));
    field("View analytics", check(user.permissions.can_view_analytics));
    field("Verify users", check(user.permissions.can_verify_users));
    println!();
    Ok(())
}
