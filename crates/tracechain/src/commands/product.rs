//! Product command - registration, lookup and search.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use tracechain_types::{Product, ProductRegistration, ProductSearchQuery, ProductStatus, ProductWithHistory};

use super::events::print_event_line;
use super::{Context, field, format_timestamp, heading, list, now_nanos, or_dash, parse_timestamp};

/// Arguments for the product command.
#[derive(Args, Debug)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Show a product with its supply-chain history
    Get {
        /// Product id, e.g. CT-2024-001234
        id: String,
    },

    /// Register a new product
    Register(RegisterArgs),

    /// Search products
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub batch: Option<String>,

    /// Production date (YYYY-MM-DD or RFC 3339); defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    pub production_date: Option<u64>,

    /// Where the product was made
    #[arg(long)]
    pub location: String,

    /// Raw material (repeatable)
    #[arg(long = "material")]
    pub raw_materials: Vec<String>,

    /// Certification (repeatable)
    #[arg(long = "certification")]
    pub certifications: Vec<String>,

    #[arg(long)]
    pub sustainability_score: Option<f64>,

    #[arg(long)]
    pub estimated_value: Option<f64>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Match on product name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    /// manufacturing, in_transit, delivered or recalled
    #[arg(long)]
    pub status: Option<ProductStatus>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<u32>,
}

impl From<RegisterArgs> for ProductRegistration {
    fn from(args: RegisterArgs) -> Self {
        ProductRegistration {
            name: args.name,
            category: args.category,
            description: args.description,
            batch_number: args.batch,
            production_date: args.production_date.unwrap_or_else(now_nanos),
            manufacturing_location: args.location,
            raw_materials: args.raw_materials,
            certifications: args.certifications,
            sustainability_score: args.sustainability_score,
            estimated_value: args.estimated_value,
        }
    }
}

impl From<SearchArgs> for ProductSearchQuery {
    fn from(args: SearchArgs) -> Self {
        ProductSearchQuery {
            name: args.name,
            category: args.category,
            manufacturer: args.manufacturer,
            status: args.status,
            limit: args.limit,
        }
    }
}

/// Run the product command.
pub async fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    let connection = ctx.connect().await?;
    let proxy = connection.proxy();

    match args.command {
        ProductCommand::Get { id } => {
            let product = proxy.get_product(&id).await?;
            print_product(ctx, &product)
        }
        ProductCommand::Register(args) => {
            let id = proxy.register_product(args.into()).await?;
            if ctx.json_output {
                ctx.print_json(&serde_json::json!({ "id": id }))
            } else {
                let green = Style::new().green();
                println!("{} Product registered: {}", green.apply_to("✓"), style(&id).bold());
                Ok(())
            }
        }
        ProductCommand::Search(args) => {
            let products = proxy.search_products(args.into()).await?;
            print_products(ctx, &products)
        }
    }
}

fn print_product(ctx: &Context, item: &ProductWithHistory) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(item);
    }

    let product = &item.product;
    let dim = Style::new().dim();

    heading(&format!("{} ({})", product.name, product.id));
    println!();
    field("Category", &product.category);
    field("Description", or_dash(product.description.as_deref()));
    field("Manufacturer", &product.manufacturer);
    field("Batch", or_dash(product.batch_number.as_deref()));
    field("Produced", format_timestamp(product.production_date));
    field("Status", status_style(product.current_status));
    field("Location", &product.current_location);
    field("Raw materials", list(&product.raw_materials));
    field("Certifications", list(&product.certifications));
    field(
        "Sustainability",
        or_dash(product.sustainability_score.map(|s| format!("{:.1}", s))),
    );
    field(
        "Estimated value",
        or_dash(product.estimated_value.map(|v| format!("{:.2}", v))),
    );
    field("Ethical score", format!("{:.1}", item.ethical_score));
    println!();

    println!("  {}", dim.apply_to("Supply chain"));
    if item.supply_chain_events.is_empty() {
        println!("  {}", dim.apply_to("No events recorded"));
    } else {
        for event in &item.supply_chain_events {
            print_event_line(event);
        }
    }
    println!();
    Ok(())
}

fn print_products(ctx: &Context, products: &[Product]) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(&products);
    }

    let dim = Style::new().dim();
    heading("Products");
    println!();
    if products.is_empty() {
        println!("  {}", dim.apply_to("No products found"));
    } else {
        for product in products {
            println!(
                "  {} {} {} {}",
                style(&product.id).bold(),
                product.name,
                dim.apply_to(format!("[{}]", product.category)),
                status_style(product.current_status)
            );
        }
    }
    println!();
    Ok(())
}

fn status_style(status: ProductStatus) -> String {
    let styled = match status {
        ProductStatus::Manufacturing => Style::new().cyan(),
        ProductStatus::InTransit => Style::new().yellow(),
        ProductStatus::Delivered => Style::new().green(),
        ProductStatus::Recalled => Style::new().red(),
    };
    styled.apply_to(status).to_string()
}
