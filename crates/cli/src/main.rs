//! Restock CLI - Drive the waitlist client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Put a shopper on a variant's waitlist
//! restock join -e shopper@example.com -v gid://shopify/ProductVariant/123 -p gid://shopify/Product/45
//!
//! # Take them off again
//! restock leave -e shopper@example.com -v gid://shopify/ProductVariant/123
//!
//! # How many shoppers are waiting
//! restock count -v 123
//!
//! # How a variant would be shown on a product page
//! restock classify --available-for-sale false --quantity 0
//! ```
//!
//! # Commands
//!
//! - `join` / `leave` - Waitlist membership
//! - `count` - Waitlist count (cached, `--refetch` to bypass)
//! - `classify` - Availability classification, no network

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use restock_core::Money;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "restock")]
#[command(author, version, about = "Back-in-stock waitlist tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a variant's waitlist
    Join {
        /// Shopper email address
        #[arg(short, long)]
        email: String,

        /// Variant ID (global or numeric)
        #[arg(short, long)]
        variant: String,

        /// Product ID (global or numeric)
        #[arg(short, long)]
        product: String,

        /// Product title sent along for the notification email
        #[arg(long)]
        product_title: Option<String>,

        /// Variant title sent along for the notification email
        #[arg(long)]
        variant_title: Option<String>,
    },
    /// Leave a variant's waitlist
    Leave {
        /// Shopper email address
        #[arg(short, long)]
        email: String,

        /// Variant ID (global or numeric)
        #[arg(short, long)]
        variant: String,
    },
    /// Show how many shoppers are waiting on a variant
    Count {
        /// Variant ID (global or numeric)
        #[arg(short, long)]
        variant: String,

        /// Skip the cache and always ask the service
        #[arg(long)]
        refetch: bool,
    },
    /// Classify a variant's availability
    Classify {
        /// Whether the variant can be bought
        #[arg(long, action = clap::ArgAction::Set)]
        available_for_sale: bool,

        /// Tracked inventory quantity
        #[arg(short, long, allow_negative_numbers = true)]
        quantity: Option<i64>,

        /// Quantity at or below which stock counts as low
        #[arg(short, long, default_value_t = restock_core::DEFAULT_LOW_STOCK_THRESHOLD)]
        threshold: i64,

        /// Variant price, shown alongside the classification
        #[arg(long)]
        price: Option<Decimal>,

        /// ISO 4217 currency code of `--price`
        #[arg(long, default_value = "USD")]
        currency: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("restock=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Join {
            email,
            variant,
            product,
            product_title,
            variant_title,
        } => {
            let target =
                commands::waitlist::target(&variant, &product, product_title, variant_title)?;
            commands::waitlist::join(target, &email).await?;
        }
        Commands::Leave { email, variant } => {
            commands::waitlist::leave(&variant, &email).await?;
        }
        Commands::Count { variant, refetch } => {
            commands::count::show(&variant, refetch).await?;
        }
        Commands::Classify {
            available_for_sale,
            quantity,
            threshold,
            price,
            currency,
        } => {
            let price = price.map(|amount| Money::new(amount, currency));
            commands::classify::show(available_for_sale, quantity, price, threshold)?;
        }
    }
    Ok(())
}
