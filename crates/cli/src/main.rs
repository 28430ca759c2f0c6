//! Shopfront CLI - Cart operations from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and print a session token
//! shopfront login -e shopper@example.com
//! export SHOPFRONT_API_TOKEN=...
//!
//! # Inspect and change the cart
//! shopfront cart show
//! shopfront cart add 42 --quantity 2
//! shopfront cart update 7 5
//! shopfront cart remove 7
//!
//! # Coupons and checkout validation
//! shopfront coupon apply SAVE10
//! shopfront validate
//!
//! # Product details (cached)
//! shopfront product 42
//! ```
//!
//! Configuration comes from `SHOPFRONT_*` environment variables (or `.env`).
//! Logs go to stderr; set `RUST_LOG` to adjust verbosity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod output;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront cart client")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the session token
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password (defaults to `SHOPFRONT_PASSWORD`)
        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Apply or remove a coupon
    Coupon {
        #[command(subcommand)]
        action: CouponAction,
    },
    /// Check whether the cart can proceed to checkout
    Validate,
    /// Show a product
    Product {
        /// Product ID
        id: i32,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: i32,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        /// Cart item ID
        item_id: i32,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart item ID
        item_id: i32,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum CouponAction {
    /// Apply a coupon code
    Apply {
        /// Coupon code
        code: String,
    },
    /// Remove the applied coupon
    Remove,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for the client if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cart=info,shopfront=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::load()?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, password).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&ctx, product_id, quantity).await?,
            CartAction::Update { item_id, quantity } => {
                commands::cart::update(&ctx, item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&ctx, item_id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await?,
        },
        Commands::Coupon { action } => match action {
            CouponAction::Apply { code } => commands::cart::apply_coupon(&ctx, &code).await?,
            CouponAction::Remove => commands::cart::remove_coupon(&ctx).await?,
        },
        Commands::Validate => commands::cart::validate(&ctx).await?,
        Commands::Product { id } => commands::catalog::product(&ctx, id).await?,
    }
    Ok(())
}
