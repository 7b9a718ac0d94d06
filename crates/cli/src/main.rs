//! Alyssa Loops CLI - Storefront client.
//!
//! Keeps a cart on disk the way the site keeps it in the browser, and talks
//! to the storefront API for checkout and custom order requests.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog and fill the cart
//! loops catalog
//! loops cart add-product bunny
//! loops cart add "Custom Frog Hat" 30
//!
//! # Pay
//! loops checkout
//!
//! # Ask for a custom piece
//! loops contact --name Ada --email ada@example.com --details "A frog hat"
//!
//! # Join the newsletter (demo, nothing is sent)
//! loops newsletter --email ada@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `LOOPS_API_BASE` - Storefront API base URL (default: <http://localhost:3000>)
//! - `LOOPS_DATA_DIR` - Directory holding the cart (default: `.loops`)
//! - `LOOPS_CATALOG` - Catalog file (default: `catalog.json`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use alyssa_loops_core::cart::{CartStore, RowAction};
use alyssa_loops_core::contact::{ContactRequest, FormNote, NewsletterNote};

mod client;
mod commands;
mod storage;

use client::HttpClient;
use storage::FileStorage;

#[derive(Parser)]
#[command(name = "loops")]
#[command(author, version, about = "Alyssa Loops storefront client")]
struct Cli {
    /// Storefront API base URL
    #[arg(
        long,
        env = "LOOPS_API_BASE",
        default_value = "http://localhost:3000",
        global = true
    )]
    api_base: String,

    /// Directory holding the cart
    #[arg(long, env = "LOOPS_DATA_DIR", default_value = ".loops", global = true)]
    data_dir: PathBuf,

    /// Catalog file of add-to-cart products
    #[arg(long, env = "LOOPS_CATALOG", default_value = "catalog.json", global = true)]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List catalog products
    Catalog,
    /// Start a hosted checkout for the cart
    Checkout,
    /// Send a custom order request
    Contact {
        /// Your name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Your email address
        #[arg(short, long, default_value = "")]
        email: String,

        /// What you would like made
        #[arg(short, long, default_value = "")]
        details: String,
    },
    /// Sign up for the newsletter
    Newsletter {
        /// Your email address
        #[arg(short, long, default_value = "")]
        email: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of an item at a price
    Add {
        /// Item name
        name: String,
        /// Unit price in dollars
        price: String,
    },
    /// Add one unit of a catalog product
    AddProduct {
        /// Product id from the catalog
        id: String,
    },
    /// Increase an item's quantity
    Inc {
        /// Item name
        name: String,
    },
    /// Decrease an item's quantity, removing it at zero
    Dec {
        /// Item name
        name: String,
    },
    /// Remove an item
    Remove {
        /// Item name
        name: String,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is the command's output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "alyssa_loops_cli=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a command. Returns whether it succeeded from the shopper's view.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();
    let mut store = CartStore::load(FileStorage::new(&cli.data_dir))?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store, &mut out)?,
            CartAction::Add { name, price } => {
                commands::cart::add(&mut store, &name, &price, &mut out)?;
            }
            CartAction::AddProduct { id } => {
                let catalog = commands::catalog::load(&cli.catalog)?;
                commands::cart::add_product(&mut store, &catalog, &id, &mut out)?;
            }
            CartAction::Inc { name } => {
                commands::cart::adjust(&mut store, &name, RowAction::Increase, &mut out)?;
            }
            CartAction::Dec { name } => {
                commands::cart::adjust(&mut store, &name, RowAction::Decrease, &mut out)?;
            }
            CartAction::Remove { name } => commands::cart::remove(&mut store, &name, &mut out)?,
            CartAction::Clear => commands::cart::clear(&mut store, &mut out)?,
        },
        Commands::Catalog => {
            let catalog = commands::catalog::load(&cli.catalog)?;
            commands::catalog::list(&catalog, &mut out)?;
        }
        Commands::Checkout => {
            let api = HttpClient::new(&cli.api_base)?;
            let outcome = commands::checkout::run(&store, &api, &mut out).await?;
            return Ok(outcome.is_success());
        }
        Commands::Contact {
            name,
            email,
            details,
        } => {
            let api = HttpClient::new(&cli.api_base)?;
            let request = ContactRequest::new(&name, &email, &details);
            let note = commands::contact::run(&request, &api, &mut out).await?;
            return Ok(matches!(note, FormNote::Sent { .. }));
        }
        Commands::Newsletter { email } => {
            let note = commands::newsletter::run(&email, &mut out)?;
            return Ok(matches!(note, NewsletterNote::Subscribed { .. }));
        }
    }

    out.flush()?;
    Ok(true)
}
