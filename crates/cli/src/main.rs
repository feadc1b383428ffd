//! EcoFinds CLI - seeding and inspecting marketplace data.
//!
//! # Usage
//!
//! ```bash
//! # Load the bundled demo users and listings into empty storage
//! ef-cli seed
//!
//! # Replace users and listings with a custom catalog
//! ef-cli seed --file catalog.yaml --force
//!
//! # Inspect stored data
//! ef-cli users list
//! ef-cli products list --seller 2
//! ef-cli purchases list --user 1
//!
//! # Delete every key under the configured prefix
//! ef-cli reset
//! ```
//!
//! # Environment Variables
//!
//! - `ECOFINDS_DATA_DIR` - Directory holding the JSON blobs (default: data)
//! - `ECOFINDS_KEY_PREFIX` - Storage key prefix (default: ecofinds)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ecofinds_core::UserId;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "ef-cli")]
#[command(author, version, about = "EcoFinds CLI tools")]
struct Cli {
    /// Directory holding the JSON blobs
    #[arg(long, global = true, env = "ECOFINDS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Storage key prefix
    #[arg(long, global = true, env = "ECOFINDS_KEY_PREFIX", default_value = "ecofinds")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write users and listings from a seed file
    Seed {
        /// YAML seed file (defaults to the bundled demo data)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Overwrite users and listings that already exist
        #[arg(long)]
        force: bool,
    },
    /// Inspect accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Inspect listings
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect purchase history
    Purchases {
        #[command(subcommand)]
        action: PurchasesAction,
    },
    /// Delete every stored key under the prefix
    Reset,
}

#[derive(Subcommand)]
enum UsersAction {
    /// List all users
    List,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List listings, newest first
    List {
        /// Only listings by this seller ID
        #[arg(short, long)]
        seller: Option<UserId>,
    },
}

#[derive(Subcommand)]
enum PurchasesAction {
    /// List a user's purchases
    List {
        /// Buyer user ID
        #[arg(short, long)]
        user: UserId,
    },
}

fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let storage = commands::open_storage(&cli.data_dir, &cli.prefix)?;

    match cli.command {
        Commands::Seed { file, force } => commands::seed::run(&storage, file.as_deref(), force)?,
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&storage)?,
        },
        Commands::Products { action } => match action {
            ProductsAction::List { seller } => commands::products::list(&storage, seller)?,
        },
        Commands::Purchases { action } => match action {
            PurchasesAction::List { user } => commands::purchases::list(&storage, user)?,
        },
        Commands::Reset => commands::reset::run(&storage)?,
    }
    Ok(())
}
