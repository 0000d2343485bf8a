//! Midway pricing harness.
//!
//! Prices cart snapshots with `midway-core` and prints the result as JSON.
//! Logs go to stderr so stdout can be piped.
//!
//! # Usage
//!
//! ```bash
//! # Price a cart snapshot
//! midway recompute --cart cart.json
//!
//! # Same, as the order submission snapshot
//! cat cart.json | midway submission
//!
//! # Prepare stored line items for display
//! midway restore --file order_lines.json
//!
//! # Show the effective configuration
//! midway --config ./midway.toml config
//! ```

mod config;
mod error;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use midway_core::validation::validate_line_item;
use midway_core::{restore_stored_order, Cart, CoreError, LineItem};
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "midway")]
#[command(version)]
#[command(about = "Order composition & pricing harness for Midway POS")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, short, global = true, env = "MIDWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, short, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a cart snapshot and print the computed order
    Recompute {
        /// Cart snapshot (reads stdin if not provided)
        #[arg(long)]
        cart: Option<PathBuf>,
    },

    /// Price a cart snapshot and print what would be submitted
    Submission {
        /// Cart snapshot (reads stdin if not provided)
        #[arg(long)]
        cart: Option<PathBuf>,
    },

    /// Apply recorded discount allocations to stored line items
    Restore {
        /// JSON array of line items (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&CliConfig::default().log);
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log);

    let result = match cli.command {
        Commands::Recompute { cart } => cmd_recompute(cart, &config, cli.pretty),
        Commands::Submission { cart } => cmd_submission(cart, &config, cli.pretty),
        Commands::Restore { file } => cmd_restore(file, cli.pretty),
        Commands::Config => cmd_config(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - otherwise the configured directive (`MIDWAY_LOG` / `log` in the file)
fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_recompute(path: Option<PathBuf>, config: &CliConfig, pretty: bool) -> CliResult<()> {
    let cart = load_cart(path)?;
    let order = cart.recompute(&config.pricing);
    info!(
        lines = order.line_items.len(),
        returns = order.return_items.len(),
        total_cents = order.total.cents(),
        "Cart priced"
    );
    print_json(&order, pretty)
}

fn cmd_submission(path: Option<PathBuf>, config: &CliConfig, pretty: bool) -> CliResult<()> {
    let cart = load_cart(path)?;
    let submission = cart.submission(&config.pricing);
    info!(
        lines = submission.line_items.len(),
        total_cents = submission.total.cents(),
        "Submission prepared"
    );
    print_json(&submission, pretty)
}

fn cmd_restore(path: Option<PathBuf>, pretty: bool) -> CliResult<()> {
    let items: Vec<LineItem> = serde_json::from_str(&read_input(path)?)?;
    for item in &items {
        validate_line_item(item).map_err(CoreError::from)?;
    }
    let restored = restore_stored_order(&items);
    print_json(&restored, pretty)
}

fn cmd_config(config: &CliConfig) -> CliResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CliError::InvalidConfig(e.to_string()))?;
    print!("{}", rendered);
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn load_cart(path: Option<PathBuf>) -> CliResult<Cart> {
    let cart = Cart::from_json(&read_input(path)?)?;
    debug!(
        lines = cart.items.len(),
        codes = cart.discount_codes.len(),
        tax_exempt = cart.tax_exempt,
        "Cart snapshot loaded"
    );
    Ok(cart)
}

fn read_input(path: Option<PathBuf>) -> CliResult<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> CliResult<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
