// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixly client diagnostic CLI.
//!
//! Thin wiring over the client core crates: loads configuration, opens the
//! configured byte-store, and reports health. The actual product UIs embed
//! the library crates directly.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod status;

/// Fixly client diagnostics.
#[derive(Parser, Debug)]
#[command(name = "fixly", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check byte-store health and session status.
    Status,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match fixly_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            fixly_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Status) => status::run_status(&config).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("fixly: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("fixly: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_config(config: &fixly_config::FixlyConfig) -> Result<(), fixly_core::FixlyError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| fixly_core::FixlyError::Internal(format!("failed to render config: {e}")))?;
    println!("{rendered}");
    Ok(())
}
