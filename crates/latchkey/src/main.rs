// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Latchkey - a personal credential vault.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use latchkey_core::RecordId;

/// Latchkey - a personal credential vault.
#[derive(Parser, Debug)]
#[command(name = "latchkey", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account.
    Register {
        username: String,
    },
    /// Store a credential. The secret is prompted for, or read from stdin.
    Save {
        username: String,
        site: String,
        login: String,
    },
    /// Show the credentials stored for a site.
    Get {
        username: String,
        site: String,
        /// Print secrets in full instead of masked.
        #[arg(long)]
        reveal: bool,
    },
    /// Show every stored credential.
    List {
        username: String,
        #[arg(long)]
        reveal: bool,
    },
    /// Delete a credential by id.
    Delete {
        username: String,
        id: i64,
    },
    /// Run diagnostic checks.
    Doctor {
        /// Also run integrity checks.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => latchkey_config::load_and_validate_path(path),
        None => latchkey_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            latchkey_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Register { username } => commands::run_register(&config, &username).await,
        Commands::Save {
            username,
            site,
            login,
        } => commands::run_save(&config, &username, &site, &login).await,
        Commands::Get {
            username,
            site,
            reveal,
        } => commands::run_get(&config, &username, &site, reveal).await,
        Commands::List { username, reveal } => {
            commands::run_list(&config, &username, reveal).await
        }
        Commands::Delete { username, id } => {
            commands::run_delete(&config, &username, RecordId(id)).await
        }
        Commands::Doctor { deep, plain } => match doctor::run_doctor(&config, deep, plain).await {
            Ok(0) => Ok(()),
            // The report already lists the failures.
            Ok(_) => std::process::exit(1),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("latchkey={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
