// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! lmhub - MCP request router between coding assistants and LLM HTTP APIs.
//!
//! This is the binary entry point for the lmhub server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod doctor;
mod history_cmd;
mod serve;

/// lmhub - route AI requests to the right model.
#[derive(Parser, Debug)]
#[command(name = "lmhub", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the MCP server on stdio.
    Serve,
    /// Run diagnostic checks against the lmhub environment.
    Doctor {
        /// Run additional intensive checks (endpoint reachability, DB integrity).
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Inspect or manage the transaction history.
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// Show the most recent transactions.
    Recent {
        /// Maximum number of records to show.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Delete all recorded transactions.
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => lmhub_config::load_and_validate_path(path),
        None => lmhub_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            lmhub_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Doctor { deep, plain }) => doctor::run_doctor(&config, deep, plain).await,
        Some(Commands::History { command }) => match command {
            HistoryCommands::Recent { limit } => history_cmd::run_recent(&config, limit).await,
            HistoryCommands::Clear => history_cmd::run_clear(&config).await,
        },
        None => {
            println!("lmhub: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }
}
