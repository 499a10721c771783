//! CLI argument definitions using clap
//!
//! Commands:
//! - bookledger init --config <path>
//! - bookledger apply --config <path>
//! - bookledger inspect --config <path> [--record <id>]
//! - bookledger verify --config <path>
//! - bookledger backup --config <path> --output <archive>
//! - bookledger restore --config <path> --input <archive>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::registry::RecordId;

/// bookledger - ownership, access and read tracking for digital books
#[derive(Parser, Debug)]
#[command(name = "bookledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty ledger snapshot
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./bookledger.json")]
        config: PathBuf,
    },

    /// Apply JSON transactions read line by line from stdin
    Apply {
        /// Path to configuration file
        #[arg(long, default_value = "./bookledger.json")]
        config: PathBuf,
    },

    /// Print a state summary, or one record's metadata
    Inspect {
        /// Path to configuration file
        #[arg(long, default_value = "./bookledger.json")]
        config: PathBuf,

        #[arg(long)]
        record: Option<RecordId>,
    },

    /// Check the snapshot manifest against the state file
    Verify {
        /// Path to configuration file
        #[arg(long, default_value = "./bookledger.json")]
        config: PathBuf,
    },

    /// Export the snapshot to a tar archive
    Backup {
        /// Path to configuration file
        #[arg(long, default_value = "./bookledger.json")]
        config: PathBuf,

        /// Archive to write
        #[arg(long)]
        output: PathBuf,
    },

    /// Populate an empty state directory from a tar archive
    Restore {
        /// Path to configuration file
        #[arg(long, default_value = "./bookledger.json")]
        config: PathBuf,

        /// Archive to read
        #[arg(long)]
        input: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
