//! Command-line interface
//!
//! - init: create an empty snapshot
//! - apply: stream transactions from stdin
//! - inspect: summary or single-record metadata
//! - verify: manifest checksum check
//! - backup / restore: tar archive of the snapshot

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    apply_stream, backup_ledger, init_ledger, inspect_ledger, restore_ledger, run, run_command,
    verify_ledger, ApplyReport,
};
pub use errors::{CliError, CliErrorCode, CliResult};
