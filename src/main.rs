//! bookledger CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors print to
//! stderr as `CODE: message` and exit non-zero.

use bookledger::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
