//! CLI error types
//!
//! Every CLI error is fatal: printed to stderr as `CODE: message`, exit 1.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::snapshot::SnapshotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    Config,
    Io,
    AlreadyInitialized,
    NotInitialized,
    Snapshot,
    Registry,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config => "BOOK_CLI_CONFIG_ERROR",
            Self::Io => "BOOK_CLI_IO_ERROR",
            Self::AlreadyInitialized => "BOOK_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "BOOK_CLI_NOT_INITIALIZED",
            Self::Snapshot => "BOOK_CLI_SNAPSHOT_ERROR",
            Self::Registry => "BOOK_CLI_REGISTRY_ERROR",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Io, msg)
    }

    pub fn already_initialized(dir: &str) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Ledger already initialized at {}", dir),
        )
    }

    pub fn not_initialized(dir: &str) -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            format!("No ledger at {}. Run 'bookledger init' first.", dir),
        )
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::Config, format!("{} ({})", e, e.code()))
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        Self::new(CliErrorCode::Snapshot, format!("{} ({})", e, e.code()))
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        Self::new(CliErrorCode::Registry, format!("{} ({})", e, e.code()))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_leads_with_code() {
        let err = CliError::not_initialized("/srv/ledger");
        assert!(err.to_string().starts_with("BOOK_CLI_NOT_INITIALIZED: "));
        assert!(err.message().contains("/srv/ledger"));
    }

    #[test]
    fn test_wrapped_errors_keep_inner_code() {
        let err = CliError::from(SnapshotError::Missing("/srv/ledger".into()));
        assert_eq!(err.code(), CliErrorCode::Snapshot);
        assert!(err.message().contains("BOOK_SNAPSHOT_MISSING"));

        let err = CliError::from(RegistryError::NotFound);
        assert!(err.message().contains("BOOK_NOT_FOUND"));
    }
}
