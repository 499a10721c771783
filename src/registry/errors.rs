//! # Registry Errors
//!
//! Flat error taxonomy returned by every registry operation. A failed call
//! never leaves a partial mutation behind, so callers can surface the kind
//! verbatim without any cleanup.

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Record not found")]
    NotFound,

    /// Duplicate insert into the access table, or an upload after the
    /// record id counter reached its maximum
    #[error("Entry already exists")]
    Exists,

    /// Title bounds violated. Also reported for summary, category and
    /// upload-time violations to keep the historical codes stable.
    #[error("Invalid title")]
    InvalidTitle,

    #[error("Invalid size")]
    InvalidSize,

    #[error("Caller is not the record owner")]
    Unauthorized,

    #[error("Invalid recipient")]
    InvalidRecipient,

    /// Reserved for administrator-gated operations
    #[error("Administrator only")]
    AdminOnly,

    #[error("Access rights check failed")]
    AccessError,

    #[error("Access denied")]
    AccessDenied,
}

impl RegistryError {
    /// Stable string code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::NotFound => "BOOK_NOT_FOUND",
            RegistryError::Exists => "BOOK_EXISTS",
            RegistryError::InvalidTitle => "BOOK_INVALID_TITLE",
            RegistryError::InvalidSize => "BOOK_INVALID_SIZE",
            RegistryError::Unauthorized => "BOOK_UNAUTHORIZED",
            RegistryError::InvalidRecipient => "BOOK_INVALID_RECIPIENT",
            RegistryError::AdminOnly => "BOOK_ADMIN_ONLY",
            RegistryError::AccessError => "BOOK_ACCESS_ERROR",
            RegistryError::AccessDenied => "BOOK_ACCESS_DENIED",
        }
    }

    /// Numeric code for hosts that only carry an integer error channel
    pub fn wire_code(&self) -> u32 {
        match self {
            RegistryError::NotFound => 100,
            RegistryError::Exists => 101,
            RegistryError::InvalidTitle => 102,
            RegistryError::InvalidSize => 103,
            RegistryError::Unauthorized => 104,
            RegistryError::InvalidRecipient => 105,
            RegistryError::AdminOnly => 106,
            RegistryError::AccessError => 107,
            RegistryError::AccessDenied => 108,
        }
    }
}
