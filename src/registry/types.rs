//! # Registry Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sequential record identifier, first assigned value is 1
pub type RecordId = u64;

/// Opaque identity of a caller, owner or grant recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(Uuid);

impl Principal {
    /// The all-zero identity, used as the default synthetic registry identity
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Principal {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Execution context supplied by the host for every call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Identity invoking the operation
    pub caller: Principal,
    /// Current block height
    pub height: u64,
}

impl CallContext {
    pub fn new(caller: Principal, height: u64) -> Self {
        Self { caller, height }
    }
}

/// A stored book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub owner: Principal,
    pub size: u64,
    /// Height at upload, adjustable through `set_upload_time`
    pub created_at: u64,
    pub summary: String,
    pub categories: Vec<String>,
}

/// Mutable fields of a record as submitted by `upload` and `update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub title: String,
    pub size: u64,
    pub summary: String,
    pub categories: Vec<String>,
}

impl RecordFields {
    pub fn new(
        title: impl Into<String>,
        size: u64,
        summary: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            size,
            summary: summary.into(),
            categories,
        }
    }
}

/// Record view returned by `get_metadata`, with the read count folded in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub id: RecordId,
    pub title: String,
    pub owner: Principal,
    pub size: u64,
    pub created_at: u64,
    pub summary: String,
    pub categories: Vec<String>,
    pub read_count: u64,
}

impl RecordMetadata {
    pub fn from_record(id: RecordId, record: &Record, read_count: u64) -> Self {
        Self {
            id,
            title: record.title.clone(),
            owner: record.owner,
            size: record.size,
            created_at: record.created_at,
            summary: record.summary.clone(),
            categories: record.categories.clone(),
            read_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_roundtrip_string() {
        let p = Principal::from_u128(42);
        let parsed: Principal = p.to_string().parse().unwrap();
        assert_eq!(parsed, p);
        assert!("not-a-principal".parse::<Principal>().is_err());
    }

    #[test]
    fn test_principal_serializes_as_plain_string() {
        let p = Principal::from_u128(7);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, format!("\"{}\"", p));
    }

    #[test]
    fn test_nil_renders_all_zero() {
        assert_eq!(Principal::nil(), Principal::from_u128(0));
        assert_eq!(
            Principal::nil().to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_ne!(Principal::nil(), Principal::from_u128(1));
    }
}
