//! Snapshot manifest
//!
//! `manifest.json` names the state file it describes and carries its
//! checksum:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "generation": 4,
//!   "state_file": "state-4.json",
//!   "created_at": "2026-10-19T08:30:00Z",
//!   "total_records": 12,
//!   "live_records": 10,
//!   "state_checksum": "crc32:1c291ca3"
//! }
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::errors::SnapshotResult;
use crate::registry::StateSummary;

/// Current on-disk format
pub const FORMAT_VERSION: u8 = 1;

/// File name of the state written by save number `generation`
pub fn state_file_name(generation: u64) -> String {
    format!("state-{}.json", generation)
}

/// True for names `state_file_name` can produce
pub fn is_state_file_name(name: &str) -> bool {
    name.strip_prefix("state-")
        .and_then(|rest| rest.strip_suffix(".json"))
        .map_or(false, |digits| {
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateManifest {
    pub format_version: u8,
    /// Save counter, starts at 1
    pub generation: u64,
    /// State file in the same directory
    pub state_file: String,
    /// RFC 3339, UTC, second precision
    pub created_at: String,
    pub total_records: u64,
    pub live_records: usize,
    pub state_checksum: String,
}

impl StateManifest {
    pub fn new(
        summary: &StateSummary,
        generation: u64,
        state_checksum: impl Into<String>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            generation,
            state_file: state_file_name(generation),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            total_records: summary.total_records,
            live_records: summary.live_records,
            state_checksum: state_checksum.into(),
        }
    }

    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
