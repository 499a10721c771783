//! Observable events
//!
//! Every log line names one of these.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file parsed and validated
    ConfigLoaded,
    /// Empty state written to a fresh snapshot directory
    StateCreated,
    /// State read back from a snapshot directory
    StateLoaded,
    /// State persisted to a snapshot directory
    StateSaved,
    /// Snapshot checksum verified
    SnapshotVerified,
    /// Snapshot written to a tar archive
    ArchiveExported,
    /// Snapshot directory populated from a tar archive
    ArchiveRestored,
    /// A call was dispatched and succeeded
    CallApplied,
    /// A call was dispatched and returned an error
    CallRejected,
    /// Transaction input stopped early; state is still saved
    StreamAborted,
    /// State could not be persisted
    SaveFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StateCreated => "STATE_CREATED",
            Event::StateLoaded => "STATE_LOADED",
            Event::StateSaved => "STATE_SAVED",
            Event::SnapshotVerified => "SNAPSHOT_VERIFIED",
            Event::ArchiveExported => "ARCHIVE_EXPORTED",
            Event::ArchiveRestored => "ARCHIVE_RESTORED",
            Event::CallApplied => "CALL_APPLIED",
            Event::CallRejected => "CALL_REJECTED",
            Event::StreamAborted => "STREAM_ABORTED",
            Event::SaveFailed => "SAVE_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::ConfigLoaded,
            Event::StateCreated,
            Event::StateLoaded,
            Event::StateSaved,
            Event::SnapshotVerified,
            Event::ArchiveExported,
            Event::ArchiveRestored,
            Event::CallApplied,
            Event::CallRejected,
            Event::StreamAborted,
            Event::SaveFailed,
        ];
        for event in events {
            assert!(event.as_str().chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
        assert_eq!(Event::CallRejected.to_string(), "CALL_REJECTED");
    }
}
