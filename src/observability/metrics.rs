//! Registry counters
//!
//! Monotonic, reset only when the registry is constructed. Relaxed
//! ordering: readers only need eventually exact totals.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct RegistryMetrics {
    calls_applied: AtomicU64,
    calls_rejected: AtomicU64,
    uploads: AtomicU64,
    deletions: AtomicU64,
    reads: AtomicU64,
    grants_written: AtomicU64,
    grants_revoked: AtomicU64,
}

impl RegistryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        Self::bump(&self.calls_applied);
    }

    pub fn record_rejected(&self) {
        Self::bump(&self.calls_rejected);
    }

    pub fn record_upload(&self) {
        Self::bump(&self.uploads);
    }

    pub fn record_deletion(&self) {
        Self::bump(&self.deletions);
    }

    pub fn record_read(&self) {
        Self::bump(&self.reads);
    }

    /// Counts both insert-only grants and upsert donations
    pub fn record_grant(&self) {
        Self::bump(&self.grants_written);
    }

    pub fn record_revoke(&self) {
        Self::bump(&self.grants_revoked);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls_applied: self.calls_applied.load(Ordering::Relaxed),
            calls_rejected: self.calls_rejected.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            deletions: self.deletions.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            grants_written: self.grants_written.load(Ordering::Relaxed),
            grants_revoked: self.grants_revoked.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub calls_applied: u64,
    pub calls_rejected: u64,
    pub uploads: u64,
    pub deletions: u64,
    pub reads: u64,
    pub grants_written: u64,
    pub grants_revoked: u64,
}
