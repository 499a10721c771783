//! # Ledger State
//!
//! The three tables plus the total-records scalar. This is the whole
//! persisted state of the registry. Mutation rules live in the service;
//! this module only stores and reports.
//!
//! Serialized through [`StateImage`], which flattens the composite access
//! key into a list so the image stays plain JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Principal, Record, RecordId};

/// In-memory ledger tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StateImage", from = "StateImage")]
pub struct LedgerState {
    records: BTreeMap<RecordId, Record>,
    access: BTreeMap<(RecordId, Principal), bool>,
    read_counts: BTreeMap<RecordId, u64>,
    total_records: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    // Record store

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    pub fn contains_record(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Store a new record under the next sequential id. `None` once every
    /// id has been handed out; the record is not stored.
    pub fn insert_next(&mut self, record: Record) -> Option<RecordId> {
        let id = self.total_records.checked_add(1)?;
        self.records.insert(id, record);
        self.total_records = id;
        Some(id)
    }

    pub fn remove_record(&mut self, id: RecordId) -> Option<Record> {
        self.records.remove(&id)
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn records(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records.iter().map(|(id, r)| (*id, r))
    }

    // Access table

    pub fn access(&self, id: RecordId, user: &Principal) -> Option<bool> {
        self.access.get(&(id, *user)).copied()
    }

    pub fn set_access(&mut self, id: RecordId, user: Principal, can_access: bool) {
        self.access.insert((id, user), can_access);
    }

    pub fn remove_access(&mut self, id: RecordId, user: &Principal) -> Option<bool> {
        self.access.remove(&(id, *user))
    }

    /// Drop every access entry for a record, returning how many were removed
    pub fn purge_access(&mut self, id: RecordId) -> usize {
        let before = self.access.len();
        self.access.retain(|(rid, _), _| *rid != id);
        before - self.access.len()
    }

    // Read counters

    pub fn read_count(&self, id: RecordId) -> Option<u64> {
        self.read_counts.get(&id).copied()
    }

    /// Bump the counter, creating it at 1 on first read
    pub fn increment_reads(&mut self, id: RecordId) -> u64 {
        let count = self.read_counts.entry(id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn reset_reads(&mut self, id: RecordId) {
        self.read_counts.insert(id, 0);
    }

    pub fn remove_reads(&mut self, id: RecordId) -> Option<u64> {
        self.read_counts.remove(&id)
    }

    /// Aggregate counts for operators
    pub fn summary(&self) -> StateSummary {
        let orphaned_grants = self
            .access
            .keys()
            .filter(|(id, _)| !self.records.contains_key(id))
            .count();
        let orphaned_counters = self
            .read_counts
            .keys()
            .filter(|id| !self.records.contains_key(id))
            .count();

        StateSummary {
            total_records: self.total_records,
            live_records: self.records.len(),
            access_entries: self.access.len(),
            orphaned_grants,
            read_counters: self.read_counts.len(),
            orphaned_counters,
        }
    }
}

/// Operator-facing counts over the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub total_records: u64,
    pub live_records: usize,
    pub access_entries: usize,
    pub orphaned_grants: usize,
    pub read_counters: usize,
    pub orphaned_counters: usize,
}

/// One row of the access table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    pub record_id: RecordId,
    pub principal: Principal,
    pub can_access: bool,
}

/// One row of the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: Record,
}

/// One row of the read counter table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadCountEntry {
    pub record_id: RecordId,
    pub count: u64,
}

/// Serialized layout of [`LedgerState`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateImage {
    pub total_records: u64,
    #[serde(default)]
    pub records: Vec<RecordEntry>,
    #[serde(default)]
    pub access: Vec<AccessEntry>,
    #[serde(default)]
    pub read_counts: Vec<ReadCountEntry>,
}

impl From<LedgerState> for StateImage {
    fn from(state: LedgerState) -> Self {
        Self {
            total_records: state.total_records,
            records: state
                .records
                .into_iter()
                .map(|(id, record)| RecordEntry { id, record })
                .collect(),
            access: state
                .access
                .into_iter()
                .map(|((record_id, principal), can_access)| AccessEntry {
                    record_id,
                    principal,
                    can_access,
                })
                .collect(),
            read_counts: state
                .read_counts
                .into_iter()
                .map(|(record_id, count)| ReadCountEntry { record_id, count })
                .collect(),
        }
    }
}

impl From<StateImage> for LedgerState {
    fn from(image: StateImage) -> Self {
        let records: BTreeMap<_, _> = image
            .records
            .into_iter()
            .map(|entry| (entry.id, entry.record))
            .collect();

        // Never hand out an id that is already taken
        let highest = records.keys().next_back().copied().unwrap_or(0);

        Self {
            total_records: image.total_records.max(highest),
            records,
            access: image
                .access
                .into_iter()
                .map(|e| ((e.record_id, e.principal), e.can_access))
                .collect(),
            read_counts: image
                .read_counts
                .into_iter()
                .map(|e| (e.record_id, e.count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: Principal) -> Record {
        Record {
            title: "Dune".to_string(),
            owner,
            size: 500_000,
            created_at: 10,
            summary: "A sci-fi epic".to_string(),
            categories: vec!["fiction".to_string()],
        }
    }

    #[test]
    fn test_insert_next_is_sequential() {
        let mut state = LedgerState::new();
        let owner = Principal::from_u128(1);
        assert_eq!(state.insert_next(record(owner)), Some(1));
        assert_eq!(state.insert_next(record(owner)), Some(2));
        state.remove_record(2);
        assert_eq!(state.insert_next(record(owner)), Some(3));
        assert_eq!(state.total_records(), 3);
    }

    #[test]
    fn test_increment_reads_starts_at_one() {
        let mut state = LedgerState::new();
        assert_eq!(state.read_count(1), None);
        assert_eq!(state.increment_reads(1), 1);
        assert_eq!(state.increment_reads(1), 2);
        state.reset_reads(1);
        assert_eq!(state.read_count(1), Some(0));
    }

    #[test]
    fn test_purge_access_only_touches_one_record() {
        let mut state = LedgerState::new();
        let a = Principal::from_u128(1);
        let b = Principal::from_u128(2);
        state.set_access(1, a, true);
        state.set_access(1, b, false);
        state.set_access(2, a, true);

        assert_eq!(state.purge_access(1), 2);
        assert_eq!(state.access(1, &a), None);
        assert_eq!(state.access(2, &a), Some(true));
    }

    #[test]
    fn test_summary_counts_orphans() {
        let mut state = LedgerState::new();
        let owner = Principal::from_u128(1);
        let id = state.insert_next(record(owner)).unwrap();
        state.set_access(id, owner, true);
        state.increment_reads(id);
        state.remove_record(id);

        let summary = state.summary();
        assert_eq!(summary.total_records, 1);
        assert_eq!(summary.live_records, 0);
        assert_eq!(summary.orphaned_grants, 1);
        assert_eq!(summary.orphaned_counters, 1);
    }

    #[test]
    fn test_json_image_roundtrip() {
        let mut state = LedgerState::new();
        let owner = Principal::from_u128(9);
        let id = state.insert_next(record(owner)).unwrap();
        state.set_access(id, owner, true);
        state.increment_reads(id);

        let json = serde_json::to_string(&state).unwrap();
        let restored: LedgerState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_image_repairs_stale_total() {
        let owner = Principal::from_u128(3);
        let image = StateImage {
            total_records: 0,
            records: vec![RecordEntry { id: 5, record: record(owner) }],
            access: vec![],
            read_counts: vec![],
        };
        let mut state = LedgerState::from(image);
        assert_eq!(state.insert_next(record(owner)), Some(6));
    }

    #[test]
    fn test_exhausted_counter_stores_nothing() {
        let owner = Principal::from_u128(4);
        let json = format!(r#"{{"total_records": {}}}"#, u64::MAX);
        let mut state: LedgerState = serde_json::from_str(&json).unwrap();

        assert_eq!(state.insert_next(record(owner)), None);
        assert_eq!(state.total_records(), u64::MAX);
        assert_eq!(state.records().count(), 0);
    }
}
