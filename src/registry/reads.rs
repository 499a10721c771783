//! # Read Counter and Queries
//!
//! `read_ebook` is the only access-gated operation. The owner has no
//! bypass: after revoking its own grant, or after receiving a record by
//! transfer, the owner reads only with an explicit entry.

use super::errors::{RegistryError, RegistryResult};
use super::service::{owned, Registry};
use super::types::{CallContext, Principal, RecordId, RecordMetadata};

impl Registry {
    /// Count one read by a caller holding a `true` grant
    pub fn read_ebook(&self, ctx: &CallContext, id: RecordId) -> RegistryResult<()> {
        let mut state = self.lock();
        if !state.contains_record(id) {
            return Err(RegistryError::NotFound);
        }
        if state.access(id, &ctx.caller) != Some(true) {
            return Err(RegistryError::AccessDenied);
        }

        state.increment_reads(id);
        self.metrics.record_read();
        Ok(())
    }

    /// Zero the read counter
    ///
    /// Open to any caller unless the maintenance policy is `OwnerOnly`.
    pub fn reset_read_count(&self, ctx: &CallContext, id: RecordId) -> RegistryResult<()> {
        let mut state = self.lock();
        if self.policy.gates_maintenance() {
            owned(&state, id, &ctx.caller)?;
        } else if !state.contains_record(id) {
            return Err(RegistryError::NotFound);
        }

        state.reset_reads(id);
        Ok(())
    }

    /// Full record view with the current read count
    pub fn get_metadata(&self, id: RecordId) -> RegistryResult<RecordMetadata> {
        let state = self.lock();
        let record = state.record(id).ok_or(RegistryError::NotFound)?;
        let reads = state.read_count(id).unwrap_or(0);
        Ok(RecordMetadata::from_record(id, record, reads))
    }

    pub fn get_owner(&self, id: RecordId) -> RegistryResult<Principal> {
        self.lock()
            .record(id)
            .map(|r| r.owner)
            .ok_or(RegistryError::NotFound)
    }

    /// The record's author is its current controlling owner.
    pub fn get_author(&self, id: RecordId) -> RegistryResult<Principal> {
        self.get_owner(id)
    }

    pub fn get_upload_time(&self, id: RecordId) -> RegistryResult<u64> {
        self.lock()
            .record(id)
            .map(|r| r.created_at)
            .ok_or(RegistryError::NotFound)
    }

    pub fn is_owner(&self, ctx: &CallContext, id: RecordId) -> RegistryResult<bool> {
        Ok(self.get_owner(id)? == ctx.caller)
    }

    pub fn check_admin_access(&self, ctx: &CallContext) -> bool {
        ctx.caller == self.identity.admin
    }

    pub fn get_read_count(&self, id: RecordId) -> RegistryResult<u64> {
        let state = self.lock();
        if !state.contains_record(id) {
            return Err(RegistryError::NotFound);
        }
        Ok(state.read_count(id).unwrap_or(0))
    }

    pub fn get_total_records(&self) -> u64 {
        self.lock().total_records()
    }
}
