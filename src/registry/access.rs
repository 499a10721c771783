//! # Access Table Operations
//!
//! Two ways to grant, one to revoke, three lookups.
//!
//! - `grant_access` is insert-only and refuses the registry's own identity.
//! - `donate_access` overwrites and refuses the caller itself.
//! - `has_access` / `check_access` read `false` for a missing entry.
//! - `get_access_rights` reports a missing entry as `NotFound`.
//!
//! Lookups consult the access table alone, so entries orphaned by a delete
//! stay visible.

use super::errors::{RegistryError, RegistryResult};
use super::service::{owned, Registry};
use super::types::{CallContext, Principal, RecordId};

impl Registry {
    /// Insert a read grant for `user` on an owned record
    pub fn grant_access(&self, ctx: &CallContext, id: RecordId, user: Principal) -> RegistryResult<()> {
        let mut state = self.lock();
        owned(&state, id, &ctx.caller)?;
        if user == self.identity.contract {
            return Err(RegistryError::InvalidRecipient);
        }
        if state.access(id, &user).is_some() {
            return Err(RegistryError::Exists);
        }

        state.set_access(id, user, true);
        self.metrics.record_grant();
        Ok(())
    }

    /// Set a read grant for `recipient`, overwriting any existing entry
    pub fn donate_access(
        &self,
        ctx: &CallContext,
        id: RecordId,
        recipient: Principal,
    ) -> RegistryResult<()> {
        let mut state = self.lock();
        owned(&state, id, &ctx.caller)?;
        if recipient == ctx.caller {
            return Err(RegistryError::InvalidRecipient);
        }

        state.set_access(id, recipient, true);
        self.metrics.record_grant();
        Ok(())
    }

    /// Remove the entry for `user` entirely
    pub fn revoke_access(&self, ctx: &CallContext, id: RecordId, user: Principal) -> RegistryResult<()> {
        let mut state = self.lock();
        owned(&state, id, &ctx.caller)?;
        if user == self.identity.contract {
            return Err(RegistryError::InvalidRecipient);
        }
        if state.access(id, &user).is_none() {
            return Err(RegistryError::AccessError);
        }

        state.remove_access(id, &user);
        self.metrics.record_revoke();
        Ok(())
    }

    pub fn has_access(&self, id: RecordId, user: &Principal) -> bool {
        self.lock().access(id, user).unwrap_or(false)
    }

    /// `has_access` for the caller
    pub fn check_access(&self, ctx: &CallContext, id: RecordId) -> bool {
        self.has_access(id, &ctx.caller)
    }

    /// Strict lookup: a missing entry is an error, not `false`
    pub fn get_access_rights(&self, id: RecordId, user: &Principal) -> RegistryResult<bool> {
        self.lock().access(id, user).ok_or(RegistryError::NotFound)
    }
}
