//! # Registry Service
//!
//! The single stateful object owning every table. All tables sit behind one
//! mutex and each public operation holds it for its whole duration, so two
//! uploads can never observe the same sequence value.
//!
//! Every operation evaluates all of its checks before its first write. A
//! rejected call therefore leaves the tables exactly as it found them.
//!
//! Record store operations live here; access table operations are in
//! `access.rs`, read counters and queries in `reads.rs`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::errors::{RegistryError, RegistryResult};
use super::policy::RegistryPolicy;
use super::state::{LedgerState, StateSummary};
use super::types::{CallContext, Principal, Record, RecordFields, RecordId};
use super::validation::{
    validate_categories, validate_fields, validate_size, validate_summary, validate_upload_time,
};
use crate::config::RegistryConfig;
use crate::observability::{Logger, MetricsSnapshot, RegistryMetrics};

/// Identities the registry itself knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryIdentity {
    /// Deployer, reported by `check_admin_access`
    pub admin: Principal,
    /// Synthetic identity of the registry. Never a valid grant target.
    pub contract: Principal,
}

impl RegistryIdentity {
    pub fn new(admin: Principal, contract: Principal) -> Self {
        Self { admin, contract }
    }
}

/// Book registry
#[derive(Debug)]
pub struct Registry {
    state: Mutex<LedgerState>,
    pub(super) identity: RegistryIdentity,
    pub(super) policy: RegistryPolicy,
    pub(super) metrics: RegistryMetrics,
    pub(super) logger: Logger,
}

impl Registry {
    /// Empty registry with default policy
    pub fn new(identity: RegistryIdentity) -> Self {
        Self::with_state(identity, LedgerState::new())
    }

    /// Registry over previously persisted tables
    pub fn with_state(identity: RegistryIdentity, state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
            identity,
            policy: RegistryPolicy::default(),
            metrics: RegistryMetrics::new(),
            logger: Logger::default(),
        }
    }

    /// Registry wired from a loaded configuration
    pub fn from_config(config: &RegistryConfig, state: LedgerState) -> Self {
        Self::with_state(config.identity(), state)
            .with_policy(config.policy())
            .with_logger(config.logger())
    }

    pub fn with_policy(mut self, policy: RegistryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn identity(&self) -> &RegistryIdentity {
        &self.identity
    }

    pub fn policy(&self) -> RegistryPolicy {
        self.policy
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Copy of the tables, for persistence
    pub fn export_state(&self) -> LedgerState {
        self.lock().clone()
    }

    pub fn summary(&self) -> StateSummary {
        self.lock().summary()
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // No write precedes the last check of a call, so the tables behind a
        // poisoned lock are still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new record owned by the caller
    ///
    /// Field checks run title, size, summary, categories; the first failure
    /// is returned. The caller receives an access grant on the new record.
    pub fn upload(&self, ctx: &CallContext, fields: RecordFields) -> RegistryResult<RecordId> {
        validate_fields(&fields)?;

        let mut state = self.lock();
        let id = state
            .insert_next(Record {
                title: fields.title,
                owner: ctx.caller,
                size: fields.size,
                created_at: ctx.height,
                summary: fields.summary,
                categories: fields.categories,
            })
            .ok_or(RegistryError::Exists)?;
        state.set_access(id, ctx.caller, true);

        self.metrics.record_upload();
        Ok(id)
    }

    /// Replace title, size, summary and categories of an owned record
    pub fn update(&self, ctx: &CallContext, id: RecordId, fields: RecordFields) -> RegistryResult<()> {
        let mut state = self.lock();
        let record = owned_mut(&mut state, id, &ctx.caller)?;
        validate_fields(&fields)?;

        record.title = fields.title;
        record.size = fields.size;
        record.summary = fields.summary;
        record.categories = fields.categories;
        Ok(())
    }

    /// Hand an owned record to `new_owner`
    ///
    /// Access entries stay untouched: the new owner gains owner authority but
    /// not a read grant, and the previous owner keeps any grant it held.
    pub fn transfer_ownership(
        &self,
        ctx: &CallContext,
        id: RecordId,
        new_owner: Principal,
    ) -> RegistryResult<()> {
        let mut state = self.lock();
        let record = owned_mut(&mut state, id, &ctx.caller)?;
        record.owner = new_owner;
        Ok(())
    }

    /// Remove an owned record
    ///
    /// Under the default orphan policy its access entries and read counter
    /// remain in their tables.
    pub fn delete(&self, ctx: &CallContext, id: RecordId) -> RegistryResult<()> {
        let mut state = self.lock();
        owned_mut(&mut state, id, &ctx.caller)?;

        state.remove_record(id);
        if self.policy.cascades_on_delete() {
            state.purge_access(id);
            state.remove_reads(id);
        }

        self.metrics.record_deletion();
        Ok(())
    }

    pub fn set_summary(&self, ctx: &CallContext, id: RecordId, summary: &str) -> RegistryResult<()> {
        let mut state = self.lock();
        let record = owned_mut(&mut state, id, &ctx.caller)?;
        validate_summary(summary)?;
        record.summary = summary.to_string();
        Ok(())
    }

    pub fn set_file_size(&self, ctx: &CallContext, id: RecordId, size: u64) -> RegistryResult<()> {
        let mut state = self.lock();
        let record = owned_mut(&mut state, id, &ctx.caller)?;
        validate_size(size)?;
        record.size = size;
        Ok(())
    }

    pub fn set_categories(
        &self,
        ctx: &CallContext,
        id: RecordId,
        categories: Vec<String>,
    ) -> RegistryResult<()> {
        let mut state = self.lock();
        let record = owned_mut(&mut state, id, &ctx.caller)?;
        validate_categories(&categories)?;
        record.categories = categories;
        Ok(())
    }

    /// Overwrite `created_at`
    ///
    /// Open to any caller unless the maintenance policy is `OwnerOnly`.
    pub fn set_upload_time(&self, ctx: &CallContext, id: RecordId, height: u64) -> RegistryResult<()> {
        let mut state = self.lock();
        let record = if self.policy.gates_maintenance() {
            owned_mut(&mut state, id, &ctx.caller)?
        } else {
            state.record_mut(id).ok_or(RegistryError::NotFound)?
        };
        validate_upload_time(height)?;
        record.created_at = height;
        Ok(())
    }
}

/// Existing record whose owner is `caller`
pub(super) fn owned<'a>(
    state: &'a LedgerState,
    id: RecordId,
    caller: &Principal,
) -> RegistryResult<&'a Record> {
    let record = state.record(id).ok_or(RegistryError::NotFound)?;
    if record.owner != *caller {
        return Err(RegistryError::Unauthorized);
    }
    Ok(record)
}

fn owned_mut<'a>(
    state: &'a mut LedgerState,
    id: RecordId,
    caller: &Principal,
) -> RegistryResult<&'a mut Record> {
    let record = state.record_mut(id).ok_or(RegistryError::NotFound)?;
    if record.owner != *caller {
        return Err(RegistryError::Unauthorized);
    }
    Ok(record)
}
