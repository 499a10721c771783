//! # Registry Policies
//!
//! Two behaviors are left to the operator rather than hard-coded:
//! what happens to access entries and read counters when a record is
//! deleted, and whether the maintenance calls `set_upload_time` and
//! `reset_read_count` require the record owner. Defaults keep the
//! historical ledger behavior.

use serde::{Deserialize, Serialize};

/// Handling of access entries and read counters on delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Leave them in place. They outlive the record and stay visible to
    /// `has_access`.
    #[default]
    Retain,
    /// Purge them together with the record
    Cascade,
}

/// Authorization for `set_upload_time` and `reset_read_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePolicy {
    /// Any caller may invoke them
    #[default]
    Permissive,
    /// Only the record owner may invoke them
    OwnerOnly,
}

/// Policy bundle carried by a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryPolicy {
    #[serde(default)]
    pub orphans: OrphanPolicy,
    #[serde(default)]
    pub maintenance: MaintenancePolicy,
}

impl RegistryPolicy {
    pub fn new(orphans: OrphanPolicy, maintenance: MaintenancePolicy) -> Self {
        Self { orphans, maintenance }
    }

    pub fn cascades_on_delete(&self) -> bool {
        self.orphans == OrphanPolicy::Cascade
    }

    pub fn gates_maintenance(&self) -> bool {
        self.maintenance == MaintenancePolicy::OwnerOnly
    }
}
