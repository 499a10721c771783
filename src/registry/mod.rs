//! # Book Registry
//!
//! Record store, access table and read counters behind one service object.
//!
//! Every operation takes an explicit [`CallContext`] carrying the caller and
//! the current height; the registry never reads ambient state. Operations
//! are atomic: they either apply fully or return an error with no effect.

pub mod errors;
pub mod policy;
pub mod state;
pub mod transaction;
pub mod types;
pub mod validation;

mod access;
mod reads;
mod service;

pub use errors::{RegistryError, RegistryResult};
pub use policy::{MaintenancePolicy, OrphanPolicy, RegistryPolicy};
pub use service::{Registry, RegistryIdentity};
pub use state::{LedgerState, StateSummary};
pub use transaction::{Call, CallOutput, Transaction};
pub use types::{CallContext, Principal, Record, RecordFields, RecordId, RecordMetadata};
