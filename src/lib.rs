//! bookledger - ledger-resident registry of digital-book records
//!
//! Records, per-user access grants and read counters, mutated through
//! owner-checked operations that either apply fully or fail with no effect.
//! State persists as checksummed JSON snapshots.

pub mod cli;
pub mod config;
pub mod observability;
pub mod registry;
pub mod snapshot;
