//! Observability for bookledger
//!
//! - Structured JSON logging
//! - Typed events
//! - Atomic counters
//!
//! Observability is read-only: nothing here can change the outcome of a
//! registry call.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{render, Logger, Severity};
pub use metrics::{MetricsSnapshot, RegistryMetrics};
