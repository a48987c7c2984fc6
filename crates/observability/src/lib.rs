//! Tracing and logging (shared setup for every kidstock binary).

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, init};
