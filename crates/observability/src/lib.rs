//! Tracing setup and the business audit trail.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Append-only audit log of successful business operations.
pub mod audit;

pub use audit::{AuditError, AuditLog};
