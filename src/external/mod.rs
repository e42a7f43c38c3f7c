//! Interfaces to the engine's external collaborators.
//!
//! The engine consumes an employee directory, a shift resolver, and an
//! audit sink. Each is a trait seam with an in-memory implementation so
//! the engine can be embedded and tested without any surrounding
//! infrastructure.

mod audit;
mod directory;
mod shift;

pub use audit::{AuditAction, AuditEvent, AuditSink, CollectingAuditSink, NullAuditSink, TracingAuditSink};
pub use directory::{EmployeeDirectory, InMemoryDirectory};
pub use shift::{FixedShiftResolver, NoShiftResolver, ShiftResolver};
