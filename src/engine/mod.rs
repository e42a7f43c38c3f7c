//! The attendance engine: check-in/out state machine, break policy
//! enforcement, and the correction approval workflow.
//!
//! [`AttendanceEngine`] owns the record store and talks to the external
//! collaborators (employee directory, shift resolver, audit sink)
//! through trait seams. Every operation is a single read-modify-write
//! against one employee-day, serialized per key, checked against the
//! caller's [`CancelToken`] before anything commits.

mod attendance;
mod breaks;
mod corrections;
mod store;

pub use attendance::{CheckInCommand, CheckOutCommand, ManualEntryCommand, ManualEntryUpdate};
pub use breaks::StartBreakCommand;
pub use corrections::CorrectionRequest;
pub use store::RecordStore;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::config::Settings;
use crate::error::{EngineError, EngineResult};
use crate::external::{AuditAction, AuditEvent, AuditSink, EmployeeDirectory, ShiftResolver};
use crate::models::{EmployeeProfile, RecordKey, ShiftWindow};
use crate::time::Clock;

/// The engine facade. Construct one per process and share it.
pub struct AttendanceEngine {
    store: RecordStore,
    directory: Arc<dyn EmployeeDirectory>,
    shifts: Arc<dyn ShiftResolver>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    settings: Settings,
}

impl AttendanceEngine {
    /// Creates an engine wired to the given collaborators.
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        shifts: Arc<dyn ShiftResolver>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        settings: Settings,
    ) -> Self {
        Self {
            store: RecordStore::new(),
            directory,
            shifts,
            audit,
            clock,
            settings,
        }
    }

    /// Read access to the record store, for embedders that report on it.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Fails with [`EngineError::Cancelled`] once the token is set.
    ///
    /// Called on entry and again immediately before each commit so a
    /// cancelled operation never publishes a mutation.
    pub(crate) fn ensure_live(&self, cancel: &CancelToken, operation: &str) -> EngineResult<()> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Resolves the employee profile, substituting the default zone for
    /// an empty zone id.
    pub(crate) fn resolve_employee(&self, employee_id: &str) -> EngineResult<EmployeeProfile> {
        let mut profile = self.directory.get_by_id(employee_id)?;
        if profile.timezone.trim().is_empty() {
            profile.timezone = self.settings.default_timezone.clone();
        }
        Ok(profile)
    }

    /// The key an in-progress clock operation should act on: today's
    /// record when one exists, otherwise the previous local day's record
    /// when that one is still open. A shift running past local midnight
    /// stays closable from the next calendar day.
    pub(crate) fn open_day_key(&self, employee_id: &str, today: NaiveDate) -> RecordKey {
        let key = RecordKey::new(employee_id.to_string(), today);
        if self.store.get(&key).is_some() {
            return key;
        }
        let Some(previous) = today.pred_opt() else {
            return key;
        };
        let previous_key = RecordKey::new(employee_id.to_string(), previous);
        match self.store.get(&previous_key) {
            Some(record) if record.has_checked_in() && !record.is_checked_out() => previous_key,
            _ => key,
        }
    }

    /// The expected working window for an employee-day: the resolver's
    /// assignment when one exists, otherwise the configured default.
    pub(crate) fn expected_window(&self, employee_id: &str, date: NaiveDate) -> ShiftWindow {
        self.shifts
            .current_shift(employee_id, date)
            .unwrap_or(ShiftWindow {
                start: self.settings.default_shift_start,
                end: self.settings.default_shift_end,
                shift_id: None,
            })
    }

    /// Emits a best-effort audit event; serialization problems are
    /// swallowed, never surfaced to the caller.
    pub(crate) fn audit_change<T: Serialize>(
        &self,
        actor_id: &str,
        entity_name: &str,
        entity_id: String,
        action: AuditAction,
        old_value: Option<&T>,
        new_value: &T,
    ) {
        let event = AuditEvent {
            actor_id: actor_id.to_string(),
            entity_name: entity_name.to_string(),
            entity_id,
            action,
            old_value: old_value.and_then(|v| serde_json::to_value(v).ok()),
            new_value: serde_json::to_value(new_value).ok(),
            at: self.clock.now(),
        };
        self.audit.record(event);
    }
}
