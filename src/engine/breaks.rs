//! Break management under the per-type policy table.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::engine::AttendanceEngine;
use crate::error::{EngineError, EngineResult};
use crate::external::AuditAction;
use crate::models::{AttendanceStatus, BreakRecord, BreakType};
use crate::policy::BreakPolicy;
use crate::time::to_local;

/// Input for starting a break.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartBreakCommand {
    /// The employee taking the break.
    pub employee_id: String,
    /// The kind of break; decides the duration limit and paid flag.
    pub break_type: BreakType,
    /// Where the break was started, when captured.
    pub location: Option<String>,
    /// Free-text reason supplied by the employee.
    pub reason: Option<String>,
}

impl AttendanceEngine {
    /// Opens a break on the employee's open attendance record: today's,
    /// or the previous local day's when that shift is still running
    /// past midnight.
    ///
    /// Fails with [`EngineError::NotCheckedIn`] when no checked-in
    /// record exists for today, [`EngineError::AlreadyCheckedOut`] when
    /// the day is closed, and [`EngineError::BreakAlreadyActive`] when a
    /// break is already open — open breaks are never replaced or queued,
    /// since check-out's reconciliation depends on there being at most
    /// one to force-close. Sets the record status to
    /// [`AttendanceStatus::OnBreak`].
    pub fn start_break(
        &self,
        command: StartBreakCommand,
        cancel: &CancelToken,
    ) -> EngineResult<BreakRecord> {
        self.ensure_live(cancel, "start_break")?;
        let employee = self.resolve_employee(&command.employee_id)?;

        let now = self.clock_now();
        let local_now = to_local(now, &employee.timezone);
        let key = self.open_day_key(&employee.id, local_now.date());
        let date = key.date;

        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = match self.store().get(&key) {
            Some(record) if record.has_checked_in() => record,
            _ => {
                return Err(EngineError::NotCheckedIn {
                    employee_id: employee.id,
                    date,
                });
            }
        };
        if record.is_checked_out() {
            return Err(EngineError::AlreadyCheckedOut {
                employee_id: employee.id,
                date,
            });
        }
        if record.open_break().is_some() {
            return Err(EngineError::BreakAlreadyActive {
                employee_id: employee.id,
            });
        }
        let before = record.clone();

        let policy = BreakPolicy::for_type(command.break_type);
        let break_record = BreakRecord::open(
            command.break_type,
            policy,
            now,
            local_now,
            command.location,
            command.reason,
        );
        record.breaks.push(break_record.clone());
        record.status = AttendanceStatus::OnBreak;
        record.updated_at = now;

        self.ensure_live(cancel, "start_break")?;
        self.store().commit(record.clone());
        tracing::debug!(
            employee = %record.employee_id,
            break_type = ?command.break_type,
            max_minutes = ?policy.max_minutes,
            "break started"
        );
        self.audit_change(
            &record.employee_id,
            "attendance_record",
            record.id.to_string(),
            AuditAction::Update,
            Some(&before),
            &record,
        );
        Ok(break_record)
    }

    /// Closes the employee's open break and derives its duration. A
    /// break still open past local midnight closes onto the previous
    /// day's record.
    ///
    /// Fails with [`EngineError::NoActiveBreak`] when nothing is open.
    /// A break that ran past its limit is flagged as exceeding and
    /// routed into pending approval; the overage never rejects the end.
    /// Restores the record status to [`AttendanceStatus::Present`].
    pub fn end_break(
        &self,
        employee_id: &str,
        cancel: &CancelToken,
    ) -> EngineResult<BreakRecord> {
        self.ensure_live(cancel, "end_break")?;
        let employee = self.resolve_employee(employee_id)?;

        let now = self.clock_now();
        let local_now = to_local(now, &employee.timezone);
        let key = self.open_day_key(&employee.id, local_now.date());

        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record =
            self.store()
                .get(&key)
                .ok_or_else(|| EngineError::NoActiveBreak {
                    employee_id: employee.id.clone(),
                })?;
        let before = record.clone();

        let Some(open) = record.open_break_mut() else {
            return Err(EngineError::NoActiveBreak {
                employee_id: employee.id,
            });
        };
        open.close(now, local_now);
        let closed = open.clone();
        record.status = AttendanceStatus::Present;
        record.updated_at = now;

        self.ensure_live(cancel, "end_break")?;
        self.store().commit(record.clone());
        if closed.is_exceeding {
            tracing::info!(
                employee = %record.employee_id,
                break_type = ?closed.break_type,
                duration_minutes = ?closed.duration_minutes,
                exceeded_minutes = closed.exceeded_minutes,
                "break ended over its limit, routed to approval"
            );
        } else {
            tracing::debug!(
                employee = %record.employee_id,
                break_type = ?closed.break_type,
                duration_minutes = ?closed.duration_minutes,
                "break ended"
            );
        }
        self.audit_change(
            &record.employee_id,
            "attendance_record",
            record.id.to_string(),
            AuditAction::Update,
            Some(&before),
            &record,
        );
        Ok(closed)
    }
}
