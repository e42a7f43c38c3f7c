//! The attendance state machine: check-in, check-out, status, and
//! manual entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::engine::AttendanceEngine;
use crate::error::{EngineError, EngineResult};
use crate::external::AuditAction;
use crate::models::{
    AttendanceRecord, AttendanceStatus, CheckEvent, EmployeeProfile, RecordKey, WeatherSnapshot,
};
use crate::time::{to_local, minutes_between};

/// Hours one attendance day may span at most.
const SHIFT_BOUND_HOURS: i64 = 24;

/// Input for a live check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInCommand {
    /// The employee clocking in.
    pub employee_id: String,
    /// Where the check-in happened, when captured.
    pub location: Option<String>,
    /// Client IP address, when captured.
    pub ip_address: Option<String>,
    /// Client device description, when captured.
    pub device: Option<String>,
    /// Free-text note to attach to the day.
    pub notes: Option<String>,
    /// Opaque structured snapshot to persist with the record.
    pub weather: Option<WeatherSnapshot>,
}

/// Input for a live check-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutCommand {
    /// The employee clocking out.
    pub employee_id: String,
    /// Where the check-out happened, when captured.
    pub location: Option<String>,
    /// Client IP address, when captured.
    pub ip_address: Option<String>,
    /// Client device description, when captured.
    pub device: Option<String>,
    /// Free-text note appended to any existing notes.
    pub notes: Option<String>,
}

/// Input for creating an attendance record by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualEntryCommand {
    /// The employee the entry is for.
    pub employee_id: String,
    /// The branch-local calendar day the entry covers.
    pub date: NaiveDate,
    /// Check-in instant, when known.
    pub check_in: Option<DateTime<Utc>>,
    /// Check-out instant, when known. Requires a check-in.
    pub check_out: Option<DateTime<Utc>>,
    /// The day status to record.
    pub status: AttendanceStatus,
    /// Why the entry is being made by hand.
    pub reason: String,
    /// Who is making the entry.
    pub entered_by: String,
}

/// Partial update to an existing manual entry. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualEntryUpdate {
    /// Replacement check-in instant.
    pub check_in: Option<DateTime<Utc>>,
    /// Replacement check-out instant.
    pub check_out: Option<DateTime<Utc>>,
    /// Replacement day status.
    pub status: Option<AttendanceStatus>,
    /// Why the record is being edited.
    pub reason: String,
    /// Who is editing the record.
    pub entered_by: String,
}

impl AttendanceEngine {
    /// Records a live check-in for the employee's current branch-local day.
    ///
    /// Fails with [`EngineError::AlreadyCheckedIn`] when today's record
    /// already holds a check-in. A partial record for today (for
    /// example, one pre-seeded by manual entry without a check-in) is
    /// updated in place; a duplicate record is never created for the
    /// same employee-day.
    ///
    /// The expected start comes from the shift resolver, defaulting to
    /// the configured window when the employee has no assignment. The
    /// employee is late when the local instant is past the expected
    /// start; `late_arrival_minutes` holds the whole minutes of delay.
    pub fn check_in(
        &self,
        command: CheckInCommand,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceRecord> {
        self.ensure_live(cancel, "check_in")?;
        let employee = self.resolve_employee(&command.employee_id)?;

        let now = self.clock_now();
        let local_now = to_local(now, &employee.timezone);
        let date = local_now.date();
        let key = RecordKey::new(employee.id.clone(), date);

        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        let existing = self.store().get(&key);
        let is_new = existing.is_none();
        let window = self.expected_window(&employee.id, date);
        let expected = date.and_time(window.start);

        let mut record = match existing {
            Some(record) if record.has_checked_in() => {
                return Err(EngineError::AlreadyCheckedIn {
                    employee_id: employee.id,
                    date,
                });
            }
            Some(record) => record,
            None => AttendanceRecord::new(&employee.id, &employee.branch_id, date, expected, now),
        };
        let before = (!is_new).then(|| record.clone());

        record.expected_check_in = expected;
        record.shift_id = window.shift_id;
        record.late_arrival_minutes = (local_now - expected).num_minutes().max(0);
        record.status = if local_now > expected {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        };
        record.check_in = Some(CheckEvent {
            at_utc: now,
            at_local: local_now,
            location: command.location,
            ip_address: command.ip_address,
            device: command.device,
        });
        record.weather = command.weather.or(record.weather.take());
        if let Some(notes) = &command.notes {
            record.append_note(notes);
        }
        record.updated_at = now;

        self.ensure_live(cancel, "check_in")?;
        self.store().commit(record.clone());
        tracing::info!(
            employee = %record.employee_id,
            date = %record.date,
            status = %record.status,
            late_minutes = record.late_arrival_minutes,
            "check-in recorded"
        );
        self.audit_change(
            &record.employee_id,
            "attendance_record",
            record.id.to_string(),
            if is_new { AuditAction::Create } else { AuditAction::Update },
            before.as_ref(),
            &record,
        );
        Ok(record)
    }

    /// Records a live check-out and derives the day's totals.
    ///
    /// Fails with [`EngineError::NotCheckedIn`] when no check-in exists
    /// for today and [`EngineError::AlreadyCheckedOut`] on a second
    /// check-out. When today has no record but the previous local day's
    /// record is still open, the check-out closes that record, so a
    /// shift running past midnight is not stranded.
    /// Any break still open is force-closed at the check-out
    /// instant, with overage flagging applied exactly as a normal break
    /// end, before the totals are derived:
    ///
    /// `working hours = (check-out − check-in) − Σ break durations`,
    /// `overtime = max(0, working hours − normal working hours)`.
    pub fn check_out(
        &self,
        command: CheckOutCommand,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceRecord> {
        self.ensure_live(cancel, "check_out")?;
        let employee = self.resolve_employee(&command.employee_id)?;
        let normal_hours = validated_normal_hours(&employee)?;

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
        let before = record.clone();

        let mut forced_breaks = 0u32;
        while let Some(open) = record.open_break_mut() {
            open.close(now, local_now);
            forced_breaks += 1;
        }
        if record.status == AttendanceStatus::OnBreak {
            record.status = AttendanceStatus::Present;
        }

        record.check_out = Some(CheckEvent {
            at_utc: now,
            at_local: local_now,
            location: command.location,
            ip_address: command.ip_address,
            device: command.device,
        });
        if let Some(notes) = &command.notes {
            record.append_note(notes);
        }
        record.recompute_totals(normal_hours);
        record.updated_at = now;

        self.ensure_live(cancel, "check_out")?;
        self.store().commit(record.clone());
        tracing::info!(
            employee = %record.employee_id,
            date = %record.date,
            forced_breaks,
            working_hours = ?record.total_working_hours,
            overtime_hours = ?record.overtime_hours,
            "check-out recorded"
        );
        self.audit_change(
            &record.employee_id,
            "attendance_record",
            record.id.to_string(),
            AuditAction::Update,
            Some(&before),
            &record,
        );
        Ok(record)
    }

    /// Returns the employee's status for the current branch-local day,
    /// defaulting to [`AttendanceStatus::Absent`] when no record exists.
    pub fn current_status(
        &self,
        employee_id: &str,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceStatus> {
        self.ensure_live(cancel, "current_status")?;
        let employee = self.resolve_employee(employee_id)?;
        let date = to_local(self.clock_now(), &employee.timezone).date();
        let key = RecordKey::new(employee.id, date);

        Ok(self
            .store()
            .get(&key)
            .map(|record| record.status)
            .unwrap_or(AttendanceStatus::Absent))
    }

    /// Creates an attendance record by hand, bypassing the live flow.
    ///
    /// Fails with [`EngineError::DuplicateRecord`] when a record already
    /// exists for the employee-day. Working hours are derived whenever
    /// both timestamps are present.
    pub fn create_manual_entry(
        &self,
        command: ManualEntryCommand,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceRecord> {
        self.ensure_live(cancel, "create_manual_entry")?;
        let employee = self.resolve_employee(&command.employee_id)?;
        let normal_hours = validated_normal_hours(&employee)?;
        validate_entry_span(&employee.id, command.check_in, command.check_out)?;

        let now = self.clock_now();
        let key = RecordKey::new(employee.id.clone(), command.date);

        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        if self.store().get(&key).is_some() {
            return Err(EngineError::DuplicateRecord {
                employee_id: employee.id,
                date: command.date,
            });
        }

        let window = self.expected_window(&employee.id, command.date);
        let expected = command.date.and_time(window.start);
        let mut record =
            AttendanceRecord::new(&employee.id, &employee.branch_id, command.date, expected, now);
        record.shift_id = window.shift_id;
        record.status = command.status;
        record.is_manual_entry = true;
        record.manual_entry_reason = Some(command.reason);
        record.entered_by = Some(command.entered_by.clone());

        if let Some(check_in) = command.check_in {
            let at_local = to_local(check_in, &employee.timezone);
            record.late_arrival_minutes = (at_local - expected).num_minutes().max(0);
            record.check_in = Some(manual_event(check_in, &employee));
        }
        if let Some(check_out) = command.check_out {
            record.check_out = Some(manual_event(check_out, &employee));
        }
        record.recompute_totals(normal_hours);
        record.updated_at = now;

        self.ensure_live(cancel, "create_manual_entry")?;
        self.store().commit(record.clone());
        tracing::info!(
            employee = %record.employee_id,
            date = %record.date,
            entered_by = %command.entered_by,
            "manual attendance entry created"
        );
        self.audit_change(
            &command.entered_by,
            "attendance_record",
            record.id.to_string(),
            AuditAction::Create,
            None::<&AttendanceRecord>,
            &record,
        );
        Ok(record)
    }

    /// Edits an existing record by hand.
    ///
    /// Fails with [`EngineError::RecordNotFound`] when no record exists
    /// for the employee-day. Only the fields present in the update are
    /// touched; totals are re-derived whenever both timestamps end up
    /// present.
    pub fn update_manual_entry(
        &self,
        employee_id: &str,
        date: NaiveDate,
        update: ManualEntryUpdate,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceRecord> {
        self.ensure_live(cancel, "update_manual_entry")?;
        let employee = self.resolve_employee(employee_id)?;
        let normal_hours = validated_normal_hours(&employee)?;

        let now = self.clock_now();
        let key = RecordKey::new(employee.id.clone(), date);

        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut record = self
            .store()
            .get(&key)
            .ok_or_else(|| EngineError::RecordNotFound {
                employee_id: employee.id.clone(),
                date,
            })?;
        let before = record.clone();

        let check_in = update
            .check_in
            .or(record.check_in.as_ref().map(|e| e.at_utc));
        let check_out = update
            .check_out
            .or(record.check_out.as_ref().map(|e| e.at_utc));
        validate_entry_span(&employee.id, check_in, check_out)?;

        if let Some(at) = update.check_in {
            let at_local = to_local(at, &employee.timezone);
            record.late_arrival_minutes = (at_local - record.expected_check_in)
                .num_minutes()
                .max(0);
            record.check_in = Some(manual_event(at, &employee));
        }
        if let Some(at) = update.check_out {
            record.check_out = Some(manual_event(at, &employee));
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        record.is_manual_entry = true;
        record.manual_entry_reason = Some(update.reason);
        record.entered_by = Some(update.entered_by.clone());
        record.recompute_totals(normal_hours);
        record.updated_at = now;

        self.ensure_live(cancel, "update_manual_entry")?;
        self.store().commit(record.clone());
        tracing::info!(
            employee = %record.employee_id,
            date = %record.date,
            entered_by = %update.entered_by,
            "manual attendance entry updated"
        );
        self.audit_change(
            &update.entered_by,
            "attendance_record",
            record.id.to_string(),
            AuditAction::Update,
            Some(&before),
            &record,
        );
        Ok(record)
    }

    pub(crate) fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

fn manual_event(at: DateTime<Utc>, employee: &EmployeeProfile) -> CheckEvent {
    CheckEvent {
        at_utc: at,
        at_local: to_local(at, &employee.timezone),
        location: None,
        ip_address: None,
        device: None,
    }
}

fn validated_normal_hours(employee: &EmployeeProfile) -> EngineResult<Decimal> {
    let hours = employee.normal_working_hours;
    if hours < Decimal::ZERO || hours > Decimal::new(24, 0) {
        return Err(EngineError::InvalidInput {
            field: "normal_working_hours".to_string(),
            message: format!("{hours} is outside the [0, 24] range"),
        });
    }
    Ok(hours)
}

pub(crate) fn validate_entry_span(
    employee_id: &str,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
) -> EngineResult<()> {
    match (check_in, check_out) {
        (None, Some(_)) => Err(EngineError::InvalidInput {
            field: "check_out".to_string(),
            message: "check-out requires a check-in".to_string(),
        }),
        (Some(start), Some(end)) if end < start => Err(EngineError::InvalidInput {
            field: "check_out".to_string(),
            message: "check-out is before check-in".to_string(),
        }),
        (Some(start), Some(end)) => {
            let minutes = minutes_between(start, end);
            if minutes > SHIFT_BOUND_HOURS * 60 {
                return Err(EngineError::ShiftBoundExceeded {
                    employee_id: employee_id.to_string(),
                    hours: minutes / 60,
                    limit: SHIFT_BOUND_HOURS,
                });
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_entry_span_accepts_open_day() {
        assert!(validate_entry_span("emp_001", None, None).is_ok());
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 3, 0, 0).unwrap();
        assert!(validate_entry_span("emp_001", Some(start), None).is_ok());
    }

    #[test]
    fn test_validate_entry_span_rejects_orphan_check_out() {
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let error = validate_entry_span("emp_001", None, Some(end)).unwrap_err();
        assert!(matches!(error, EngineError::InvalidInput { field, .. } if field == "check_out"));
    }

    #[test]
    fn test_validate_entry_span_rejects_reversed_pair() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let error = validate_entry_span("emp_001", Some(start), Some(end)).unwrap_err();
        assert!(matches!(error, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_validate_entry_span_rejects_multi_day_span() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();
        let error = validate_entry_span("emp_001", Some(start), Some(end)).unwrap_err();
        assert!(matches!(
            error,
            EngineError::ShiftBoundExceeded { hours: 27, limit: 24, .. }
        ));
    }

    #[test]
    fn test_validated_normal_hours_bounds() {
        let mut employee = EmployeeProfile {
            id: "emp_001".to_string(),
            branch_id: "hq".to_string(),
            timezone: "UTC".to_string(),
            normal_working_hours: Decimal::new(8, 0),
            overtime_rate: Decimal::new(15, 1),
        };
        assert!(validated_normal_hours(&employee).is_ok());

        employee.normal_working_hours = Decimal::new(25, 0);
        assert!(matches!(
            validated_normal_hours(&employee).unwrap_err(),
            EngineError::InvalidInput { field, .. } if field == "normal_working_hours"
        ));

        employee.normal_working_hours = Decimal::new(-1, 0);
        assert!(validated_normal_hours(&employee).is_err());
    }
}
