//! The attendance record: one employee's presence for one calendar day.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::BreakRecord;
use crate::time::{minutes_between, minutes_to_hours};

/// High-level status of an employee's day.
///
/// `Absent` is the derived default when no record exists; `OnLeave` is
/// set through manual entry. A closed day keeps its `Present`/`Late`
/// status — "checked out" is derived from the check-out timestamp being
/// set, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Checked in on time.
    Present,
    /// Checked in after the expected start.
    Late,
    /// Currently on an open break.
    OnBreak,
    /// No presence recorded for the day.
    Absent,
    /// Excused absence recorded manually.
    OnLeave,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::OnBreak => "on_break",
            Self::Absent => "absent",
            Self::OnLeave => "on_leave",
        };
        f.write_str(name)
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    /// Parses a status name, tolerating case and `PascalCase`/`snake_case`
    /// spellings, as correction values arrive as opaque strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' ', '-'], "").as_str() {
            "present" => Ok(Self::Present),
            "late" => Ok(Self::Late),
            "onbreak" => Ok(Self::OnBreak),
            "absent" => Ok(Self::Absent),
            "onleave" => Ok(Self::OnLeave),
            _ => Err(format!("unknown attendance status '{s}'")),
        }
    }
}

/// One captured clock event: the instant in both forms plus the
/// client metadata that arrived with it.
///
/// Conversion to branch-local time happens once, at write time, so
/// later reporting never re-derives local time under a possibly-changed
/// zone rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckEvent {
    /// The instant in UTC.
    pub at_utc: DateTime<Utc>,
    /// The same instant on the branch's wall clock.
    pub at_local: NaiveDateTime,
    /// Where the event was recorded, when captured.
    pub location: Option<String>,
    /// Client IP address, when captured.
    pub ip_address: Option<String>,
    /// Client device description, when captured.
    pub device: Option<String>,
}

/// An opaque structured payload captured at check-in (e.g. a weather
/// snapshot). The engine persists and returns it without interpreting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherSnapshot(pub serde_json::Value);

/// The map key for attendance records: one record per employee per
/// branch-local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The branch-local calendar day.
    pub date: NaiveDate,
}

impl RecordKey {
    /// Builds a key for the given employee and day.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
        }
    }
}

/// One employee's attendance for one calendar day.
///
/// Created by the first check-in of the day or by manual entry, mutated
/// by check-out, breaks, and approved corrections, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The employee's branch at the time the record was created.
    pub branch_id: String,
    /// The branch-local calendar day the record tracks.
    pub date: NaiveDate,
    /// The check-in event, once it happened.
    pub check_in: Option<CheckEvent>,
    /// The check-out event. Always `None` until `check_in` is set.
    pub check_out: Option<CheckEvent>,
    /// High-level status of the day.
    pub status: AttendanceStatus,
    /// Branch-local instant the employee was expected to start.
    pub expected_check_in: NaiveDateTime,
    /// Minutes the employee arrived after the expected start; zero when
    /// on time.
    pub late_arrival_minutes: i64,
    /// Net working hours, set only after check-out.
    pub total_working_hours: Option<Decimal>,
    /// Total minutes spent on closed breaks.
    pub break_minutes: i64,
    /// Hours past the employee's normal working hours, set with the
    /// working total.
    pub overtime_hours: Option<Decimal>,
    /// The shift assignment the expectations came from, when one existed.
    pub shift_id: Option<String>,
    /// True when the record was created or edited by hand rather than by
    /// live clock events.
    pub is_manual_entry: bool,
    /// Why the manual entry was made.
    pub manual_entry_reason: Option<String>,
    /// Who made the manual entry.
    pub entered_by: Option<String>,
    /// Accumulated free-text notes; appended to, never overwritten.
    pub notes: Option<String>,
    /// Opaque snapshot captured at check-in, if any.
    pub weather: Option<WeatherSnapshot>,
    /// Breaks taken during the day, in start order.
    pub breaks: Vec<BreakRecord>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Creates an empty record for the given employee-day.
    pub fn new(
        employee_id: impl Into<String>,
        branch_id: impl Into<String>,
        date: NaiveDate,
        expected_check_in: NaiveDateTime,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            branch_id: branch_id.into(),
            date,
            check_in: None,
            check_out: None,
            status: AttendanceStatus::Absent,
            expected_check_in,
            late_arrival_minutes: 0,
            total_working_hours: None,
            break_minutes: 0,
            overtime_hours: None,
            shift_id: None,
            is_manual_entry: false,
            manual_entry_reason: None,
            entered_by: None,
            notes: None,
            weather: None,
            breaks: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Returns the record's map key.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.employee_id.clone(), self.date)
    }

    /// Returns true once a check-in has been recorded.
    pub fn has_checked_in(&self) -> bool {
        self.check_in.is_some()
    }

    /// Returns true once a check-out has been recorded.
    pub fn is_checked_out(&self) -> bool {
        self.check_out.is_some()
    }

    /// Returns the currently open break, if one exists.
    ///
    /// At most one break is ever open; check-out's reconciliation
    /// depends on this.
    pub fn open_break(&self) -> Option<&BreakRecord> {
        self.breaks.iter().find(|b| b.is_open())
    }

    /// Mutable access to the currently open break.
    pub fn open_break_mut(&mut self) -> Option<&mut BreakRecord> {
        self.breaks.iter_mut().find(|b| b.is_open())
    }

    /// Appends a note, preserving any prior notes.
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        match &mut self.notes {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(note);
            }
            None => self.notes = Some(note.to_string()),
        }
    }

    /// Recomputes the derived totals from the stored timestamps.
    ///
    /// `working hours = (check-out − check-in) − Σ closed break
    /// durations`, and `overtime = max(0, working − normal)`. A no-op
    /// until both timestamps are present; totals are only ever set on a
    /// closed day.
    pub fn recompute_totals(&mut self, normal_working_hours: Decimal) {
        let (Some(check_in), Some(check_out)) = (&self.check_in, &self.check_out) else {
            return;
        };

        self.break_minutes = self
            .breaks
            .iter()
            .filter_map(|b| b.duration_minutes)
            .sum();

        let elapsed = minutes_between(check_in.at_utc, check_out.at_utc);
        let working = minutes_to_hours(elapsed - self.break_minutes);
        let overtime = (working - normal_working_hours).max(Decimal::ZERO);

        self.total_working_hours = Some(working);
        self.overtime_hours = Some(overtime);
    }
}
