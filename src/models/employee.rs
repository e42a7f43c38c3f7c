//! Employee profile and shift window types.
//!
//! These are the shapes the engine consumes from its external
//! collaborators: the employee directory and the shift resolver.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The directory's view of an employee, as consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Unique identifier for the employee.
    pub id: String,
    /// The branch the employee belongs to.
    pub branch_id: String,
    /// IANA time-zone id of the employee's branch (e.g. "Asia/Dhaka").
    pub timezone: String,
    /// Daily working hours before overtime starts accruing.
    pub normal_working_hours: Decimal,
    /// Multiplier applied to overtime by downstream payroll.
    pub overtime_rate: Decimal,
}

/// An employee's expected working window for one date.
///
/// Produced by the shift resolver; absence of a window means the branch
/// default applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// Expected branch-local start time.
    pub start: NaiveTime,
    /// Expected branch-local end time.
    pub end: NaiveTime,
    /// Identifier of the shift assignment, when one exists.
    pub shift_id: Option<String>,
}
