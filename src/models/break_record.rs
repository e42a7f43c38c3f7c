//! Break records nested under an attendance record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::BreakPolicy;

/// The kind of break an employee takes.
///
/// Each type carries its own duration limit and paid flag, looked up
/// through [`BreakPolicy::for_type`](crate::policy::BreakPolicy::for_type).
/// `Other` is the bucket for types the policy table does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    /// Short tea/coffee break.
    Tea,
    /// The main meal break of the day.
    Lunch,
    /// Personal errand.
    Personal,
    /// Work meeting logged as a break from the desk.
    Meeting,
    /// Prayer break.
    Prayer,
    /// Medical break.
    Medical,
    /// Unplanned emergency.
    Emergency,
    /// Any type the policy table does not recognize.
    Other,
}

/// Whether an over-limit break still needs a supervisor's sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakApprovalStatus {
    /// The break stayed within its limit; nothing to approve.
    NotRequired,
    /// The break exceeded its limit and awaits a decision.
    Pending,
    /// A supervisor accepted the overage.
    Approved,
    /// A supervisor rejected the overage.
    Rejected,
}

/// One break taken during an attendance day.
///
/// Created open by `start_break` and closed by `end_break`, or force-closed
/// by check-out. At most one break per attendance record may be open at a
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakRecord {
    /// Unique identifier for the break.
    pub id: Uuid,
    /// The kind of break.
    pub break_type: BreakType,
    /// When the break started, in UTC.
    pub start_utc: DateTime<Utc>,
    /// When the break started, branch-local wall clock.
    pub start_local: NaiveDateTime,
    /// When the break ended, in UTC. `None` while the break is open.
    pub end_utc: Option<DateTime<Utc>>,
    /// When the break ended, branch-local wall clock.
    pub end_local: Option<NaiveDateTime>,
    /// Whether the break counts as paid time for downstream payroll.
    pub is_paid: bool,
    /// Duration limit from the policy table. `None` means unlimited.
    pub max_allowed_minutes: Option<i64>,
    /// Elapsed minutes, computed when the break closes.
    pub duration_minutes: Option<i64>,
    /// True when the closed break ran past its limit.
    pub is_exceeding: bool,
    /// Minutes past the limit; zero when within it.
    pub exceeded_minutes: i64,
    /// Sign-off state for over-limit breaks.
    pub approval_status: BreakApprovalStatus,
    /// Where the break was taken, when captured.
    pub location: Option<String>,
    /// Free-text reason supplied by the employee.
    pub reason: Option<String>,
}

impl BreakRecord {
    /// Opens a new break of the given type under its policy.
    pub fn open(
        break_type: BreakType,
        policy: BreakPolicy,
        start_utc: DateTime<Utc>,
        start_local: NaiveDateTime,
        location: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            break_type,
            start_utc,
            start_local,
            end_utc: None,
            end_local: None,
            is_paid: policy.is_paid,
            max_allowed_minutes: policy.max_minutes,
            duration_minutes: None,
            is_exceeding: false,
            exceeded_minutes: 0,
            approval_status: BreakApprovalStatus::NotRequired,
            location,
            reason,
        }
    }

    /// Returns true while the break has no end time.
    pub fn is_open(&self) -> bool {
        self.end_utc.is_none()
    }

    /// Closes the break and derives its duration and overage.
    ///
    /// `duration = end − start` exactly, in whole minutes. When a limit
    /// is configured and the duration runs past it, the break is flagged
    /// as exceeding and routed into pending approval; the overage never
    /// rejects the close. Without a limit, or within it, no approval is
    /// required.
    pub fn close(&mut self, end_utc: DateTime<Utc>, end_local: NaiveDateTime) {
        let duration = (end_utc - self.start_utc).num_minutes();
        self.end_utc = Some(end_utc);
        self.end_local = Some(end_local);
        self.duration_minutes = Some(duration);

        match self.max_allowed_minutes {
            Some(max) if duration > max => {
                self.is_exceeding = true;
                self.exceeded_minutes = duration - max;
                self.approval_status = BreakApprovalStatus::Pending;
            }
            _ => {
                self.is_exceeding = false;
                self.exceeded_minutes = 0;
                self.approval_status = BreakApprovalStatus::NotRequired;
            }
        }
    }
}
