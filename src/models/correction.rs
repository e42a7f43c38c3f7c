//! Correction requests against attendance records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which field of the target record a correction disputes.
///
/// The original and corrected values travel as opaque strings and are
/// parsed per type at approval time: an RFC 3339 timestamp for the
/// clock-time types, a status name for `AttendanceStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionType {
    /// The recorded check-in timestamp is disputed.
    CheckInTime,
    /// The recorded check-out timestamp is disputed.
    CheckOutTime,
    /// The recorded day status is disputed.
    AttendanceStatus,
    /// A break entry is disputed; resolved by hand, no structured apply.
    BreakAdjustment,
    /// Anything else; resolved by hand, no structured apply.
    Other,
}

impl fmt::Display for CorrectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckInTime => "check_in_time",
            Self::CheckOutTime => "check_out_time",
            Self::AttendanceStatus => "attendance_status",
            Self::BreakAdjustment => "break_adjustment",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a correction. `Approved` and `Rejected` are
/// terminal; no further mutation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted and applied to the target record.
    Approved,
    /// Declined; the target record was not touched.
    Rejected,
}

impl fmt::Display for CorrectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// A request to correct one field of an attendance record.
///
/// Created pending; an approval applies the corrected value to the
/// target record exactly once, at approval time, then the correction is
/// immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceCorrection {
    /// Unique identifier for the correction.
    pub id: Uuid,
    /// The attendance record the correction targets.
    pub attendance_id: Uuid,
    /// The employee the target record belongs to.
    pub employee_id: String,
    /// The branch the target record belongs to, for scoped listings.
    pub branch_id: String,
    /// The branch-local day of the target record.
    pub attendance_date: NaiveDate,
    /// Who asked for the correction.
    pub requested_by: String,
    /// Which field is disputed.
    pub correction_type: CorrectionType,
    /// The value currently on the record, as an opaque string.
    pub original_value: String,
    /// The value the requester claims is right, as an opaque string.
    pub corrected_value: String,
    /// Why the correction is needed.
    pub reason: String,
    /// Lifecycle state.
    pub status: CorrectionStatus,
    /// Who decided the correction, once decided.
    pub decided_by: Option<String>,
    /// When the correction was decided.
    pub decided_at: Option<DateTime<Utc>>,
    /// Free-text comments attached to the decision.
    pub decision_comments: Option<String>,
    /// When the correction was requested.
    pub requested_at: DateTime<Utc>,
}

impl AttendanceCorrection {
    /// Returns true while the correction awaits a decision.
    pub fn is_pending(&self) -> bool {
        self.status == CorrectionStatus::Pending
    }
}

/// The result of approving a correction.
///
/// Approval is tolerant of unparsable corrected values: the correction
/// still reaches `Approved`, but the target field is left unchanged and
/// named in `skipped_field` so callers see the partial success instead
/// of a silent no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// The correction in its terminal state.
    pub correction: AttendanceCorrection,
    /// The record field the corrected value was applied to, when it was.
    pub applied_field: Option<String>,
    /// The record field that was skipped because the corrected value
    /// did not parse (or the type has no structured apply).
    pub skipped_field: Option<String>,
}

impl ApprovalOutcome {
    /// Returns true when the corrected value reached the target record.
    pub fn fully_applied(&self) -> bool {
        self.applied_field.is_some() && self.skipped_field.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn correction(status: CorrectionStatus) -> AttendanceCorrection {
        AttendanceCorrection {
            id: Uuid::new_v4(),
            attendance_id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            branch_id: "dhaka_hq".to_string(),
            attendance_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            requested_by: "emp_001".to_string(),
            correction_type: CorrectionType::AttendanceStatus,
            original_value: "present".to_string(),
            corrected_value: "late".to_string(),
            reason: "forgot to badge in".to_string(),
            status,
            decided_by: None,
            decided_at: None,
            decision_comments: None,
            requested_at: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_is_pending() {
        assert!(correction(CorrectionStatus::Pending).is_pending());
        assert!(!correction(CorrectionStatus::Approved).is_pending());
        assert!(!correction(CorrectionStatus::Rejected).is_pending());
    }

    #[test]
    fn test_outcome_fully_applied() {
        let outcome = ApprovalOutcome {
            correction: correction(CorrectionStatus::Approved),
            applied_field: Some("status".to_string()),
            skipped_field: None,
        };
        assert!(outcome.fully_applied());

        let partial = ApprovalOutcome {
            correction: correction(CorrectionStatus::Approved),
            applied_field: None,
            skipped_field: Some("check_in".to_string()),
        };
        assert!(!partial.fully_applied());
    }

    #[test]
    fn test_correction_type_display() {
        assert_eq!(CorrectionType::CheckInTime.to_string(), "check_in_time");
        assert_eq!(CorrectionType::Other.to_string(), "other");
    }

    #[test]
    fn test_correction_round_trips_through_json() {
        let correction = correction(CorrectionStatus::Pending);
        let json = serde_json::to_string(&correction).unwrap();
        let back: AttendanceCorrection = serde_json::from_str(&json).unwrap();
        assert_eq!(correction, back);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CorrectionStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&CorrectionType::CheckOutTime).unwrap(),
            "\"check_out_time\""
        );
    }
}
