//! Error types for the attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while tracking attendance.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the attendance engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application. Every
/// variant maps onto a coarse [`ErrorCategory`] via
/// [`EngineError::category`] so transport layers can translate failures
/// uniformly.
///
/// # Example
///
/// ```
/// use attendance_engine::error::{EngineError, ErrorCategory};
///
/// let error = EngineError::EmployeeNotFound {
///     employee_id: "emp_042".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_042");
/// assert_eq!(error.category(), ErrorCategory::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The employee directory has no entry for the given id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee id that was not found.
        employee_id: String,
    },

    /// No attendance record exists for the given employee and date.
    #[error("No attendance record for employee '{employee_id}' on {date}")]
    RecordNotFound {
        /// The employee the record was requested for.
        employee_id: String,
        /// The branch-local calendar day.
        date: NaiveDate,
    },

    /// No attendance record exists with the given record id.
    #[error("Attendance record not found: {attendance_id}")]
    AttendanceNotFound {
        /// The record id that was not found.
        attendance_id: Uuid,
    },

    /// No correction exists with the given id.
    #[error("Correction not found: {correction_id}")]
    CorrectionNotFound {
        /// The correction id that was not found.
        correction_id: Uuid,
    },

    /// The employee already checked in today; a second check-in is rejected.
    #[error("Employee '{employee_id}' already checked in on {date}")]
    AlreadyCheckedIn {
        /// The employee attempting the duplicate check-in.
        employee_id: String,
        /// The branch-local calendar day.
        date: NaiveDate,
    },

    /// The operation requires a prior check-in that has not happened.
    #[error("Employee '{employee_id}' has not checked in on {date}")]
    NotCheckedIn {
        /// The employee the operation targeted.
        employee_id: String,
        /// The branch-local calendar day.
        date: NaiveDate,
    },

    /// The record is already closed; a second check-out is rejected.
    #[error("Employee '{employee_id}' already checked out on {date}")]
    AlreadyCheckedOut {
        /// The employee attempting the duplicate check-out.
        employee_id: String,
        /// The branch-local calendar day.
        date: NaiveDate,
    },

    /// A manual entry would create a second record for the same day.
    #[error("Attendance record already exists for employee '{employee_id}' on {date}")]
    DuplicateRecord {
        /// The employee the entry targeted.
        employee_id: String,
        /// The branch-local calendar day.
        date: NaiveDate,
    },

    /// A break is already open; open breaks are never replaced or queued.
    #[error("Employee '{employee_id}' already has an active break")]
    BreakAlreadyActive {
        /// The employee attempting to start a second break.
        employee_id: String,
    },

    /// There is no open break to end.
    #[error("Employee '{employee_id}' has no active break")]
    NoActiveBreak {
        /// The employee the operation targeted.
        employee_id: String,
    },

    /// The correction has already reached a terminal state.
    #[error("Correction {correction_id} is not pending (status: {status})")]
    CorrectionNotPending {
        /// The correction id.
        correction_id: Uuid,
        /// The terminal status the correction is in.
        status: String,
    },

    /// An input field was malformed or out of range.
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A manual entry spans more hours than one shift may contain.
    #[error(
        "Shift bound exceeded for employee '{employee_id}': {hours} hours exceeds the {limit} hour limit"
    )]
    ShiftBoundExceeded {
        /// The employee the entry targeted.
        employee_id: String,
        /// The number of hours the entry spanned.
        hours: i64,
        /// The maximum hours a single entry may span.
        limit: i64,
    },

    /// Settings file was not found at the specified path.
    #[error("Settings file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Settings file could not be parsed.
    #[error("Failed to parse settings file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The caller cancelled the operation before it committed.
    #[error("Operation cancelled: {operation}")]
    Cancelled {
        /// The name of the cancelled operation.
        operation: String,
    },
}

/// Coarse classification of engine errors.
///
/// Mirrors the taxonomy exposed to wrapping layers: validation failures,
/// missing entities, state conflicts, policy violations, configuration
/// problems, and caller-initiated cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input, e.g. hours outside the [0, 24] range.
    Validation,
    /// A referenced employee, record, or correction does not exist.
    NotFound,
    /// The operation conflicts with the current state of the record.
    Conflict,
    /// A working-hour policy bound was exceeded.
    PolicyViolation,
    /// Settings could not be loaded.
    Config,
    /// The operation was cancelled before committing.
    Cancelled,
}

impl EngineError {
    /// Returns the coarse category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmployeeNotFound { .. }
            | Self::RecordNotFound { .. }
            | Self::AttendanceNotFound { .. }
            | Self::CorrectionNotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyCheckedIn { .. }
            | Self::NotCheckedIn { .. }
            | Self::AlreadyCheckedOut { .. }
            | Self::DuplicateRecord { .. }
            | Self::BreakAlreadyActive { .. }
            | Self::NoActiveBreak { .. }
            | Self::CorrectionNotPending { .. } => ErrorCategory::Conflict,
            Self::InvalidInput { .. } => ErrorCategory::Validation,
            Self::ShiftBoundExceeded { .. } => ErrorCategory::PolicyViolation,
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } => ErrorCategory::Config,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_employee_not_found_displays_id() {
        let error = EngineError::EmployeeNotFound {
            employee_id: "emp_042".to_string(),
        };
        assert_eq!(error.to_string(), "Employee not found: emp_042");
    }

    #[test]
    fn test_already_checked_in_displays_employee_and_date() {
        let error = EngineError::AlreadyCheckedIn {
            employee_id: "emp_001".to_string(),
            date: date("2026-03-02"),
        };
        assert_eq!(
            error.to_string(),
            "Employee 'emp_001' already checked in on 2026-03-02"
        );
    }

    #[test]
    fn test_correction_not_pending_displays_status() {
        let id = Uuid::nil();
        let error = EngineError::CorrectionNotPending {
            correction_id: id,
            status: "approved".to_string(),
        };
        assert_eq!(
            error.to_string(),
            format!("Correction {id} is not pending (status: approved)")
        );
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::InvalidInput {
            field: "check_out".to_string(),
            message: "before check-in".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid value for 'check_out': before check-in");
    }

    #[test]
    fn test_not_found_category() {
        let errors = [
            EngineError::EmployeeNotFound {
                employee_id: "e".into(),
            },
            EngineError::RecordNotFound {
                employee_id: "e".into(),
                date: date("2026-03-02"),
            },
            EngineError::AttendanceNotFound {
                attendance_id: Uuid::nil(),
            },
            EngineError::CorrectionNotFound {
                correction_id: Uuid::nil(),
            },
        ];
        for error in errors {
            assert_eq!(error.category(), ErrorCategory::NotFound);
        }
    }

    #[test]
    fn test_conflict_category() {
        let errors = [
            EngineError::AlreadyCheckedIn {
                employee_id: "e".into(),
                date: date("2026-03-02"),
            },
            EngineError::BreakAlreadyActive {
                employee_id: "e".into(),
            },
            EngineError::NoActiveBreak {
                employee_id: "e".into(),
            },
            EngineError::CorrectionNotPending {
                correction_id: Uuid::nil(),
                status: "rejected".into(),
            },
        ];
        for error in errors {
            assert_eq!(error.category(), ErrorCategory::Conflict);
        }
    }

    #[test]
    fn test_policy_violation_category() {
        let error = EngineError::ShiftBoundExceeded {
            employee_id: "e".into(),
            hours: 30,
            limit: 24,
        };
        assert_eq!(error.category(), ErrorCategory::PolicyViolation);
    }

    #[test]
    fn test_cancelled_category() {
        let error = EngineError::Cancelled {
            operation: "check_in".into(),
        };
        assert_eq!(error.category(), ErrorCategory::Cancelled);
        assert_eq!(error.to_string(), "Operation cancelled: check_in");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::EmployeeNotFound {
                employee_id: "missing".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
