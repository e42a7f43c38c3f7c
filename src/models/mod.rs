//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod break_record;
mod correction;
mod employee;

pub use attendance::{
    AttendanceRecord, AttendanceStatus, CheckEvent, RecordKey, WeatherSnapshot,
};
pub use break_record::{BreakApprovalStatus, BreakRecord, BreakType};
pub use correction::{
    ApprovalOutcome, AttendanceCorrection, CorrectionStatus, CorrectionType,
};
pub use employee::{EmployeeProfile, ShiftWindow};
