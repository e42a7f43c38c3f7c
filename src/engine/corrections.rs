//! The correction approval workflow.
//!
//! Corrections move `Pending → {Approved, Rejected}` and both terminal
//! states are immutable. An approved correction is applied to its
//! target record exactly once, at approval time, under the same per-key
//! writer lock as the live clock operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::engine::AttendanceEngine;
use crate::engine::attendance::validate_entry_span;
use crate::error::{EngineError, EngineResult};
use crate::external::AuditAction;
use crate::models::{
    ApprovalOutcome, AttendanceCorrection, AttendanceRecord, AttendanceStatus, CheckEvent,
    CorrectionStatus, CorrectionType,
};
use crate::time::to_local;

/// Input for requesting a correction against an attendance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// The attendance record being disputed.
    pub attendance_id: Uuid,
    /// Who is asking for the correction.
    pub requested_by: String,
    /// Which field is disputed.
    pub correction_type: CorrectionType,
    /// The value currently on the record, as an opaque string.
    pub original_value: String,
    /// The claimed correct value, as an opaque string.
    pub corrected_value: String,
    /// Why the correction is needed.
    pub reason: String,
}

impl AttendanceEngine {
    /// Files a new pending correction against an existing record.
    ///
    /// Fails with [`EngineError::AttendanceNotFound`] when the target
    /// record does not exist.
    pub fn request_correction(
        &self,
        request: CorrectionRequest,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceCorrection> {
        self.ensure_live(cancel, "request_correction")?;

        let record = self
            .store()
            .get_by_id(request.attendance_id)
            .ok_or(EngineError::AttendanceNotFound {
                attendance_id: request.attendance_id,
            })?;

        let correction = AttendanceCorrection {
            id: Uuid::new_v4(),
            attendance_id: record.id,
            employee_id: record.employee_id.clone(),
            branch_id: record.branch_id.clone(),
            attendance_date: record.date,
            requested_by: request.requested_by.clone(),
            correction_type: request.correction_type,
            original_value: request.original_value,
            corrected_value: request.corrected_value,
            reason: request.reason,
            status: CorrectionStatus::Pending,
            decided_by: None,
            decided_at: None,
            decision_comments: None,
            requested_at: self.clock_now(),
        };

        self.ensure_live(cancel, "request_correction")?;
        self.store().commit_correction(correction.clone());
        tracing::info!(
            correction = %correction.id,
            attendance = %correction.attendance_id,
            kind = %correction.correction_type,
            "correction requested"
        );
        self.audit_change(
            &request.requested_by,
            "attendance_correction",
            correction.id.to_string(),
            AuditAction::Create,
            None::<&AttendanceCorrection>,
            &correction,
        );
        Ok(correction)
    }

    /// Approves a pending correction and applies its value to the
    /// target record.
    ///
    /// Fails with [`EngineError::CorrectionNotPending`] once the
    /// correction has left `Pending`. The corrected value is parsed per
    /// the correction type: an RFC 3339 timestamp for the clock-time
    /// types, a status name for `AttendanceStatus`. A value that fails
    /// to parse, would leave the record's timestamps in an invalid
    /// shape (a check-out without a check-in, a reversed pair, a span
    /// past the shift bound), or belongs to a type with no structured
    /// apply still marks the correction approved, but the target field
    /// is left unchanged and named in the outcome's `skipped_field` —
    /// an explicit partial success, never a silent no-op.
    pub fn approve_correction(
        &self,
        correction_id: Uuid,
        approved_by: &str,
        comments: Option<String>,
        cancel: &CancelToken,
    ) -> EngineResult<ApprovalOutcome> {
        self.ensure_live(cancel, "approve_correction")?;

        let correction = self.fetch_pending(correction_id)?;
        let employee = self.resolve_employee(&correction.employee_id)?;

        let key = correction_key(&correction);
        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        // Re-read both sides under the writer lock; a concurrent
        // approval may have won the race.
        let mut correction = self.fetch_pending(correction_id)?;
        let mut record = self.store().get_by_id(correction.attendance_id).ok_or(
            EngineError::AttendanceNotFound {
                attendance_id: correction.attendance_id,
            },
        )?;
        let record_before = record.clone();

        let (applied_field, skipped_field) =
            apply_correction(&mut record, &correction, &employee.timezone);
        if applied_field.is_some() {
            record.recompute_totals(employee.normal_working_hours);
            record.updated_at = self.clock_now();
        }

        let now = self.clock_now();
        correction.status = CorrectionStatus::Approved;
        correction.decided_by = Some(approved_by.to_string());
        correction.decided_at = Some(now);
        correction.decision_comments = comments;

        self.ensure_live(cancel, "approve_correction")?;
        if applied_field.is_some() {
            self.store().commit(record.clone());
            self.audit_change(
                approved_by,
                "attendance_record",
                record.id.to_string(),
                AuditAction::Update,
                Some(&record_before),
                &record,
            );
        }
        self.store().commit_correction(correction.clone());
        match &skipped_field {
            Some(field) => tracing::warn!(
                correction = %correction.id,
                field = %field,
                value = %correction.corrected_value,
                "correction approved but value not applied"
            ),
            None => tracing::info!(
                correction = %correction.id,
                attendance = %correction.attendance_id,
                "correction approved and applied"
            ),
        }
        self.audit_change(
            approved_by,
            "attendance_correction",
            correction.id.to_string(),
            AuditAction::Update,
            None::<&AttendanceCorrection>,
            &correction,
        );

        Ok(ApprovalOutcome {
            correction,
            applied_field,
            skipped_field,
        })
    }

    /// Rejects a pending correction. The target record is not touched.
    ///
    /// Fails with [`EngineError::CorrectionNotPending`] once the
    /// correction has left `Pending`.
    pub fn reject_correction(
        &self,
        correction_id: Uuid,
        rejected_by: &str,
        reason: String,
        cancel: &CancelToken,
    ) -> EngineResult<AttendanceCorrection> {
        self.ensure_live(cancel, "reject_correction")?;

        let correction = self.fetch_pending(correction_id)?;
        let key = correction_key(&correction);
        let key_lock = self.store().key_lock(&key);
        let _writer = key_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut correction = self.fetch_pending(correction_id)?;
        correction.status = CorrectionStatus::Rejected;
        correction.decided_by = Some(rejected_by.to_string());
        correction.decided_at = Some(self.clock_now());
        correction.decision_comments = Some(reason);

        self.ensure_live(cancel, "reject_correction")?;
        self.store().commit_correction(correction.clone());
        tracing::info!(correction = %correction.id, "correction rejected");
        self.audit_change(
            rejected_by,
            "attendance_correction",
            correction.id.to_string(),
            AuditAction::Update,
            None::<&AttendanceCorrection>,
            &correction,
        );
        Ok(correction)
    }

    /// Returns the pending corrections in request order, optionally
    /// scoped to one branch.
    ///
    /// The sequence is a snapshot taken at call time; calling again
    /// restarts it over the then-current state.
    pub fn pending_corrections(
        &self,
        branch_id: Option<&str>,
    ) -> impl Iterator<Item = AttendanceCorrection> + use<> {
        self.store().pending_corrections(branch_id).into_iter()
    }

    fn fetch_pending(&self, correction_id: Uuid) -> EngineResult<AttendanceCorrection> {
        let correction = self.store().get_correction(correction_id).ok_or(
            EngineError::CorrectionNotFound { correction_id },
        )?;
        if !correction.is_pending() {
            return Err(EngineError::CorrectionNotPending {
                correction_id,
                status: correction.status.to_string(),
            });
        }
        Ok(correction)
    }
}

fn correction_key(correction: &AttendanceCorrection) -> crate::models::RecordKey {
    crate::models::RecordKey::new(correction.employee_id.clone(), correction.attendance_date)
}

/// Applies the corrected value to the record, returning which field was
/// applied or skipped. Parsing failures skip; they never reject.
///
/// Timestamp corrections are held to the same span rules as manual
/// entries: a check-out requires a check-in, the pair must not be
/// reversed, and the span must stay within one shift bound. A corrected
/// value that would violate them is skipped, keeping the record's
/// derived totals inside their valid range.
fn apply_correction(
    record: &mut AttendanceRecord,
    correction: &AttendanceCorrection,
    timezone: &str,
) -> (Option<String>, Option<String>) {
    match correction.correction_type {
        CorrectionType::CheckInTime => match parse_timestamp(&correction.corrected_value) {
            Some(at) => {
                let check_out = record.check_out.as_ref().map(|e| e.at_utc);
                if validate_entry_span(&record.employee_id, Some(at), check_out).is_err() {
                    return (None, Some("check_in".to_string()));
                }
                record.check_in = Some(corrected_event(record.check_in.take(), at, timezone));
                let at_local = to_local(at, timezone);
                record.late_arrival_minutes = (at_local - record.expected_check_in)
                    .num_minutes()
                    .max(0);
                // A moved arrival flips between on time and late; other
                // statuses carry information the arrival does not decide.
                if matches!(
                    record.status,
                    AttendanceStatus::Present | AttendanceStatus::Late
                ) {
                    record.status = if at_local > record.expected_check_in {
                        AttendanceStatus::Late
                    } else {
                        AttendanceStatus::Present
                    };
                }
                (Some("check_in".to_string()), None)
            }
            None => (None, Some("check_in".to_string())),
        },
        CorrectionType::CheckOutTime => match parse_timestamp(&correction.corrected_value) {
            Some(at) => {
                let check_in = record.check_in.as_ref().map(|e| e.at_utc);
                if validate_entry_span(&record.employee_id, check_in, Some(at)).is_err() {
                    return (None, Some("check_out".to_string()));
                }
                record.check_out = Some(corrected_event(record.check_out.take(), at, timezone));
                (Some("check_out".to_string()), None)
            }
            None => (None, Some("check_out".to_string())),
        },
        CorrectionType::AttendanceStatus => {
            match correction.corrected_value.parse::<AttendanceStatus>() {
                Ok(status) => {
                    record.status = status;
                    (Some("status".to_string()), None)
                }
                Err(_) => (None, Some("status".to_string())),
            }
        }
        CorrectionType::BreakAdjustment => (None, Some("breaks".to_string())),
        CorrectionType::Other => (None, Some(correction.correction_type.to_string())),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Moves a clock event to a corrected instant, keeping the original
/// client metadata when the event already existed.
fn corrected_event(
    previous: Option<CheckEvent>,
    at: DateTime<Utc>,
    timezone: &str,
) -> CheckEvent {
    let (location, ip_address, device) = previous
        .map(|e| (e.location, e.ip_address, e.device))
        .unwrap_or((None, None, None));
    CheckEvent {
        at_utc: at,
        at_local: to_local(at, timezone),
        location,
        ip_address,
        device,
    }
}
