//! The in-memory record store.
//!
//! Each (employee, date) pair is an independent unit of work: the store
//! hands out one mutex per key so operations on distinct employee-days
//! run in parallel while operations on the same day are serialized
//! against a single logical writer. Mutations are staged on a clone and
//! committed as one map insert, so readers never observe a
//! half-mutated record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use crate::models::{AttendanceCorrection, AttendanceRecord, RecordKey};

/// Owns every attendance record and correction the engine has produced.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<HashMap<RecordKey, AttendanceRecord>>,
    corrections: RwLock<HashMap<Uuid, AttendanceCorrection>>,
    key_locks: Mutex<HashMap<RecordKey, Arc<Mutex<()>>>>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the writer lock for one employee-day.
    ///
    /// Callers hold the returned mutex for the whole read-modify-write.
    pub fn key_lock(&self, key: &RecordKey) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(key.clone()).or_default().clone()
    }

    /// Returns a snapshot of the record for one employee-day.
    pub fn get(&self, key: &RecordKey) -> Option<AttendanceRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(key).cloned()
    }

    /// Returns a snapshot of the record with the given id.
    pub fn get_by_id(&self, attendance_id: Uuid) -> Option<AttendanceRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.values().find(|r| r.id == attendance_id).cloned()
    }

    /// Commits a staged record, replacing any previous version for its key.
    pub fn commit(&self, record: AttendanceRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.key(), record);
    }

    /// Returns the number of records held.
    pub fn record_count(&self) -> usize {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.len()
    }

    /// Returns a snapshot of the correction with the given id.
    pub fn get_correction(&self, correction_id: Uuid) -> Option<AttendanceCorrection> {
        let corrections = self.corrections.read().unwrap_or_else(|e| e.into_inner());
        corrections.get(&correction_id).cloned()
    }

    /// Commits a staged correction, replacing any previous version.
    pub fn commit_correction(&self, correction: AttendanceCorrection) {
        let mut corrections = self.corrections.write().unwrap_or_else(|e| e.into_inner());
        corrections.insert(correction.id, correction);
    }

    /// Returns pending corrections in request order, optionally scoped
    /// to one branch.
    pub fn pending_corrections(&self, branch_id: Option<&str>) -> Vec<AttendanceCorrection> {
        let corrections = self.corrections.read().unwrap_or_else(|e| e.into_inner());
        let mut pending: Vec<_> = corrections
            .values()
            .filter(|c| c.is_pending())
            .filter(|c| branch_id.is_none_or(|b| c.branch_id == b))
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::models::{CorrectionStatus, CorrectionType};

    fn record(employee_id: &str, day: u32) -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        AttendanceRecord::new(
            employee_id,
            "dhaka_hq",
            date,
            date.and_hms_opt(9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, day, 3, 0, 0).unwrap(),
        )
    }

    fn correction(branch_id: &str, minute: u32) -> AttendanceCorrection {
        AttendanceCorrection {
            id: Uuid::new_v4(),
            attendance_id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            branch_id: branch_id.to_string(),
            attendance_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            requested_by: "emp_001".to_string(),
            correction_type: CorrectionType::AttendanceStatus,
            original_value: "present".to_string(),
            corrected_value: "late".to_string(),
            reason: "test".to_string(),
            status: CorrectionStatus::Pending,
            decided_by: None,
            decided_at: None,
            decision_comments: None,
            requested_at: Utc.with_ymd_and_hms(2026, 3, 2, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_commit_replaces_record_for_same_key() {
        let store = RecordStore::new();
        let first = record("emp_001", 2);
        let key = first.key();
        store.commit(first);

        let mut second = store.get(&key).unwrap();
        second.append_note("edited");
        store.commit(second);

        assert_eq!(store.record_count(), 1);
        assert_eq!(store.get(&key).unwrap().notes.as_deref(), Some("edited"));
    }

    #[test]
    fn test_distinct_days_are_distinct_records() {
        let store = RecordStore::new();
        store.commit(record("emp_001", 2));
        store.commit(record("emp_001", 3));
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn test_get_by_id_finds_record() {
        let store = RecordStore::new();
        let r = record("emp_001", 2);
        let id = r.id;
        store.commit(r);

        assert_eq!(store.get_by_id(id).unwrap().employee_id, "emp_001");
        assert!(store.get_by_id(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_key_lock_is_shared_per_key() {
        let store = RecordStore::new();
        let key = RecordKey::new("emp_001", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        let a = store.key_lock(&key);
        let b = store.key_lock(&key);
        assert!(Arc::ptr_eq(&a, &b));

        let other = RecordKey::new("emp_002", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert!(!Arc::ptr_eq(&a, &store.key_lock(&other)));
    }

    #[test]
    fn test_pending_corrections_are_ordered_and_scoped() {
        let store = RecordStore::new();
        let late = correction("dhaka_hq", 30);
        let early = correction("dhaka_hq", 10);
        let other_branch = correction("london", 20);
        let mut decided = correction("dhaka_hq", 5);
        decided.status = CorrectionStatus::Approved;

        store.commit_correction(late.clone());
        store.commit_correction(early.clone());
        store.commit_correction(other_branch.clone());
        store.commit_correction(decided);

        let all = store.pending_corrections(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, early.id);
        assert_eq!(all[2].id, late.id);

        let scoped = store.pending_corrections(Some("dhaka_hq"));
        assert_eq!(scoped.len(), 2);
        assert!(scoped.iter().all(|c| c.branch_id == "dhaka_hq"));
    }
}
