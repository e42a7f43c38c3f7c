//! The shift resolver seam.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::models::ShiftWindow;

/// Supplies an employee's expected working window for a date.
///
/// `None` means no assignment exists and the branch default window
/// (09:00–18:00 unless configured otherwise) applies.
pub trait ShiftResolver: Send + Sync {
    /// Returns the shift window assigned to the employee for the date.
    fn current_shift(&self, employee_id: &str, date: NaiveDate) -> Option<ShiftWindow>;
}

/// A resolver with no assignments; every employee gets the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShiftResolver;

impl ShiftResolver for NoShiftResolver {
    fn current_shift(&self, _employee_id: &str, _date: NaiveDate) -> Option<ShiftWindow> {
        None
    }
}

/// A resolver backed by a per-employee map, for tests and embedding.
///
/// An assigned window applies to every date; date-specific rostering
/// belongs to the real scheduling system behind this seam.
#[derive(Debug, Default)]
pub struct FixedShiftResolver {
    assignments: RwLock<HashMap<String, ShiftWindow>>,
}

impl FixedShiftResolver {
    /// Creates a resolver with no assignments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a window to an employee.
    pub fn assign(&self, employee_id: impl Into<String>, window: ShiftWindow) {
        let mut assignments = self.assignments.write().unwrap_or_else(|e| e.into_inner());
        assignments.insert(employee_id.into(), window);
    }
}

impl ShiftResolver for FixedShiftResolver {
    fn current_shift(&self, employee_id: &str, _date: NaiveDate) -> Option<ShiftWindow> {
        let assignments = self.assignments.read().unwrap_or_else(|e| e.into_inner());
        assignments.get(employee_id).cloned()
    }
}
