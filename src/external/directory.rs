//! The employee directory seam.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::models::EmployeeProfile;

/// Supplies employee profiles to engine operations.
///
/// Every operation starts by resolving the employee; an unknown id
/// surfaces as [`EngineError::EmployeeNotFound`].
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by id.
    fn get_by_id(&self, employee_id: &str) -> EngineResult<EmployeeProfile>;
}

/// A directory backed by an in-process map, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<HashMap<String, EmployeeProfile>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    pub fn insert(&self, profile: EmployeeProfile) {
        let mut employees = self.employees.write().unwrap_or_else(|e| e.into_inner());
        employees.insert(profile.id.clone(), profile);
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn get_by_id(&self, employee_id: &str) -> EngineResult<EmployeeProfile> {
        let employees = self.employees.read().unwrap_or_else(|e| e.into_inner());
        employees
            .get(employee_id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }
}
