//! The static break-type policy table.
//!
//! Every break type maps to a duration limit and a paid flag. The
//! mapping is an exhaustive match so that adding a break type without
//! deciding its policy fails to compile instead of silently falling
//! through to a default.

use serde::{Deserialize, Serialize};

use crate::models::BreakType;

/// Fallback limit, in minutes, for break types outside the known table.
pub const DEFAULT_BREAK_LIMIT_MINUTES: i64 = 15;

/// The (duration limit, paid flag) contract associated with a break type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPolicy {
    /// Maximum allowed minutes. `None` means unlimited.
    pub max_minutes: Option<i64>,
    /// Whether the break counts as paid time.
    pub is_paid: bool,
}

impl BreakPolicy {
    /// Looks up the policy for a break type.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::BreakType;
    /// use attendance_engine::policy::BreakPolicy;
    ///
    /// let lunch = BreakPolicy::for_type(BreakType::Lunch);
    /// assert_eq!(lunch.max_minutes, Some(60));
    /// assert!(!lunch.is_paid);
    ///
    /// let meeting = BreakPolicy::for_type(BreakType::Meeting);
    /// assert_eq!(meeting.max_minutes, None); // unlimited
    /// ```
    pub fn for_type(break_type: BreakType) -> Self {
        match break_type {
            BreakType::Tea => Self {
                max_minutes: Some(15),
                is_paid: true,
            },
            BreakType::Lunch => Self {
                max_minutes: Some(60),
                is_paid: false,
            },
            BreakType::Personal => Self {
                max_minutes: Some(10),
                is_paid: true,
            },
            BreakType::Meeting => Self {
                max_minutes: None,
                is_paid: true,
            },
            BreakType::Prayer => Self {
                max_minutes: Some(15),
                is_paid: true,
            },
            BreakType::Medical => Self {
                max_minutes: Some(30),
                is_paid: true,
            },
            BreakType::Emergency => Self {
                max_minutes: None,
                is_paid: true,
            },
            BreakType::Other => Self {
                max_minutes: Some(DEFAULT_BREAK_LIMIT_MINUTES),
                is_paid: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tea_policy() {
        let policy = BreakPolicy::for_type(BreakType::Tea);
        assert_eq!(policy.max_minutes, Some(15));
        assert!(policy.is_paid);
    }

    #[test]
    fn test_lunch_is_the_only_unpaid_type() {
        for break_type in [
            BreakType::Tea,
            BreakType::Lunch,
            BreakType::Personal,
            BreakType::Meeting,
            BreakType::Prayer,
            BreakType::Medical,
            BreakType::Emergency,
            BreakType::Other,
        ] {
            let policy = BreakPolicy::for_type(break_type);
            assert_eq!(policy.is_paid, break_type != BreakType::Lunch);
        }
    }

    #[test]
    fn test_personal_policy() {
        let policy = BreakPolicy::for_type(BreakType::Personal);
        assert_eq!(policy.max_minutes, Some(10));
    }

    #[test]
    fn test_medical_policy() {
        let policy = BreakPolicy::for_type(BreakType::Medical);
        assert_eq!(policy.max_minutes, Some(30));
    }

    #[test]
    fn test_meeting_and_emergency_are_unlimited() {
        assert_eq!(BreakPolicy::for_type(BreakType::Meeting).max_minutes, None);
        assert_eq!(BreakPolicy::for_type(BreakType::Emergency).max_minutes, None);
    }

    #[test]
    fn test_unrecognized_type_defaults_to_15_paid() {
        let policy = BreakPolicy::for_type(BreakType::Other);
        assert_eq!(policy.max_minutes, Some(DEFAULT_BREAK_LIMIT_MINUTES));
        assert!(policy.is_paid);
    }
}
