//! Time handling for the attendance engine.
//!
//! This module provides the injected clock capability, branch time-zone
//! conversion, and the duration arithmetic shared by the derivation
//! logic. All durations are wall-clock deltas on the branch's local
//! calendar day; conversion happens once per timestamp at write time and
//! both the UTC and local forms are persisted.

mod clock;
mod convert;

pub use clock::{Clock, FixedClock, SystemClock};
pub use convert::{local_date, to_local, to_utc};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Converts a minute count to an exact decimal hour value.
///
/// # Example
///
/// ```
/// use attendance_engine::time::minutes_to_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(minutes_to_hours(570), Decimal::new(95, 1)); // 9.5
/// ```
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::new(minutes, 0) / Decimal::new(60, 0)
}

/// Returns the whole minutes elapsed from `start` to `end`.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes()
}
