//! Branch time-zone conversion.
//!
//! Conversion is pure and infallible by contract: an unresolvable zone
//! id degrades to returning the input unchanged (interpreted as UTC)
//! rather than propagating a failure into the calling operation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Converts a UTC instant to the branch's local wall-clock time.
///
/// # Example
///
/// ```
/// use attendance_engine::time::to_local;
/// use chrono::{TimeZone, Utc};
///
/// let utc = Utc.with_ymd_and_hms(2026, 3, 2, 3, 30, 0).unwrap();
/// let local = to_local(utc, "Asia/Dhaka"); // UTC+6
/// assert_eq!(local.to_string(), "2026-03-02 09:30:00");
///
/// // Unresolvable zones pass the input through.
/// assert_eq!(to_local(utc, "Not/AZone"), utc.naive_utc());
/// ```
pub fn to_local(utc: DateTime<Utc>, tz_id: &str) -> NaiveDateTime {
    match tz_id.parse::<Tz>() {
        Ok(tz) => utc.with_timezone(&tz).naive_local(),
        Err(_) => utc.naive_utc(),
    }
}

/// Converts a branch-local wall-clock time back to a UTC instant.
///
/// Ambiguous local times (the repeated hour of a backward transition)
/// resolve to the earlier instant; local times that fall in a forward
/// gap, like unresolvable zones, pass through as UTC.
pub fn to_utc(local: NaiveDateTime, tz_id: &str) -> DateTime<Utc> {
    match tz_id.parse::<Tz>() {
        Ok(tz) => match tz.from_local_datetime(&local).earliest() {
            Some(zoned) => zoned.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&local),
        },
        Err(_) => Utc.from_utc_datetime(&local),
    }
}

/// Returns the branch-local calendar day containing the given instant.
pub fn local_date(utc: DateTime<Utc>, tz_id: &str) -> NaiveDate {
    to_local(utc, tz_id).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_to_local_positive_offset() {
        let local = to_local(utc("2026-03-02T03:30:00Z"), "Asia/Dhaka");
        assert_eq!(local.to_string(), "2026-03-02 09:30:00");
    }

    #[test]
    fn test_to_local_crosses_date_boundary() {
        // 23:00 UTC is already the next day in Dhaka.
        let local = to_local(utc("2026-03-02T23:00:00Z"), "Asia/Dhaka");
        assert_eq!(local.date().to_string(), "2026-03-03");
        assert_eq!(local.hour(), 5);
    }

    #[test]
    fn test_to_local_unresolvable_zone_passes_through() {
        let instant = utc("2026-03-02T03:30:00Z");
        assert_eq!(to_local(instant, "Not/AZone"), instant.naive_utc());
        assert_eq!(to_local(instant, ""), instant.naive_utc());
    }

    #[test]
    fn test_to_utc_round_trip() {
        let instant = utc("2026-03-02T03:30:00Z");
        let local = to_local(instant, "Europe/London");
        assert_eq!(to_utc(local, "Europe/London"), instant);
    }

    #[test]
    fn test_to_utc_unresolvable_zone_passes_through() {
        let local = to_local(utc("2026-03-02T03:30:00Z"), "UTC");
        let converted = to_utc(local, "Not/AZone");
        assert_eq!(converted.naive_utc(), local);
    }

    #[test]
    fn test_to_utc_spring_forward_gap_passes_through() {
        // 2026-03-08 02:30 does not exist in New York; the conversion
        // must still return an instant instead of failing.
        let missing = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let converted = to_utc(missing, "America/New_York");
        assert_eq!(converted.naive_utc(), missing);
    }

    #[test]
    fn test_local_date_differs_from_utc_date() {
        let instant = utc("2026-03-02T23:00:00Z");
        assert_eq!(local_date(instant, "Asia/Dhaka").to_string(), "2026-03-03");
        assert_eq!(local_date(instant, "UTC").to_string(), "2026-03-02");
    }
}
