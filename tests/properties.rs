//! Property tests for the derivation arithmetic.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use attendance_engine::models::{AttendanceRecord, BreakApprovalStatus, BreakType, CheckEvent};
use attendance_engine::policy::BreakPolicy;
use attendance_engine::time::{minutes_between, minutes_to_hours};

fn break_type() -> impl Strategy<Value = BreakType> {
    prop_oneof![
        Just(BreakType::Tea),
        Just(BreakType::Lunch),
        Just(BreakType::Personal),
        Just(BreakType::Meeting),
        Just(BreakType::Prayer),
        Just(BreakType::Medical),
        Just(BreakType::Emergency),
        Just(BreakType::Other),
    ]
}

fn event(offset_minutes: i64) -> CheckEvent {
    let at = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap() + Duration::minutes(offset_minutes);
    CheckEvent {
        at_utc: at,
        at_local: at.naive_utc(),
        location: None,
        ip_address: None,
        device: None,
    }
}

proptest! {
    /// A closed break's duration is exactly the elapsed whole minutes.
    #[test]
    fn break_duration_is_elapsed_minutes(
        kind in break_type(),
        start_offset in 0i64..720,
        minutes in 0i64..480,
    ) {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
            + Duration::minutes(start_offset);
        let end = start + Duration::minutes(minutes);

        let mut record = attendance_engine::models::BreakRecord::open(
            kind,
            BreakPolicy::for_type(kind),
            start,
            start.naive_utc(),
            None,
            None,
        );
        record.close(end, end.naive_utc());

        prop_assert_eq!(record.duration_minutes, Some(minutes));
    }

    /// Overage is the duration past the limit, clamped at zero, and a
    /// break only needs approval when it actually ran over.
    #[test]
    fn overage_is_clamped_excess_over_limit(
        kind in break_type(),
        minutes in 0i64..480,
    ) {
        let policy = BreakPolicy::for_type(kind);
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap();
        let end = start + Duration::minutes(minutes);

        let mut record = attendance_engine::models::BreakRecord::open(
            kind,
            policy,
            start,
            start.naive_utc(),
            None,
            None,
        );
        record.close(end, end.naive_utc());

        let expected = policy
            .max_minutes
            .map(|max| (minutes - max).max(0))
            .unwrap_or(0);
        prop_assert_eq!(record.exceeded_minutes, expected);
        prop_assert_eq!(record.is_exceeding, expected > 0);
        let expected_status = if expected > 0 {
            BreakApprovalStatus::Pending
        } else {
            BreakApprovalStatus::NotRequired
        };
        prop_assert_eq!(record.approval_status, expected_status);
    }

    /// Working hours never go up when breaks are added, and overtime is
    /// never negative nor larger than the time past normal hours.
    #[test]
    fn totals_respect_breaks_and_clamp_overtime(
        elapsed in 1i64..1440,
        break_minutes in 0i64..480,
        normal_hours in 0i64..=24,
    ) {
        prop_assume!(break_minutes <= elapsed);

        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut record = AttendanceRecord::new(
            "emp_prop",
            "hq",
            date,
            date.and_hms_opt(9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
        );
        record.check_in = Some(event(0));
        record.check_out = Some(event(elapsed));
        if break_minutes > 0 {
            let mut lunch = attendance_engine::models::BreakRecord::open(
                BreakType::Lunch,
                BreakPolicy::for_type(BreakType::Lunch),
                record.check_in.as_ref().unwrap().at_utc,
                record.check_in.as_ref().unwrap().at_local,
                None,
                None,
            );
            let end = record.check_in.as_ref().unwrap().at_utc + Duration::minutes(break_minutes);
            lunch.close(end, end.naive_utc());
            record.breaks.push(lunch);
        }

        let normal = Decimal::new(normal_hours, 0);
        record.recompute_totals(normal);

        let working = record.total_working_hours.unwrap();
        let overtime = record.overtime_hours.unwrap();

        prop_assert_eq!(working, minutes_to_hours(elapsed - break_minutes));
        prop_assert!(overtime >= Decimal::ZERO);
        prop_assert_eq!(overtime, (working - normal).max(Decimal::ZERO));
    }

    /// Quarter-hour counts convert without any rounding: scaling back
    /// by 60 returns the original minute count.
    #[test]
    fn quarter_hours_convert_exactly(quarters in 0i64..10_000) {
        let minutes = quarters * 15;
        let hours = minutes_to_hours(minutes);
        prop_assert_eq!(hours * Decimal::new(60, 0), Decimal::new(minutes, 0));
    }

    /// Whole-minute deltas ignore sub-minute remainders.
    #[test]
    fn minutes_between_truncates(seconds in 0i64..86_400) {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let end = start + Duration::seconds(seconds);
        prop_assert_eq!(minutes_between(start, end), seconds / 60);
    }
}
