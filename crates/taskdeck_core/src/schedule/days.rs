//! Day-granularity helpers shared by the expander and the classifier.

use crate::model::task::Cadence;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Truncates an instant to 00:00 of its calendar day.
pub fn start_of_day(at: NaiveDateTime) -> NaiveDateTime {
    at.date().and_time(NaiveTime::MIN)
}

pub fn same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Monday 00:00 of the ISO week containing `at`.
pub fn start_of_week(at: NaiveDateTime) -> NaiveDateTime {
    let date = at.date();
    let back = i64::from(date.weekday().num_days_from_monday());
    (date - Duration::days(back)).and_time(NaiveTime::MIN)
}

/// Returns the `index`-th occurrence counted from `anchor`.
///
/// Monthly steps are always taken from the anchor, so a day-of-month that
/// had to be clamped in a short month is restored in later months.
/// Returns `None` when the result leaves chrono's representable range.
pub fn nth_occurrence(anchor: NaiveDateTime, cadence: Cadence, index: u32) -> Option<NaiveDateTime> {
    match cadence {
        Cadence::Daily => anchor.checked_add_signed(Duration::days(i64::from(index))),
        Cadence::Weekly => anchor.checked_add_signed(Duration::weeks(i64::from(index))),
        Cadence::Monthly => anchor.checked_add_months(Months::new(index)),
    }
}

/// Parses a `YYYY-MM-DD` calendar date into its 00:00 instant.
pub fn parse_day(value: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::{nth_occurrence, parse_day, same_day, start_of_day, start_of_week};
    use crate::model::task::Cadence;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn start_of_day_drops_time_of_day() {
        assert_eq!(start_of_day(at(2024, 6, 10, 8)), at(2024, 6, 10, 0));
        assert!(same_day(at(2024, 6, 10, 0), at(2024, 6, 10, 23)));
        assert!(!same_day(at(2024, 6, 10, 23), at(2024, 6, 11, 0)));
    }

    #[test]
    fn start_of_week_is_monday_even_on_sunday() {
        // 2024-06-16 is a Sunday; its ISO week starts on 2024-06-10.
        let monday = parse_day("2024-06-10").unwrap();
        assert_eq!(start_of_week(at(2024, 6, 16, 12)), monday);
        assert_eq!(start_of_week(at(2024, 6, 10, 1)), monday);
    }

    #[test]
    fn monthly_steps_clamp_without_drifting() {
        let anchor = at(2024, 1, 31, 9);
        assert_eq!(nth_occurrence(anchor, Cadence::Monthly, 1), Some(at(2024, 2, 29, 9)));
        assert_eq!(nth_occurrence(anchor, Cadence::Monthly, 2), Some(at(2024, 3, 31, 9)));
        assert_eq!(nth_occurrence(anchor, Cadence::Monthly, 13), Some(at(2025, 2, 28, 9)));
    }

    #[test]
    fn parse_day_rejects_other_shapes() {
        assert!(parse_day("2024-02-30").is_none());
        assert!(parse_day("06/10/2024").is_none());
        assert_eq!(parse_day(" 2024-06-10 "), Some(at(2024, 6, 10, 0)));
    }
}
