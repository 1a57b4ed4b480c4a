//! Recurrence expansion.
//!
//! # Invariants
//! - Output is non-empty and its first element is always the base date.
//! - Output is strictly increasing and never passes the end date.
//! - An absent end date, or one earlier than the base date, yields only the
//!   base occurrence.

use super::days::nth_occurrence;
use crate::model::task::Cadence;
use chrono::NaiveDateTime;

/// Expands a recurring request into its ordered occurrence dates.
///
/// `base` is the first due date, `until` the inclusive last allowed date.
pub fn expand_occurrences(
    base: NaiveDateTime,
    cadence: Cadence,
    until: Option<NaiveDateTime>,
) -> Vec<NaiveDateTime> {
    let Some(end) = until else {
        return vec![base];
    };
    if end < base {
        return vec![base];
    }

    let mut occurrences = Vec::new();
    let mut index: u32 = 0;
    while let Some(next) = nth_occurrence(base, cadence, index) {
        if next > end {
            break;
        }
        occurrences.push(next);
        index = match index.checked_add(1) {
            Some(value) => value,
            None => break,
        };
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::expand_occurrences;
    use crate::model::task::Cadence;
    use chrono::{Datelike, NaiveDate, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn monthly_from_month_end_clamps_in_leap_february() {
        let dates = expand_occurrences(day(2024, 1, 31), Cadence::Monthly, Some(day(2024, 4, 30)));
        assert_eq!(
            dates,
            vec![day(2024, 1, 31), day(2024, 2, 29), day(2024, 3, 31), day(2024, 4, 30)]
        );
    }

    #[test]
    fn same_start_and_end_yields_single_occurrence() {
        let dates = expand_occurrences(day(2024, 6, 1), Cadence::Daily, Some(day(2024, 6, 1)));
        assert_eq!(dates, vec![day(2024, 6, 1)]);
    }

    #[test]
    fn missing_or_earlier_end_yields_base_only() {
        let base = day(2024, 6, 10);
        for cadence in [Cadence::Daily, Cadence::Weekly, Cadence::Monthly] {
            assert_eq!(expand_occurrences(base, cadence, None), vec![base]);
            assert_eq!(expand_occurrences(base, cadence, Some(day(2024, 6, 9))), vec![base]);
        }
    }

    #[test]
    fn daily_count_matches_day_span() {
        let base = day(2024, 2, 20);
        for span in [0_i64, 1, 9, 40] {
            let end = base + chrono::Duration::days(span);
            let dates = expand_occurrences(base, Cadence::Daily, Some(end));
            assert_eq!(dates.len() as i64, span + 1);
            assert_eq!(dates.first(), Some(&base));
            assert_eq!(dates.last(), Some(&end));
            for pair in dates.windows(2) {
                assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
            }
        }
    }

    #[test]
    fn weekly_count_floors_partial_weeks() {
        let base = day(2024, 6, 3);
        for span in [0_i64, 6, 7, 20, 21, 27] {
            let end = base + chrono::Duration::days(span);
            let dates = expand_occurrences(base, Cadence::Weekly, Some(end));
            assert_eq!(dates.len() as i64, span / 7 + 1, "span {span}");
            assert!(*dates.last().unwrap() <= end);
            assert!(*dates.last().unwrap() + chrono::Duration::days(7) > end);
            for pair in dates.windows(2) {
                assert_eq!(pair[1] - pair[0], chrono::Duration::days(7));
            }
        }
    }

    #[test]
    fn monthly_keeps_anchor_day_when_month_allows_it() {
        let base = day(2023, 10, 30);
        let dates = expand_occurrences(base, Cadence::Monthly, Some(day(2024, 3, 31)));
        let days: Vec<u32> = dates.iter().map(|d| d.day()).collect();
        // Oct 30, Nov 30, Dec 30, Jan 30, Feb 29 (clamped), Mar 30.
        assert_eq!(days, vec![30, 30, 30, 30, 29, 30]);
        assert_eq!(dates[4], day(2024, 2, 29));
    }

    #[test]
    fn time_of_day_is_preserved_across_occurrences() {
        let base = day(2024, 6, 1) + chrono::Duration::hours(14);
        let end = day(2024, 6, 3);
        let dates = expand_occurrences(base, Cadence::Daily, Some(end));
        // 06-03 14:00 is past the 06-03 00:00 end instant.
        assert_eq!(dates.len(), 2);
        assert!(dates.iter().all(|d| d.time() == base.time()));
    }
}
