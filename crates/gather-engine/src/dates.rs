//! Calendar-day helpers shared by the recurrence and availability engines.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// Clamp a target day-of-month into the given month.
pub(crate) fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    day.min(days_in_month(year, month)).max(1)
}

/// The Sunday on or before `date`. Weekday indices are 0 = Sunday.
pub(crate) fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub(crate) fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Step `months` forward from `date`, landing on `target_day` clamped to the
/// destination month. Re-anchoring from the stable target keeps a day-31
/// series on the 31st after passing through a short month.
pub(crate) fn add_months(date: NaiveDate, months: u32, target_day: u32) -> NaiveDate {
    let zero_based = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = (zero_based.div_euclid(12)) as i32;
    let month = (zero_based.rem_euclid(12)) as u32 + 1;
    let day = clamp_day(year, month, target_day);
    // In-range by construction.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Land on `(month, target_day)` of `years` after `date`, clamped.
pub(crate) fn add_years(date: NaiveDate, years: u32, month: u32, target_day: u32) -> NaiveDate {
    let year = date.year() + years as i32;
    let month = month.clamp(1, 12);
    let day = clamp_day(year, month, target_day);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Combine a calendar day with the anchor's time-of-day.
pub(crate) fn at_time_of(date: NaiveDate, anchor: DateTime<Utc>) -> DateTime<Utc> {
    date.and_time(anchor.time()).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn february_length_follows_leap_rule() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-01-08 is a Wednesday; its week starts Sunday 2025-01-05.
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        assert_eq!(
            start_of_week(wednesday),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(start_of_week(sunday), sunday);
        assert_eq!(weekday_index(sunday), 0);
        assert_eq!(weekday_index(wednesday), 3);
    }

    #[test]
    fn add_months_reanchors_after_short_month() {
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let feb = add_months(jan31, 1, 31);
        assert_eq!(feb, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        // Stepping from the clamped cursor still recovers the 31st.
        let mar = add_months(feb, 1, 31);
        assert_eq!(mar, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn add_months_crosses_year_boundary() {
        let nov = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        assert_eq!(
            add_months(nov, 3, 15),
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
        );
    }

    #[test]
    fn add_years_clamps_leap_day() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            add_years(leap, 1, 2, 29),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn at_time_of_carries_anchor_clock_time() {
        let anchor = Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(
            at_time_of(day, anchor),
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
        );
    }
}
