//! Property-based tests for the engine invariants using proptest.
//!
//! These verify behaviors that should hold for *any* valid input, not just
//! the examples in the per-module test files.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use gather_engine::availability::find_free_time_slots;
use gather_engine::recurrence::{generate_occurrences, MAX_OCCURRENCES};
use gather_engine::types::{
    AvailabilityQuery, BusyCalendar, BusyInterval, DateRange, RecurrenceRule, UserId,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// An anchor instant in 2025-2026; day capped at 28 to stay valid everywhere.
fn arb_anchor() -> impl Strategy<Value = DateTime<Utc>> {
    (2025i32..=2026, 1u32..=12, 1u32..=28, 0u32..=23, 0u32..=59)
        .prop_map(|(y, m, d, h, min)| Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
}

fn arb_interval() -> impl Strategy<Value = u32> {
    1u32..=6
}

fn arb_count() -> impl Strategy<Value = u32> {
    1u32..=50
}

fn arb_weekday_set() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::btree_set(0u8..=6, 1..=4).prop_map(|set| set.into_iter().collect())
}

/// Busy spans as minute offsets inside a 09:00-17:00 day.
fn arb_busy_minutes() -> impl Strategy<Value = Vec<(i64, i64)>> {
    proptest::collection::vec((0i64..480, 0i64..480), 0..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn wide_range(anchor: DateTime<Utc>) -> DateRange {
    DateRange::new(anchor - Duration::days(1), anchor + Duration::days(400))
}

// ---------------------------------------------------------------------------
// Property: daily occurrences are exactly `interval` days apart
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn daily_spacing_is_exact(
        anchor in arb_anchor(),
        interval in arb_interval(),
        count in 2u32..=30,
    ) {
        let rule = RecurrenceRule::daily().every(interval).times(count);
        let result = generate_occurrences(&rule, anchor, &wide_range(anchor), &HashSet::new());

        prop_assert_eq!(result.len(), count as usize);
        for pair in result.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(interval as i64));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: weekly day filter only emits listed weekdays
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn weekly_filter_respects_day_set(
        anchor in arb_anchor(),
        days in arb_weekday_set(),
        count in 1u32..=20,
    ) {
        use chrono::Datelike;

        let rule = RecurrenceRule::weekly_on(days.clone()).times(count);
        let result = generate_occurrences(&rule, anchor, &wide_range(anchor), &HashSet::new());

        for occurrence in &result {
            let index = occurrence.weekday().num_days_from_sunday() as u8;
            prop_assert!(
                days.contains(&index),
                "weekday {} not in {:?} for occurrence {:?}",
                index,
                days,
                occurrence
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property: occurrence count never exceeds min(count, hard cap)
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn occurrences_are_bounded_by_count_and_cap(
        anchor in arb_anchor(),
        interval in arb_interval(),
        count in arb_count(),
    ) {
        let rule = RecurrenceRule::daily().every(interval).times(count);
        let result = generate_occurrences(&rule, anchor, &wide_range(anchor), &HashSet::new());

        prop_assert!(result.len() <= (count as usize).min(MAX_OCCURRENCES));
    }
}

// ---------------------------------------------------------------------------
// Property: excluding days removes exactly those days, shifting nothing
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn exclusion_removes_days_without_shifting_the_series(
        anchor in arb_anchor(),
        count in 3u32..=30,
        mask in proptest::collection::vec(any::<bool>(), 30),
    ) {
        let rule = RecurrenceRule::daily().times(count);
        let range = wide_range(anchor);
        let baseline = generate_occurrences(&rule, anchor, &range, &HashSet::new());

        let excluded: HashSet<_> = baseline
            .iter()
            .zip(&mask)
            .filter(|(_, keep_out)| **keep_out)
            .map(|(occurrence, _)| occurrence.date_naive())
            .collect();
        let thinned = generate_occurrences(&rule, anchor, &range, &excluded);

        // The budget is consumed either way: the surviving dates are exactly
        // the baseline minus the excluded days, in the same order.
        let expected: Vec<_> = baseline
            .iter()
            .filter(|o| !excluded.contains(&o.date_naive()))
            .copied()
            .collect();
        prop_assert_eq!(thinned, expected);
    }
}

// ---------------------------------------------------------------------------
// Property: expansion is deterministic
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_deterministic(
        anchor in arb_anchor(),
        days in arb_weekday_set(),
        count in arb_count(),
    ) {
        let rule = RecurrenceRule::weekly_on(days).times(count);
        let range = wide_range(anchor);

        let first = generate_occurrences(&rule, anchor, &range, &HashSet::new());
        let second = generate_occurrences(&rule, anchor, &range, &HashSet::new());
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Property: every emitted slot has the exact duration, non-zero confidence,
// and does not overlap the user's busy intervals
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_have_exact_duration_and_avoid_busy_time(
        spans in arb_busy_minutes(),
        duration_minutes in (1i64..=8).prop_map(|halves| halves * 30),
    ) {
        let user: UserId = Uuid::from_u128(7);
        let window_open = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();

        let intervals: Vec<BusyInterval> = spans
            .iter()
            .map(|&(a, b)| BusyInterval {
                owner_id: user,
                start: window_open + Duration::minutes(a),
                end: window_open + Duration::minutes(b),
            })
            .collect();
        let calendar = BusyCalendar::from_intervals(intervals.clone());

        let query = AvailabilityQuery {
            requested_user_ids: vec![user],
            duration_hours: duration_minutes as f64 / 60.0,
            time_window: None,
            date_range: Some(DateRange::new(
                Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 5, 5, 23, 59, 0).unwrap(),
            )),
        };
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();

        let slots = find_free_time_slots(&query, &calendar, now);

        for slot in &slots {
            prop_assert_eq!(slot.end - slot.start, Duration::minutes(duration_minutes));
            prop_assert!(slot.confidence > 0.0);
            for interval in &intervals {
                prop_assert!(
                    interval.end <= slot.start || interval.start >= slot.end,
                    "slot {:?}-{:?} overlaps busy {:?}-{:?}",
                    slot.start,
                    slot.end,
                    interval.start,
                    interval.end
                );
            }
        }
    }
}
