//! Occurrence generation for recurring events.
//!
//! Expands a recurrence rule plus an anchor start time into concrete
//! occurrence timestamps within a bounded horizon. Excluded calendar days are
//! skipped in the output but still consume the rule's occurrence budget, so a
//! series stays stable as individual days are cancelled.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::dates::{add_months, add_years, at_time_of, clamp_day, start_of_week, weekday_index};
use crate::types::{DateRange, Event, Frequency, RecurrenceRule};

/// Hard cap on occurrences considered per expansion, excluded days included.
pub const MAX_OCCURRENCES: usize = 365;

/// Lookahead horizon of [`next_occurrence`].
const LOOKAHEAD_DAYS: i64 = 365;

/// Expand a rule into ordered occurrence start times.
///
/// Pure and restartable: identical inputs always produce identical output.
/// Candidates are matched day by day against the rule, timed with the
/// anchor's time-of-day, and emitted when they fall inside `range` and not on
/// an excluded day. A candidate on an excluded day is withheld from the
/// output but still counts against `rule.count` and the hard cap.
pub fn generate_occurrences(
    rule: &RecurrenceRule,
    anchor_start: DateTime<Utc>,
    range: &DateRange,
    excluded_days: &HashSet<NaiveDate>,
) -> Vec<DateTime<Utc>> {
    let effective_end = rule.end_date.unwrap_or(range.end).min(range.end);
    let mut cursor = initial_cursor(rule, anchor_start);
    let mut generated = 0usize;
    let mut occurrences = Vec::new();

    while at_time_of(cursor, anchor_start) <= effective_end && generated < MAX_OCCURRENCES {
        if let Some(count) = rule.count {
            if generated >= count as usize {
                break;
            }
        }

        if matches_rule(rule, cursor, anchor_start) {
            let candidate = at_time_of(cursor, anchor_start);
            if candidate >= anchor_start {
                // Consumed whether or not the day is excluded.
                generated += 1;
                if candidate.date_naive() >= range.start.date_naive()
                    && !excluded_days.contains(&candidate.date_naive())
                {
                    occurrences.push(candidate);
                }
            }
        }

        cursor = advance(rule, cursor, anchor_start);
    }

    debug!(
        "expanded {:?} rule: {} generated, {} emitted",
        rule.frequency,
        generated,
        occurrences.len()
    );
    occurrences
}

/// Expand a recurring event into displayable virtual instances.
///
/// Exception rows contribute only their `original_occurrence_date` (day
/// granularity); the matching base-series instances are withheld. The
/// exception rows themselves (cancellation placeholders and modified
/// replacements alike) are already persisted and are merged in by the
/// caller, which also owns precedence between a replacement row and a virtual
/// instance on the same day. A non-recurring event passes through unchanged
/// when it touches the range.
pub fn expand_recurring_event(event: &Event, range: &DateRange, exceptions: &[Event]) -> Vec<Event> {
    let Some(rule) = &event.recurrence_rule else {
        if event.overlaps_range(range.start, range.end) {
            return vec![event.clone()];
        }
        return Vec::new();
    };

    let excluded_days: HashSet<NaiveDate> = exceptions
        .iter()
        .filter_map(|e| e.original_occurrence_date)
        .map(|d| d.date_naive())
        .collect();

    let duration = event.duration();
    generate_occurrences(rule, event.start, range, &excluded_days)
        .into_iter()
        .map(|start| {
            let mut instance = event.clone();
            instance.start = start;
            instance.end = start + duration;
            instance.original_occurrence_date = Some(start);
            instance
        })
        .collect()
}

/// The first occurrence strictly after `after`, within a one-year lookahead.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    after: DateTime<Utc>,
    anchor_start: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let lookahead = DateRange::new(after, after + Duration::days(LOOKAHEAD_DAYS));
    generate_occurrences(rule, anchor_start, &lookahead, &HashSet::new())
        .into_iter()
        .find(|occurrence| *occurrence > after)
}

/// Weekly rules with an explicit weekday set scan from the start of the
/// anchor's week so every matching weekday of that first week is considered.
fn initial_cursor(rule: &RecurrenceRule, anchor_start: DateTime<Utc>) -> NaiveDate {
    match rule.frequency {
        Frequency::Weekly if !rule.days_of_week.is_empty() => {
            start_of_week(anchor_start.date_naive())
        }
        _ => anchor_start.date_naive(),
    }
}

fn matches_rule(rule: &RecurrenceRule, date: NaiveDate, anchor: DateTime<Utc>) -> bool {
    match rule.frequency {
        Frequency::Daily => true,
        Frequency::Weekly => {
            if rule.days_of_week.is_empty() {
                // Week-stepping from the anchor already lands on this
                // weekday; the check keeps the fallback explicit.
                date.weekday() == anchor.weekday()
            } else {
                rule.days_of_week.contains(&weekday_index(date))
            }
        }
        Frequency::Monthly => match rule.day_of_month {
            Some(day) => date.day() == clamp_day(date.year(), date.month(), day),
            None => date.day() == anchor.day(),
        },
        Frequency::Yearly => match (rule.month_of_year, rule.day_of_month) {
            (Some(month), Some(day)) => {
                date.month() == month && date.day() == clamp_day(date.year(), month, day)
            }
            _ => date.month() == anchor.month() && date.day() == anchor.day(),
        },
    }
}

fn advance(rule: &RecurrenceRule, date: NaiveDate, anchor: DateTime<Utc>) -> NaiveDate {
    // A zero interval would pin the cursor in place; treat it as 1.
    let interval = rule.interval.max(1);
    match rule.frequency {
        Frequency::Daily => date + Duration::days(interval as i64),
        Frequency::Weekly => {
            if rule.days_of_week.is_empty() {
                date + Duration::weeks(interval as i64)
            } else {
                // Each day of the week is individually tested.
                date + Duration::days(1)
            }
        }
        Frequency::Monthly => {
            let target_day = rule.day_of_month.unwrap_or(anchor.day());
            add_months(date, interval, target_day)
        }
        Frequency::Yearly => {
            let (month, day) = match (rule.month_of_year, rule.day_of_month) {
                (Some(month), Some(day)) => (month, day),
                _ => (anchor.month(), anchor.day()),
            };
            add_years(date, interval, month, day)
        }
    }
}
