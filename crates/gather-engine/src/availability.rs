//! Mutual free-slot search across multiple users' calendars.
//!
//! Walks each day of the search range, merges the requested users' busy
//! intervals inside the daily window, and bites duration-sized candidate
//! slots off the front of each gap. Slots are ranked by how many requested
//! users are actually free, then by start time.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::types::{AvailabilityQuery, BusyCalendar, BusyInterval, DateRange, FreeTimeSlot, TimeWindow, UserId};

/// Find ranked free slots for a query.
///
/// `now` anchors the default date range (today through thirty days out) when
/// the query omits one; it has no other effect, so results are a pure
/// function of the arguments. An empty requested-user set short-circuits to
/// an empty result, as does a non-positive duration; neither is an error.
/// Users with no busy data are free all day.
pub fn find_free_time_slots(
    query: &AvailabilityQuery,
    calendar: &BusyCalendar,
    now: DateTime<Utc>,
) -> Vec<FreeTimeSlot> {
    if query.requested_user_ids.is_empty() {
        return Vec::new();
    }
    let needed = Duration::minutes((query.duration_hours * 60.0).round() as i64);
    if needed <= Duration::zero() {
        return Vec::new();
    }

    let (search_start, search_end) = DateRange::resolve_or(query.date_range.as_ref(), now);
    let window = TimeWindow::resolve(query.time_window.as_ref());

    let mut slots = Vec::new();
    let mut day = search_start.date_naive();
    let last_day = search_end.date_naive();
    while day <= last_day {
        collect_day_slots(query, calendar, day, window, needed, &mut slots);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    slots.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.start.cmp(&b.start))
    });

    debug!(
        "availability search over {} user(s): {} slot(s) found",
        query.requested_user_ids.len(),
        slots.len()
    );
    slots
}

/// Scan one day: clip the requested users' busy intervals to the window,
/// merge them, and emit a candidate from every gap wide enough.
fn collect_day_slots(
    query: &AvailabilityQuery,
    calendar: &BusyCalendar,
    day: NaiveDate,
    (window_start, window_end): (NaiveTime, NaiveTime),
    needed: Duration,
    slots: &mut Vec<FreeTimeSlot>,
) {
    let day_start = day.and_time(window_start).and_utc();
    let day_end = day.and_time(window_end).and_utc();
    if day_end <= day_start {
        return;
    }

    let mut periods: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for user in &query.requested_user_ids {
        for interval in calendar.intervals_for(user) {
            if !touches_day(interval, day) {
                continue;
            }
            let start = interval.start.max(day_start);
            let end = interval.end.min(day_end);
            if start < end {
                periods.push((start, end));
            }
        }
    }
    periods.sort_by_key(|&(start, end)| (start, end));

    // Merge overlapping or touching periods into disjoint busy blocks.
    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for (start, end) in periods {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    let mut cursor = day_start;
    for &(busy_start, busy_end) in &merged {
        maybe_emit(query, calendar, day, cursor, busy_start, needed, slots);
        cursor = busy_end;
    }
    maybe_emit(query, calendar, day, cursor, day_end, needed, slots);
}

/// Emit a duration-sized bite from the front of the gap `[gap_start,
/// gap_end)`, not the whole gap, so every slot is directly proposable as a
/// meeting time without further slicing.
fn maybe_emit(
    query: &AvailabilityQuery,
    calendar: &BusyCalendar,
    day: NaiveDate,
    gap_start: DateTime<Utc>,
    gap_end: DateTime<Utc>,
    needed: Duration,
    slots: &mut Vec<FreeTimeSlot>,
) {
    if gap_end - gap_start < needed {
        return;
    }
    let slot_start = gap_start;
    let slot_end = gap_start + needed;

    // Availability is re-checked against the original, unclipped intervals.
    let available_user_ids: Vec<UserId> = query
        .requested_user_ids
        .iter()
        .filter(|user| {
            !calendar.intervals_for(user).iter().any(|interval| {
                touches_day(interval, day)
                    && interval.start < slot_end
                    && interval.end > slot_start
            })
        })
        .copied()
        .collect();

    if available_user_ids.is_empty() {
        return;
    }

    let confidence = available_user_ids.len() as f64 / query.requested_user_ids.len() as f64;
    slots.push(FreeTimeSlot {
        start: slot_start,
        end: slot_end,
        duration_hours: query.duration_hours,
        confidence,
        available_user_ids,
    });
}

/// An interval touches day `d` when it starts on it, ends on it, or spans it
/// entirely (multi-day or all-day events).
fn touches_day(interval: &BusyInterval, day: NaiveDate) -> bool {
    let start_day = interval.start.date_naive();
    let end_day = interval.end.date_naive();
    start_day == day || end_day == day || (start_day < day && end_day > day)
}
