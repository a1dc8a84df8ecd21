//! Shared data model for the recurrence and availability engines.
//!
//! Everything here is transient: rows come in from the external store already
//! filtered, results go back out to the orchestrator, and nothing is persisted
//! or mutated across calls.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, RuleError};

/// Identifier of a calendar user.
pub type UserId = Uuid;

/// Identifier of a stored event row.
pub type EventId = Uuid;

// ---------------------------------------------------------------------------
// Recurrence rules
// ---------------------------------------------------------------------------

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A recurrence rule attached to an anchor event.
///
/// At most one of `count` and `end_date` is meaningful; when both are absent,
/// expansion is bounded only by the caller's date range and the hard
/// 365-occurrence cap. Fields a frequency needs but the rule lacks fall back
/// to the anchor event's own weekday/day/month at expansion time; a
/// malformed rule degrades, it never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Step count between occurrences (1 = every period).
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday. Weekly rules only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<u8>,
    /// 1-31, clamped to the month's last day when out of range.
    /// Monthly and yearly rules only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// 1-12. Yearly rules only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<u32>,
    /// Maximum number of occurrences, excluded days included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Expansion stops the day before this cutoff when it is a day boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    fn with_frequency(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            days_of_week: Vec::new(),
            day_of_month: None,
            month_of_year: None,
            count: None,
            end_date: None,
        }
    }

    /// A rule repeating every day.
    pub fn daily() -> Self {
        Self::with_frequency(Frequency::Daily)
    }

    /// A rule repeating every week on the anchor event's weekday.
    pub fn weekly() -> Self {
        Self::with_frequency(Frequency::Weekly)
    }

    /// A weekly rule on the given weekdays (0 = Sunday .. 6 = Saturday).
    pub fn weekly_on(days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            days_of_week: days.into_iter().collect(),
            ..Self::with_frequency(Frequency::Weekly)
        }
    }

    /// A monthly rule on the given day of the month.
    pub fn monthly_on(day: u32) -> Self {
        Self {
            day_of_month: Some(day),
            ..Self::with_frequency(Frequency::Monthly)
        }
    }

    /// A monthly rule on the anchor event's day of the month.
    pub fn monthly() -> Self {
        Self::with_frequency(Frequency::Monthly)
    }

    /// A yearly rule on the given month and day.
    pub fn yearly_on(month: u32, day: u32) -> Self {
        Self {
            month_of_year: Some(month),
            day_of_month: Some(day),
            ..Self::with_frequency(Frequency::Yearly)
        }
    }

    /// A yearly rule on the anchor event's month and day.
    pub fn yearly() -> Self {
        Self::with_frequency(Frequency::Yearly)
    }

    /// Set the interval.
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Terminate after `count` occurrences.
    pub fn times(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Terminate at `end_date`.
    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Report contradictory or out-of-range fields.
    ///
    /// This is a diagnostic for the orchestrator to run before persisting a
    /// rule; expansion itself never requires it and degrades per field
    /// instead.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        if self.count.is_some() && self.end_date.is_some() {
            return Err(RuleError::ConflictingTerminators);
        }
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(RuleError::DayOfMonthOutOfRange(day));
            }
        }
        if let Some(month) = self.month_of_year {
            if !(1..=12).contains(&month) {
                return Err(RuleError::MonthOfYearOutOfRange(month));
            }
        }
        if let Some(&day) = self.days_of_week.iter().find(|&&d| d > 6) {
            return Err(RuleError::WeekdayOutOfRange(day));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A stored event row, or a virtual instance expanded from one.
///
/// Exception rows (`is_exception`) mark one occurrence of a parent series as
/// cancelled or replaced; they match the base series by calendar day via
/// `original_occurrence_date`. On virtual instances the same field carries
/// the instance's own start, which is what distinguishes instances that share
/// the series id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: UserId,
    pub title: String,
    pub start: DateTime<Utc>,
    /// Always >= `start`; the store guarantees it.
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendee_ids: Vec<UserId>,
    #[serde(default)]
    pub is_group_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<EventId>,
    #[serde(default)]
    pub is_exception: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_occurrence_date: Option<DateTime<Utc>>,
}

impl Event {
    /// Create a plain event with a fresh id.
    pub fn new(
        owner_id: UserId,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            start,
            end,
            is_all_day: false,
            location: None,
            category: None,
            attendee_ids: Vec::new(),
            is_group_event: false,
            recurrence_rule: None,
            parent_event_id: None,
            is_exception: false,
            original_occurrence_date: None,
        }
    }

    /// Attach a recurrence rule.
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence_rule = Some(rule);
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Mark as an all-day event.
    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    /// Build a cancellation exception row for one occurrence of this series.
    pub fn cancellation_for(&self, occurrence_start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_event_id: Some(self.id),
            is_exception: true,
            original_occurrence_date: Some(occurrence_start),
            recurrence_rule: None,
            ..self.clone()
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the event touches `[range_start, range_end]`.
    pub fn overlaps_range(&self, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> bool {
        self.start <= range_end && self.end >= range_start
    }
}

/// One concrete `(start, end)` instance of an event; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Occurrence {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

// ---------------------------------------------------------------------------
// Busy intervals
// ---------------------------------------------------------------------------

/// A span during which one user is unavailable.
///
/// Intervals of different owners are never merged with each other; merging
/// happens only inside the availability scan, across the requested user set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub owner_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Per-owner busy intervals, sorted by start once at construction and
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct BusyCalendar {
    by_owner: HashMap<UserId, Vec<BusyInterval>>,
}

impl BusyCalendar {
    pub fn from_intervals(intervals: impl IntoIterator<Item = BusyInterval>) -> Self {
        let mut by_owner: HashMap<UserId, Vec<BusyInterval>> = HashMap::new();
        for interval in intervals {
            by_owner.entry(interval.owner_id).or_default().push(interval);
        }
        for intervals in by_owner.values_mut() {
            intervals.sort_by_key(|i| (i.start, i.end));
        }
        Self { by_owner }
    }

    /// Build from already-expanded event rows (virtual instances or single
    /// events); each row busies its owner for its full span.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        Self::from_intervals(events.into_iter().map(|e| BusyInterval {
            owner_id: e.owner_id,
            start: e.start,
            end: e.end,
        }))
    }

    /// The sorted intervals of one owner. Unknown owners get an empty slice:
    /// no busy data means free all day.
    pub fn intervals_for(&self, owner: &UserId) -> &[BusyInterval] {
        self.by_owner.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Availability queries and results
// ---------------------------------------------------------------------------

/// A daily local clock-time window, as the translator hands it over.
///
/// Bounds are raw `HH:mm` strings; each bound that fails to parse falls back
/// to its default (09:00 / 17:00) rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub const DEFAULT_START: (u32, u32) = (9, 0);
    pub const DEFAULT_END: (u32, u32) = (17, 0);

    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Resolve an optional window into concrete clock times, bound by bound.
    pub fn resolve(window: Option<&TimeWindow>) -> (NaiveTime, NaiveTime) {
        let (dsh, dsm) = Self::DEFAULT_START;
        let (deh, dem) = Self::DEFAULT_END;
        let default_start = NaiveTime::from_hms_opt(dsh, dsm, 0).unwrap();
        let default_end = NaiveTime::from_hms_opt(deh, dem, 0).unwrap();
        match window {
            Some(w) => (
                parse_hhmm(&w.start).unwrap_or(default_start),
                parse_hhmm(&w.end).unwrap_or(default_end),
            ),
            None => (default_start, default_end),
        }
    }
}

fn parse_hhmm(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

/// A calendar-day span to search, inclusive at both ends at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Default span when a query omits its range.
    pub const DEFAULT_SPAN_DAYS: i64 = 30;

    /// Resolve an optional range against the caller's reference instant.
    pub fn resolve_or(range: Option<&DateRange>, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match range {
            Some(r) => (r.start, r.end),
            None => (now, now + Duration::days(Self::DEFAULT_SPAN_DAYS)),
        }
    }
}

/// A parsed availability request, as produced by the external translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub requested_user_ids: Vec<UserId>,
    pub duration_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// A candidate meeting slot, exactly the requested duration long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hours: f64,
    /// Fraction of requested users free during the slot; never 0 on an
    /// emitted slot.
    pub confidence: f64,
    pub available_user_ids: Vec<UserId>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
