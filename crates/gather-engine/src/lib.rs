//! # gather-engine
//!
//! Deterministic recurrence expansion and mutual-availability search for
//! group scheduling.
//!
//! Two pure, synchronous engines make up the core: the recurrence engine
//! turns a rule plus an anchor event into concrete occurrences within a
//! bounded horizon, reconciling per-occurrence exception rows along the way;
//! the availability engine merges multiple users' busy intervals day by day
//! and emits duration-sized free slots ranked by how many requested users
//! are actually free. Neither performs I/O: event rows arrive already
//! filtered from the external store, and results are plain data for the
//! orchestrator to present.
//!
//! ## Modules
//!
//! - [`recurrence`] — rule + anchor → concrete occurrence instants
//! - [`availability`] — busy intervals × users → ranked free slots
//! - [`conflict`] — overlap detection between occurrence lists
//! - [`types`] — events, rules, queries, slots (the engine's data boundary)
//! - [`error`] — rule validation errors

pub mod availability;
pub mod conflict;
mod dates;
pub mod error;
pub mod recurrence;
pub mod types;

pub use availability::find_free_time_slots;
pub use conflict::{find_conflicts, Conflict};
pub use error::RuleError;
pub use recurrence::{expand_recurring_event, generate_occurrences, next_occurrence, MAX_OCCURRENCES};
pub use types::{
    AvailabilityQuery, BusyCalendar, BusyInterval, DateRange, Event, EventId, FreeTimeSlot,
    Frequency, Occurrence, RecurrenceRule, TimeWindow, UserId,
};
