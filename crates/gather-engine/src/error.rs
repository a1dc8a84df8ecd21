//! Error types for rule validation.
//!
//! The engines themselves never fail; malformed inputs degrade to defaults.
//! `RuleError` exists so the orchestrator can surface contradictory rule
//! fields to the user before a rule is ever stored.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("interval must be at least 1")]
    ZeroInterval,

    #[error("rule sets both count and end_date; at most one terminator is meaningful")]
    ConflictingTerminators,

    #[error("day_of_month {0} is outside 1-31")]
    DayOfMonthOutOfRange(u32),

    #[error("month_of_year {0} is outside 1-12")]
    MonthOfYearOutOfRange(u32),

    #[error("weekday index {0} is outside 0-6 (0 = Sunday)")]
    WeekdayOutOfRange(u8),
}

/// Convenience alias used throughout gather-engine.
pub type Result<T> = std::result::Result<T, RuleError>;
