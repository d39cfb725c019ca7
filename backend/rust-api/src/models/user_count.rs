use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::to_iso8601;

pub const DEFAULT_DURATION: i64 = 1;
pub const DEFAULT_DURATION_UNIT: &str = "year";

/// Calendar granularity used to step back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 4] = [
        DurationUnit::Day,
        DurationUnit::Week,
        DurationUnit::Month,
        DurationUnit::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Day => "day",
            DurationUnit::Week => "week",
            DurationUnit::Month => "month",
            DurationUnit::Year => "year",
        }
    }

    /// Exact, case-sensitive match on the lowercase unit name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.as_str() == value)
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw arguments of the count function, defaults already applied.
///
/// `duration_unit` stays a string so that an unknown unit reaches the counter
/// and is reported as an invalid argument rather than a decoding failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountRequest {
    #[serde(default = "default_duration")]
    pub duration: i64,
    #[serde(default = "default_duration_unit")]
    pub duration_unit: String,
}

impl Default for CountRequest {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            duration_unit: DEFAULT_DURATION_UNIT.to_string(),
        }
    }
}

fn default_duration() -> i64 {
    DEFAULT_DURATION
}

fn default_duration_unit() -> String {
    DEFAULT_DURATION_UNIT.to_string()
}

/// Closed interval `[start, end]` the count applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Payload returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResult {
    pub count: u64,
    pub from: String,
    pub to: String,
}

impl CountResult {
    pub fn new(count: u64, window: &TimeWindow) -> Self {
        Self {
            count,
            from: to_iso8601(window.start),
            to: to_iso8601(window.end),
        }
    }
}
