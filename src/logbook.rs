//! Logbook aggregation: measurements, the derived average and time-of-day
//! balance.
//!
//! All operations take a logbook by reference and return a new value. The
//! average is recomputed from the full measurement list every time.

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::filters::FilterSet;
use crate::time::{display_timestamp, to_rfc3339_millis, Clock};

/// One lux reading logged to a spot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// 1-based sequence number at the time of insertion
    pub number: u32,
    pub lux: u32,
    /// RFC3339, unique within its logbook
    pub timestamp: String,
    pub display_timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Logbook {
    pub id: String,
    pub title: String,
    pub created_at: String,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub average: u32,
    #[serde(default)]
    pub plant_profile: FilterSet,
}

impl Logbook {
    /// Empty logbook with no preferences
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: created_at.into(),
            measurements: Vec::new(),
            average: 0,
            plant_profile: FilterSet::default(),
        }
    }

    pub fn has_measurements(&self) -> bool {
        !self.measurements.is_empty()
    }

    pub fn time_of_day_counts(&self) -> TimeOfDayCounts {
        bucket_by_time_of_day(&self.measurements)
    }
}

/// Title used when the user leaves the name blank
pub fn default_title(existing_logbooks: usize) -> String {
    format!("Logbook {}", existing_logbooks + 1)
}

/// Rounded mean of the readings, 0 for an empty list
pub fn average_lux(measurements: &[Measurement]) -> u32 {
    rounded_mean(measurements.iter().map(|m| m.lux)).unwrap_or(0)
}

/// `round(sum / n)` with halves rounded up, `None` for no values
pub fn rounded_mean(values: impl IntoIterator<Item = u32>) -> Option<u32> {
    let (sum, n) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));

    if n == 0 {
        return None;
    }
    Some(((2 * sum + n) / (2 * n)) as u32)
}

/// Append a reading taken now
pub fn add_measurement(logbook: &Logbook, lux: u32, clock: &dyn Clock) -> Logbook {
    let taken_at = unique_timestamp(logbook, clock.now());

    let mut updated = logbook.clone();
    updated.measurements.push(Measurement {
        number: logbook.measurements.len() as u32 + 1,
        lux,
        timestamp: to_rfc3339_millis(&taken_at),
        display_timestamp: display_timestamp(&taken_at),
    });
    updated.average = average_lux(&updated.measurements);
    updated
}

/// Remove the measurement with the given timestamp
///
/// Returns the updated logbook and whether anything was removed. An unknown
/// timestamp leaves the logbook unchanged.
pub fn delete_measurement(logbook: &Logbook, timestamp: &str) -> (Logbook, bool) {
    let mut updated = logbook.clone();
    let before = updated.measurements.len();
    updated.measurements.retain(|m| m.timestamp != timestamp);

    let removed = updated.measurements.len() != before;
    if removed {
        updated.average = average_lux(&updated.measurements);
    }
    (updated, removed)
}

/// Restore the average invariant on a logbook read from elsewhere
pub fn recompute_average(logbook: &Logbook) -> Logbook {
    let mut updated = logbook.clone();
    updated.average = average_lux(&updated.measurements);
    updated
}

// Two readings in the same millisecond would share a key; nudge forward.
fn unique_timestamp(logbook: &Logbook, mut candidate: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    while logbook
        .measurements
        .iter()
        .any(|m| m.timestamp == to_rfc3339_millis(&candidate))
    {
        candidate += Duration::milliseconds(1);
    }
    candidate
}

// ============================================================================
// Time-of-day balance
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Unknown,
}

/// Bucket for a stored timestamp
///
/// Uses the hour in the timestamp's own offset, i.e. the wall-clock time at
/// which the reading was taken.
pub fn time_of_day(timestamp: &str) -> TimeOfDay {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => match parsed.hour() {
            h if h < 12 => TimeOfDay::Morning,
            h if h < 16 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        },
        Err(_) => TimeOfDay::Unknown,
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeOfDayCounts {
    pub morning: u32,
    pub afternoon: u32,
    pub evening: u32,
}

impl TimeOfDayCounts {
    pub fn total(&self) -> u32 {
        self.morning + self.afternoon + self.evening
    }
}

/// Count measurements per bucket; unparseable timestamps are skipped
pub fn bucket_by_time_of_day(measurements: &[Measurement]) -> TimeOfDayCounts {
    let mut counts = TimeOfDayCounts::default();
    for measurement in measurements {
        match time_of_day(&measurement.timestamp) {
            TimeOfDay::Morning => counts.morning += 1,
            TimeOfDay::Afternoon => counts.afternoon += 1,
            TimeOfDay::Evening => counts.evening += 1,
            TimeOfDay::Unknown => {}
        }
    }
    counts
}

/// All three buckets hold the same number of readings
pub fn is_balanced(counts: &TimeOfDayCounts) -> bool {
    counts.morning == counts.afternoon && counts.afternoon == counts.evening
}
