use chrono::{DateTime, Duration, FixedOffset, Local, SecondsFormat, Utc};

/// Clock trait for abstracting time operations
/// Measurements and history entries take their timestamps from a Clock so
/// that tests can pin the hour of day
pub trait Clock: Send + Sync {
    /// Current time, carrying the local UTC offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current time as RFC3339 string with millisecond precision
    /// Format: "2024-01-15T10:30:00.000+02:00"
    fn now_rfc3339(&self) -> String {
        to_rfc3339_millis(&self.now())
    }
}

/// Production implementation of Clock using the local system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Test implementation of Clock with fixed/controllable time
/// Useful for deterministic testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Create a new FixedClock with the given timestamp
    pub fn new(timestamp: DateTime<FixedOffset>) -> Self {
        Self { timestamp }
    }

    /// Create a FixedClock from RFC3339 string, keeping its offset
    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?;
        Ok(Self { timestamp })
    }

    /// Create a FixedClock (UTC) from epoch seconds
    pub fn from_epoch_seconds(seconds: i64) -> Self {
        let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0)
            .unwrap_or_default()
            .fixed_offset();
        Self { timestamp }
    }

    /// Update the fixed time
    pub fn set_time(&mut self, timestamp: DateTime<FixedOffset>) {
        self.timestamp = timestamp;
    }

    /// Advance time by the given number of seconds
    pub fn advance_seconds(&mut self, seconds: i64) {
        self.timestamp += Duration::seconds(seconds);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

/// Format a timestamp the way measurements store it
pub fn to_rfc3339_millis(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Human readable measurement time, e.g. "Jan 15, 10:30:05 AM"
pub fn display_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%b %-d, %-I:%M:%S %p").to_string()
}

/// Human readable history time, e.g. "Jan 15, 10:30 AM"
pub fn history_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%b %-d, %-I:%M %p").to_string()
}
