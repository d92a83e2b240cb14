use std::collections::HashSet;

use crate::catalog::{LoveLevel, WaterRequirement};
use crate::filters::{normalize_size, FilterSet, LOOKS_OPTIONS, PETS_OPTIONS};
use crate::logbook::{average_lux, Logbook};

/// Validation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation error for field '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

const SIZE_WORDS: [&str; 4] = ["small", "medium", "large", "hanging"];

/// Validate every non-empty filter field against its vocabulary
///
/// Size accepts the quiz wording with its parenthetical qualifier as well as
/// the bare word. The other fields are matched case-insensitively.
pub fn validate_filter_set(filters: &FilterSet) -> Result<(), ValidationError> {
    if !filters.size.is_empty() && !SIZE_WORDS.contains(&normalize_size(&filters.size).as_str())
    {
        return Err(ValidationError::new(
            "size",
            format!("Unknown size '{}'", filters.size),
        ));
    }

    if !filters.looks.is_empty() && !LOOKS_OPTIONS.contains(&filters.looks.to_lowercase().as_str())
    {
        return Err(ValidationError::new(
            "looks",
            format!("Unknown looks '{}'", filters.looks),
        ));
    }

    if !filters.love_level.is_empty() && filters.love_level.parse::<LoveLevel>().is_err() {
        return Err(ValidationError::new(
            "loveLevel",
            format!("Unknown love level '{}'", filters.love_level),
        ));
    }

    if !filters.watering.is_empty() && filters.watering.parse::<WaterRequirement>().is_err() {
        return Err(ValidationError::new(
            "watering",
            format!("Unknown watering '{}'", filters.watering),
        ));
    }

    if !filters.pets.is_empty() && !PETS_OPTIONS.contains(&filters.pets.as_str()) {
        return Err(ValidationError::new(
            "pets",
            format!("Unknown pets answer '{}'", filters.pets),
        ));
    }

    Ok(())
}

/// Validate RFC3339 timestamp string
pub fn validate_rfc3339_timestamp(timestamp: &str) -> Result<(), ValidationError> {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new(
            "timestamp",
            "Timestamp must be in RFC3339 format (e.g., 2024-01-15T10:30:00Z)",
        )),
    }
}

/// Validate a logbook title. Any non-blank title is accepted.
pub fn validate_logbook_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title", "Title cannot be empty"));
    }

    Ok(())
}

/// Validate a logbook before it is written to a store
///
/// Checks the id and title, that every measurement timestamp parses and is
/// unique within the logbook, that the stored average agrees with the
/// measurements, and that the plant profile uses known filter values.
pub fn validate_logbook(logbook: &Logbook) -> Result<(), ValidationError> {
    if logbook.id.is_empty() {
        return Err(ValidationError::new("id", "Logbook id cannot be empty"));
    }

    validate_logbook_title(&logbook.title)?;

    let mut seen = HashSet::new();
    for measurement in &logbook.measurements {
        validate_rfc3339_timestamp(&measurement.timestamp)?;
        if !seen.insert(measurement.timestamp.as_str()) {
            return Err(ValidationError::new(
                "timestamp",
                format!("Duplicate measurement timestamp {}", measurement.timestamp),
            ));
        }
    }

    let expected = average_lux(&logbook.measurements);
    if logbook.average != expected {
        return Err(ValidationError::new(
            "average",
            format!(
                "Average {} does not match measurements (expected {})",
                logbook.average, expected
            ),
        ));
    }

    validate_filter_set(&logbook.plant_profile)
}
