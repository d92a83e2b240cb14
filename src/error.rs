use thiserror::Error;

use crate::validators::ValidationError;

/// Stable machine-readable error codes, used as structured log fields
pub mod error_codes {
    // Validation errors
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const INVALID_TIMESTAMP: &str = "INVALID_TIMESTAMP";

    // Not found errors
    pub const LOGBOOK_NOT_FOUND: &str = "LOGBOOK_NOT_FOUND";

    // Store errors
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";

    // Catalog errors
    pub const CATALOG_ERROR: &str = "CATALOG_ERROR";

    // Configuration errors
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by a persistence provider
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Database(DatabaseError::Serialization(_)) => {
                error_codes::SERIALIZATION_ERROR
            }
            StoreError::Database(_) => error_codes::DATABASE_ERROR,
            StoreError::Validation(e) if e.field == "timestamp" => error_codes::INVALID_TIMESTAMP,
            StoreError::Validation(_) => error_codes::INVALID_VALUE,
            StoreError::Unavailable(_) => error_codes::STORE_UNAVAILABLE,
        }
    }
}

/// Errors raised while loading the plant catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Plant '{name}' has inconsistent light thresholds: {reason}")]
    InvalidThresholds { name: String, reason: String },

    #[error("Plant name '{0}' appears more than once")]
    DuplicateName(String),

    #[error("Plant record without a name")]
    MissingName,
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        error_codes::CATALOG_ERROR
    }
}

/// Errors from logbook mutations that cannot be treated as a no-op
#[derive(Debug, Error)]
pub enum LogbookError {
    #[error("Logbook not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl LogbookError {
    pub fn code(&self) -> &'static str {
        match self {
            LogbookError::NotFound(_) => error_codes::LOGBOOK_NOT_FOUND,
            LogbookError::Validation(_) => error_codes::INVALID_VALUE,
        }
    }
}

/// Session operations invoked from a state that does not allow them
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("A measurement is already in progress")]
    AlreadyMeasuring,

    #[error("No measurement in progress")]
    NotMeasuring,

    #[error("Logbook has no measurements")]
    NoMeasurements,

    #[error("No imbalance confirmation pending")]
    NotAwaitingConfirmation,

    #[error("No candidates are being presented")]
    NotPresenting,
}

impl<E> From<aws_sdk_dynamodb::error::SdkError<E>> for DatabaseError
where
    E: std::fmt::Debug,
{
    fn from(err: aws_sdk_dynamodb::error::SdkError<E>) -> Self {
        DatabaseError::DynamoDb(format!("{:?}", err))
    }
}

impl From<serde_dynamo::Error> for DatabaseError {
    fn from(err: serde_dynamo::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}
