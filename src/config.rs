use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::time::Duration;

use crate::error::error_codes;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::matching::MatchOptions;
use crate::sampling::DEFAULT_SAMPLING_TICKS;

/// Persistence configuration for the DynamoDB-backed stores
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB client
    pub dynamodb_client: DynamoDbClient,
    /// Favorite plants table name
    pub favorites_table: String,
    /// Logbooks table name
    pub logbooks_table: String,
    /// Settings table name (last selection, direct-mode filters)
    pub settings_table: String,
}

impl Config {
    /// Create a new Config instance from environment variables
    pub async fn from_env() -> Result<Self, ConfigError> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        let dynamodb_config = aws_sdk_dynamodb::config::Builder::from(&aws_config)
            .timeout_config(
                aws_sdk_dynamodb::config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(10))
                    .operation_attempt_timeout(Duration::from_secs(4))
                    .build(),
            )
            .build();

        let dynamodb_client = DynamoDbClient::from_conf(dynamodb_config);

        let favorites_table = required_var("FAVORITES_TABLE")?;
        let logbooks_table = required_var("LOGBOOKS_TABLE")?;
        let settings_table = required_var("SETTINGS_TABLE")?;

        Ok(Config {
            dynamodb_client,
            favorites_table,
            logbooks_table,
            settings_table,
        })
    }

    /// Create a test configuration with custom table names
    /// This is useful for integration tests with DynamoDB Local
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn for_test(
        endpoint_url: &str,
        favorites_table: String,
        logbooks_table: String,
        settings_table: String,
    ) -> Self {
        use aws_sdk_dynamodb::config::{Credentials, Region};

        let credentials =
            Credentials::new("test_access_key", "test_secret_key", None, None, "test");

        let dynamodb_config = aws_sdk_dynamodb::config::Builder::new()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(endpoint_url)
            .timeout_config(
                aws_sdk_dynamodb::config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(10))
                    .operation_attempt_timeout(Duration::from_secs(5))
                    .build(),
            )
            .build();

        let dynamodb_client = DynamoDbClient::from_conf(dynamodb_config);

        Config {
            dynamodb_client,
            favorites_table,
            logbooks_table,
            settings_table,
        }
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Tunables for the recommendation session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Ticks in one measuring window (`SPOT_SAMPLING_TICKS`)
    pub sampling_ticks: u32,
    /// Search history entries kept (`SPOT_HISTORY_CAPACITY`)
    pub history_capacity: usize,
    /// Score the survives tier at 50% (`SPOT_SURVIVES_TIER`)
    pub include_survives_tier: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sampling_ticks: DEFAULT_SAMPLING_TICKS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            include_survives_tier: false,
        }
    }
}

impl EngineSettings {
    /// Read settings from the process environment, defaulting unset values
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let sampling_ticks = match lookup("SPOT_SAMPLING_TICKS") {
            Some(raw) => parse_positive("SPOT_SAMPLING_TICKS", &raw)?,
            None => defaults.sampling_ticks,
        };

        let history_capacity = match lookup("SPOT_HISTORY_CAPACITY") {
            Some(raw) => parse_positive("SPOT_HISTORY_CAPACITY", &raw)? as usize,
            None => defaults.history_capacity,
        };

        let include_survives_tier = match lookup("SPOT_SURVIVES_TIER") {
            Some(raw) => parse_flag("SPOT_SURVIVES_TIER", &raw)?,
            None => defaults.include_survives_tier,
        };

        Ok(Self {
            sampling_ticks,
            history_capacity,
            include_survives_tier,
        })
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            include_survives_tier: self.include_survives_tier,
        }
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        error_codes::CONFIG_ERROR
    }
}
