// Declare modules at the root level
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;
pub mod id_generator;
pub mod light;
pub mod logbook;
pub mod logbook_service;
pub mod matching;
pub mod repo;
pub mod sampling;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod time;
pub mod validators;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the core types at root for convenience
pub use catalog::{BundledCatalog, Catalog, CatalogProvider, JsonFileCatalog, PlantRecord};
pub use config::{Config, ConfigError, EngineSettings};
pub use error::{CatalogError, DatabaseError, LogbookError, SessionError, StoreError};
pub use filters::{FilterField, FilterSet};
pub use history::{HistoryEntry, SearchHistory};
pub use id_generator::{FixedIdGenerator, IdGenerator, RandomIdGenerator};
pub use light::{classify, LightLevel};
pub use logbook::{Logbook, Measurement, TimeOfDay, TimeOfDayCounts};
pub use logbook_service::{LogbookService, Persisted};
pub use matching::{MatchEngine, MatchOptions, MatchTrace, MatchedPlant};
pub use sampling::{SamplingWindow, SensorFeed, SensorSample, Ticker};
pub use session::{EmptyState, RecommendationSession, SamplingTarget, SessionEvent, SessionState};
pub use store::{FavoritesStore, LogbookStore, PreferencesStore};
pub use time::{Clock, FixedClock, SystemClock};
pub use validators::ValidationError;
