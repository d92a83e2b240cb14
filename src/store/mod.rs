//! Persistence seams.
//!
//! Each store is an async trait with an in-process implementation in
//! [`memory`] and a DynamoDB implementation in [`dynamo`]. Not-found deletes
//! report `false` rather than failing.

use chrono::DateTime;
use std::future::Future;

use crate::catalog::PlantRecord;
use crate::error::StoreError;
use crate::filters::FilterSet;
use crate::logbook::Logbook;

pub mod dynamo;
pub mod memory;

pub use dynamo::{DynamoFavoritesStore, DynamoLogbookStore, DynamoPreferencesStore};
pub use memory::{MemoryFavoritesStore, MemoryLogbookStore, MemoryPreferencesStore};

/// Plants the user accepted, keyed by plant name
pub trait FavoritesStore: Send + Sync {
    /// All favorites in insertion order
    fn get_all(&self) -> impl Future<Output = Result<Vec<PlantRecord>, StoreError>> + Send;

    /// Add a plant; adding one that is already present is a no-op.
    /// Returns true when the plant is present after the call.
    fn add(&self, plant: &PlantRecord) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Returns false when no favorite had that name
    fn remove(&self, name: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn contains(&self, name: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

pub trait LogbookStore: Send + Sync {
    /// All logbooks, newest first by `createdAt`
    fn get_all(&self) -> impl Future<Output = Result<Vec<Logbook>, StoreError>> + Send;

    /// Insert or replace by id. The logbook is validated before writing.
    fn save(&self, logbook: &Logbook) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a logbook and its measurements. Returns false when absent.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn get_last_selected_id(
        &self,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// `None` clears the stored selection
    fn set_last_selected_id(
        &self,
        id: Option<&str>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Filters used by direct (single measurement) mode across restarts
pub trait PreferencesStore: Send + Sync {
    fn load_direct_filters(
        &self,
    ) -> impl Future<Output = Result<Option<FilterSet>, StoreError>> + Send;

    /// The filters are validated before writing
    fn save_direct_filters(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn clear_direct_filters(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Newest first, ties broken by id. Unparseable `createdAt` sorts last.
pub(crate) fn sort_newest_first(logbooks: &mut [Logbook]) {
    let created = |logbook: &Logbook| DateTime::parse_from_rfc3339(&logbook.created_at).ok();
    logbooks.sort_by(|a, b| created(b).cmp(&created(a)).then_with(|| a.id.cmp(&b.id)));
}
