//! In-process stores.
//!
//! State lives behind a `std::sync::Mutex`; no lock is held across an await.
//! Each store can be switched offline to exercise the failure paths of its
//! callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{sort_newest_first, FavoritesStore, LogbookStore, PreferencesStore};
use crate::catalog::PlantRecord;
use crate::error::StoreError;
use crate::filters::FilterSet;
use crate::logbook::{recompute_average, Logbook};
use crate::validators::{validate_filter_set, validate_logbook};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Default)]
struct Availability(AtomicBool);

impl Availability {
    fn set_offline(&self, offline: bool) {
        self.0.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.0.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryFavoritesStore {
    plants: Mutex<Vec<PlantRecord>>,
    availability: Availability,
}

impl MemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

impl FavoritesStore for MemoryFavoritesStore {
    async fn get_all(&self) -> Result<Vec<PlantRecord>, StoreError> {
        self.availability.check()?;
        Ok(lock(&self.plants).clone())
    }

    async fn add(&self, plant: &PlantRecord) -> Result<bool, StoreError> {
        self.availability.check()?;
        let mut plants = lock(&self.plants);
        if !plants.iter().any(|p| p.name == plant.name) {
            plants.push(plant.clone());
        }
        Ok(true)
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        self.availability.check()?;
        let mut plants = lock(&self.plants);
        let before = plants.len();
        plants.retain(|p| p.name != name);
        Ok(plants.len() != before)
    }

    async fn contains(&self, name: &str) -> Result<bool, StoreError> {
        self.availability.check()?;
        Ok(lock(&self.plants).iter().any(|p| p.name == name))
    }
}

#[derive(Debug, Default)]
pub struct MemoryLogbookStore {
    logbooks: Mutex<HashMap<String, Logbook>>,
    last_selected: Mutex<Option<String>>,
    availability: Availability,
}

impl MemoryLogbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, bypassing validation
    pub fn with_logbooks(logbooks: impl IntoIterator<Item = Logbook>) -> Self {
        let store = Self::default();
        {
            let mut map = lock(&store.logbooks);
            for logbook in logbooks {
                map.insert(logbook.id.clone(), logbook);
            }
        }
        store
    }

    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

impl LogbookStore for MemoryLogbookStore {
    async fn get_all(&self) -> Result<Vec<Logbook>, StoreError> {
        self.availability.check()?;
        let mut logbooks: Vec<Logbook> = lock(&self.logbooks)
            .values()
            .map(recompute_average)
            .collect();
        sort_newest_first(&mut logbooks);
        Ok(logbooks)
    }

    async fn save(&self, logbook: &Logbook) -> Result<(), StoreError> {
        self.availability.check()?;
        validate_logbook(logbook)?;
        lock(&self.logbooks).insert(logbook.id.clone(), logbook.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.availability.check()?;
        Ok(lock(&self.logbooks).remove(id).is_some())
    }

    async fn get_last_selected_id(&self) -> Result<Option<String>, StoreError> {
        self.availability.check()?;
        Ok(lock(&self.last_selected).clone())
    }

    async fn set_last_selected_id(&self, id: Option<&str>) -> Result<(), StoreError> {
        self.availability.check()?;
        *lock(&self.last_selected) = id.map(str::to_string);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferencesStore {
    direct_filters: Mutex<Option<FilterSet>>,
    availability: Availability,
}

impl MemoryPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

impl PreferencesStore for MemoryPreferencesStore {
    async fn load_direct_filters(&self) -> Result<Option<FilterSet>, StoreError> {
        self.availability.check()?;
        Ok(lock(&self.direct_filters).clone())
    }

    async fn save_direct_filters(&self, filters: &FilterSet) -> Result<(), StoreError> {
        self.availability.check()?;
        validate_filter_set(filters)?;
        *lock(&self.direct_filters) = Some(filters.clone());
        Ok(())
    }

    async fn clear_direct_filters(&self) -> Result<(), StoreError> {
        self.availability.check()?;
        *lock(&self.direct_filters) = None;
        Ok(())
    }
}
