//! Owner of the user's logbooks.
//!
//! Every mutation updates the in-memory list first and then writes through to
//! the [`LogbookStore`]. A failed write is logged and reported through
//! [`Persisted::persisted`]; the local state is kept either way.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{LogbookError, StoreError};
use crate::filters::FilterSet;
use crate::id_generator::IdGenerator;
use crate::logbook::{self, default_title, Logbook, TimeOfDayCounts};
use crate::store::LogbookStore;
use crate::time::Clock;
use crate::validators::{validate_filter_set, validate_logbook_title};

/// Result of a mutation plus whether the store accepted it
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<T> {
    pub value: T,
    pub persisted: bool,
}

pub struct LogbookService<S: LogbookStore> {
    store: S,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    /// Newest first
    logbooks: Vec<Logbook>,
    selected_id: Option<String>,
}

impl<S: LogbookStore> LogbookService<S> {
    /// Load all logbooks and restore the previous selection
    ///
    /// A remembered id that no longer exists is cleared. Without a usable
    /// remembered id the newest logbook is selected and remembered. When the
    /// logbooks or the selection cannot be read, nothing is written back.
    pub async fn load(store: S, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let loaded = match store.get_all().await {
            Ok(logbooks) => Some(logbooks),
            Err(e) => {
                warn!(error = %e, code = e.code(), "Failed to load logbooks");
                None
            }
        };

        let (remembered, selection_read) = match store.get_last_selected_id().await {
            Ok(id) => (id, true),
            Err(e) => {
                warn!(error = %e, code = e.code(), "Failed to load last selected logbook");
                (None, false)
            }
        };

        let Some(logbooks) = loaded else {
            return Self {
                store,
                clock,
                ids,
                logbooks: Vec::new(),
                selected_id: remembered,
            };
        };

        let mut service = Self {
            store,
            clock,
            ids,
            logbooks,
            selected_id: None,
        };

        match remembered {
            Some(id) if service.get(&id).is_some() => service.selected_id = Some(id),
            stale => {
                if let Some(id) = stale {
                    info!(logbook_id = %id, "Clearing stale logbook selection");
                    service.persist_selection(None).await;
                }
                if let Some(newest) = service.logbooks.first().map(|l| l.id.clone()) {
                    service.selected_id = Some(newest.clone());
                    // An unreadable selection is not overwritten
                    if selection_read {
                        service.persist_selection(Some(&newest)).await;
                    }
                }
            }
        }

        info!(
            logbooks = service.logbooks.len(),
            selected = ?service.selected_id,
            "Logbooks loaded"
        );
        service
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn logbooks(&self) -> &[Logbook] {
        &self.logbooks
    }

    pub fn get(&self, id: &str) -> Option<&Logbook> {
        self.logbooks.iter().find(|l| l.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Logbook> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    /// Time-of-day counts for the selected logbook, zero when none is selected
    pub fn slot_counts(&self) -> TimeOfDayCounts {
        self.selected()
            .map(Logbook::time_of_day_counts)
            .unwrap_or_default()
    }

    pub async fn select(&mut self, id: &str) -> Result<Persisted<()>, LogbookError> {
        if self.get(id).is_none() {
            return Err(LogbookError::NotFound(id.to_string()));
        }

        self.selected_id = Some(id.to_string());
        let persisted = self.persist_selection(Some(id)).await;
        Ok(Persisted {
            value: (),
            persisted,
        })
    }

    /// Create an empty logbook and select it
    ///
    /// A blank title becomes "Logbook {n+1}" where n is the current count.
    pub async fn create_logbook(&mut self, title: &str) -> Result<Persisted<Logbook>, LogbookError> {
        let title = match title.trim() {
            "" => default_title(self.logbooks.len()),
            trimmed => trimmed.to_string(),
        };
        validate_logbook_title(&title)?;

        let created = Logbook::new(self.ids.new_id(), title, self.clock.now_rfc3339());
        self.logbooks.insert(0, created.clone());
        self.selected_id = Some(created.id.clone());

        let saved = self.persist(&created).await;
        let selected = self.persist_selection(Some(&created.id)).await;
        info!(logbook_id = %created.id, title = %created.title, "Logbook created");

        Ok(Persisted {
            value: created,
            persisted: saved && selected,
        })
    }

    /// Remove a logbook with all its measurements. Unknown ids are a no-op.
    pub async fn delete_logbook(&mut self, id: &str) -> Persisted<bool> {
        let before = self.logbooks.len();
        self.logbooks.retain(|l| l.id != id);
        if self.logbooks.len() == before {
            return Persisted {
                value: false,
                persisted: true,
            };
        }

        let mut persisted = match self.store.delete(id).await {
            Ok(_) => true,
            Err(e) => {
                self.log_failure("delete", id, &e);
                false
            }
        };

        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
            persisted &= self.persist_selection(None).await;
        }

        info!(logbook_id = %id, "Logbook deleted");
        Persisted {
            value: true,
            persisted,
        }
    }

    /// Log a reading taken now
    pub async fn add_measurement(
        &mut self,
        id: &str,
        lux: u32,
    ) -> Result<Persisted<Logbook>, LogbookError> {
        let clock = Arc::clone(&self.clock);
        let updated = self.update(id, |current| logbook::add_measurement(current, lux, clock.as_ref()))?;

        info!(logbook_id = %id, lux, average = updated.average, "Measurement added");
        let persisted = self.persist(&updated).await;
        Ok(Persisted {
            value: updated,
            persisted,
        })
    }

    /// Remove a reading. An unknown timestamp is a no-op reporting `false`.
    pub async fn delete_measurement(
        &mut self,
        id: &str,
        timestamp: &str,
    ) -> Result<Persisted<bool>, LogbookError> {
        let current = self
            .get(id)
            .ok_or_else(|| LogbookError::NotFound(id.to_string()))?;

        let (updated, removed) = logbook::delete_measurement(current, timestamp);
        if !removed {
            return Ok(Persisted {
                value: false,
                persisted: true,
            });
        }

        self.replace(updated.clone());
        let persisted = self.persist(&updated).await;
        Ok(Persisted {
            value: true,
            persisted,
        })
    }

    /// Replace a logbook's plant profile after validating it
    pub async fn update_preferences(
        &mut self,
        id: &str,
        filters: FilterSet,
    ) -> Result<Persisted<Logbook>, LogbookError> {
        validate_filter_set(&filters)?;

        let updated = self.update(id, |current| Logbook {
            plant_profile: filters,
            ..current.clone()
        })?;

        let persisted = self.persist(&updated).await;
        Ok(Persisted {
            value: updated,
            persisted,
        })
    }

    fn update<F>(&mut self, id: &str, change: F) -> Result<Logbook, LogbookError>
    where
        F: FnOnce(&Logbook) -> Logbook,
    {
        let current = self
            .get(id)
            .ok_or_else(|| LogbookError::NotFound(id.to_string()))?;

        let updated = change(current);
        self.replace(updated.clone());
        Ok(updated)
    }

    fn replace(&mut self, updated: Logbook) {
        if let Some(slot) = self.logbooks.iter_mut().find(|l| l.id == updated.id) {
            *slot = updated;
        }
    }

    async fn persist(&self, logbook: &Logbook) -> bool {
        match self.store.save(logbook).await {
            Ok(()) => true,
            Err(e) => {
                self.log_failure("save", &logbook.id, &e);
                false
            }
        }
    }

    async fn persist_selection(&self, id: Option<&str>) -> bool {
        match self.store.set_last_selected_id(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, code = e.code(), "Failed to store logbook selection");
                false
            }
        }
    }

    fn log_failure(&self, operation: &str, id: &str, error: &StoreError) {
        warn!(
            operation,
            logbook_id = %id,
            error = %error,
            code = error.code(),
            "Logbook store write failed; keeping local state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::FixedIdGenerator;
    use crate::store::MemoryLogbookStore;
    use crate::time::FixedClock;

    async fn service(store: MemoryLogbookStore) -> LogbookService<MemoryLogbookStore> {
        let clock = FixedClock::from_rfc3339("2024-01-15T09:00:00+00:00").unwrap();
        LogbookService::load(
            store,
            Arc::new(clock),
            Arc::new(FixedIdGenerator::sequential("logbook")),
        )
        .await
    }

    #[tokio::test]
    async fn test_create_with_blank_title() {
        let mut service = service(MemoryLogbookStore::new()).await;

        let first = service.create_logbook("   ").await.unwrap();
        assert_eq!(first.value.title, "Logbook 1");
        assert!(first.persisted);

        let second = service.create_logbook("  Hallway ").await.unwrap();
        assert_eq!(second.value.title, "Hallway");
        assert_eq!(service.selected_id(), Some("logbook-2"));
        assert_eq!(service.logbooks()[0].id, "logbook-2");
    }

    #[tokio::test]
    async fn test_measurement_flow() {
        let mut service = service(MemoryLogbookStore::new()).await;
        let id = service.create_logbook("Kitchen").await.unwrap().value.id;

        service.add_measurement(&id, 1000).await.unwrap();
        let updated = service.add_measurement(&id, 3000).await.unwrap().value;
        assert_eq!(updated.average, 2000);

        let ts = updated.measurements[1].timestamp.clone();
        assert!(service.delete_measurement(&id, &ts).await.unwrap().value);
        assert!(!service.delete_measurement(&id, &ts).await.unwrap().value);

        let stored = service.store().get_all().await.unwrap();
        assert_eq!(stored[0].average, 1000);
    }

    #[tokio::test]
    async fn test_unknown_logbook_is_not_found() {
        let mut service = service(MemoryLogbookStore::new()).await;

        let err = service.add_measurement("missing", 10).await.unwrap_err();
        assert!(matches!(err, LogbookError::NotFound(_)));
        assert!(service.select("missing").await.is_err());
        assert!(!service.delete_logbook("missing").await.value);
    }

    #[tokio::test]
    async fn test_offline_store_keeps_local_state() {
        let mut service = service(MemoryLogbookStore::new()).await;
        let id = service.create_logbook("Kitchen").await.unwrap().value.id;

        service.store().set_offline(true);
        let result = service.add_measurement(&id, 800).await.unwrap();

        assert!(!result.persisted);
        assert_eq!(service.get(&id).unwrap().average, 800);
    }

    #[tokio::test]
    async fn test_update_preferences_validates() {
        let mut service = service(MemoryLogbookStore::new()).await;
        let id = service.create_logbook("Kitchen").await.unwrap().value.id;

        let bad = FilterSet {
            looks: "sparkly".to_string(),
            ..FilterSet::default()
        };
        assert!(matches!(
            service.update_preferences(&id, bad).await,
            Err(LogbookError::Validation(_))
        ));

        let good = FilterSet {
            looks: "flowery".to_string(),
            ..FilterSet::default()
        };
        let updated = service.update_preferences(&id, good).await.unwrap();
        assert_eq!(updated.value.plant_profile.looks, "flowery");
    }

    #[tokio::test]
    async fn test_delete_selected_clears_selection() {
        let mut service = service(MemoryLogbookStore::new()).await;
        let id = service.create_logbook("Kitchen").await.unwrap().value.id;

        let result = service.delete_logbook(&id).await;
        assert!(result.value);
        assert!(result.persisted);
        assert_eq!(service.selected_id(), None);
        assert_eq!(service.store().get_last_selected_id().await.unwrap(), None);
        assert_eq!(service.slot_counts(), TimeOfDayCounts::default());
    }
}
