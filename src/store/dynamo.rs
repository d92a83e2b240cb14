//! DynamoDB-backed stores built on the functions in [`crate::repo`].

use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::sync::Arc;

use super::{sort_newest_first, FavoritesStore, LogbookStore, PreferencesStore};
use crate::catalog::PlantRecord;
use crate::config::Config;
use crate::error::{DatabaseError, StoreError};
use crate::filters::FilterSet;
use crate::logbook::{recompute_average, Logbook};
use crate::repo::settings::{DIRECT_FILTERS_KEY, LAST_SELECTED_LOGBOOK_KEY};
use crate::repo::{favorites, logbooks, settings};
use crate::time::Clock;
use crate::validators::{validate_filter_set, validate_logbook};

#[derive(Clone)]
pub struct DynamoFavoritesStore {
    client: DynamoDbClient,
    table_name: String,
    clock: Arc<dyn Clock>,
}

impl DynamoFavoritesStore {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: config.dynamodb_client.clone(),
            table_name: config.favorites_table.clone(),
            clock,
        }
    }
}

impl FavoritesStore for DynamoFavoritesStore {
    async fn get_all(&self) -> Result<Vec<PlantRecord>, StoreError> {
        Ok(favorites::list_favorites(&self.client, &self.table_name).await?)
    }

    async fn add(&self, plant: &PlantRecord) -> Result<bool, StoreError> {
        // A conditional-check failure means it was already there
        favorites::put_favorite_if_absent(
            &self.client,
            &self.table_name,
            plant,
            &self.clock.now_rfc3339(),
        )
        .await?;
        Ok(true)
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        Ok(favorites::delete_favorite(&self.client, &self.table_name, name).await?)
    }

    async fn contains(&self, name: &str) -> Result<bool, StoreError> {
        let found = favorites::get_favorite(&self.client, &self.table_name, name).await?;
        Ok(found.is_some())
    }
}

/// Logbooks in one table, the last selection in the settings table
#[derive(Clone)]
pub struct DynamoLogbookStore {
    client: DynamoDbClient,
    logbooks_table: String,
    settings_table: String,
    clock: Arc<dyn Clock>,
}

impl DynamoLogbookStore {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: config.dynamodb_client.clone(),
            logbooks_table: config.logbooks_table.clone(),
            settings_table: config.settings_table.clone(),
            clock,
        }
    }
}

impl LogbookStore for DynamoLogbookStore {
    async fn get_all(&self) -> Result<Vec<Logbook>, StoreError> {
        let mut all: Vec<Logbook> = logbooks::list_logbooks(&self.client, &self.logbooks_table)
            .await?
            .iter()
            .map(recompute_average)
            .collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn save(&self, logbook: &Logbook) -> Result<(), StoreError> {
        validate_logbook(logbook)?;
        logbooks::put_logbook(&self.client, &self.logbooks_table, logbook).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(logbooks::delete_logbook(&self.client, &self.logbooks_table, id).await?)
    }

    async fn get_last_selected_id(&self) -> Result<Option<String>, StoreError> {
        Ok(
            settings::get_setting(&self.client, &self.settings_table, LAST_SELECTED_LOGBOOK_KEY)
                .await?,
        )
    }

    async fn set_last_selected_id(&self, id: Option<&str>) -> Result<(), StoreError> {
        match id {
            Some(id) => {
                settings::put_setting(
                    &self.client,
                    &self.settings_table,
                    LAST_SELECTED_LOGBOOK_KEY,
                    id,
                    &self.clock.now_rfc3339(),
                )
                .await?
            }
            None => {
                settings::delete_setting(
                    &self.client,
                    &self.settings_table,
                    LAST_SELECTED_LOGBOOK_KEY,
                )
                .await?
            }
        }
        Ok(())
    }
}

/// Direct-mode filters stored as a JSON string in the settings table
#[derive(Clone)]
pub struct DynamoPreferencesStore {
    client: DynamoDbClient,
    settings_table: String,
    clock: Arc<dyn Clock>,
}

impl DynamoPreferencesStore {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: config.dynamodb_client.clone(),
            settings_table: config.settings_table.clone(),
            clock,
        }
    }
}

impl PreferencesStore for DynamoPreferencesStore {
    async fn load_direct_filters(&self) -> Result<Option<FilterSet>, StoreError> {
        let raw =
            settings::get_setting(&self.client, &self.settings_table, DIRECT_FILTERS_KEY).await?;

        match raw {
            Some(json) => {
                let filters = serde_json::from_str(&json).map_err(DatabaseError::from)?;
                Ok(Some(filters))
            }
            None => Ok(None),
        }
    }

    async fn save_direct_filters(&self, filters: &FilterSet) -> Result<(), StoreError> {
        validate_filter_set(filters)?;
        let json = serde_json::to_string(filters).map_err(DatabaseError::from)?;

        settings::put_setting(
            &self.client,
            &self.settings_table,
            DIRECT_FILTERS_KEY,
            &json,
            &self.clock.now_rfc3339(),
        )
        .await?;
        Ok(())
    }

    async fn clear_direct_filters(&self) -> Result<(), StoreError> {
        settings::delete_setting(&self.client, &self.settings_table, DIRECT_FILTERS_KEY).await?;
        Ok(())
    }
}
