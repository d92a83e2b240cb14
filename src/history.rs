use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::light::LightLevel;
use crate::matching::MatchedPlant;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Label recorded for runs that did not come from a logbook
pub const SINGLE_MEASUREMENT_LABEL: &str = "Single Measurement";

/// One successful recommendation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub lux: u32,
    pub light_level: LightLevel,
    pub plants: Vec<MatchedPlant>,
    pub timestamp: String,
    pub logbook_name: String,
}

/// Newest-first run history, bounded to `capacity` entries
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a run, evicting the oldest entry once full
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
