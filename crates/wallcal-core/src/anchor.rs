//! Persistent spatial-anchor store interface.
//!
//! Stores completed calibrations under a caller-supplied storage identifier
//! so a later session can restore the pose without re-collecting markers.
//! Real backends live outside this crate.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::similarity::CompletionPayload;

/// A saved calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub payload: CompletionPayload,
    pub saved_at: DateTime<Utc>,
}

impl CalibrationRecord {
    pub fn new(payload: CompletionPayload) -> Self {
        Self {
            payload,
            saved_at: Utc::now(),
        }
    }
}

/// Trait for calibration storage backends.
pub trait AnchorStore {
    /// Save or replace the record for `storage_id`.
    fn save(&mut self, storage_id: &str, record: &CalibrationRecord) -> Result<()>;

    /// Look up the record for `storage_id`.
    fn load(&self, storage_id: &str) -> Result<Option<CalibrationRecord>>;

    /// Remove the record for `storage_id`, returning whether one existed.
    fn remove(&mut self, storage_id: &str) -> Result<bool>;
}

/// Process-local store, for tests and hosts without persistence
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnchorStore {
    records: HashMap<String, CalibrationRecord>,
}

impl InMemoryAnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AnchorStore for InMemoryAnchorStore {
    fn save(&mut self, storage_id: &str, record: &CalibrationRecord) -> Result<()> {
        self.records.insert(storage_id.to_string(), record.clone());
        Ok(())
    }

    fn load(&self, storage_id: &str) -> Result<Option<CalibrationRecord>> {
        Ok(self.records.get(storage_id).cloned())
    }

    fn remove(&mut self, storage_id: &str) -> Result<bool> {
        Ok(self.records.remove(storage_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SimilarityTransform;

    #[test]
    fn test_save_load_remove() {
        let mut store = InMemoryAnchorStore::new();
        let record = CalibrationRecord::new(CompletionPayload::from(&SimilarityTransform::identity()));

        store.save("gym-wall-a", &record).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("gym-wall-a").unwrap(), Some(record));
        assert_eq!(store.load("gym-wall-b").unwrap(), None);

        assert!(store.remove("gym-wall-a").unwrap());
        assert!(!store.remove("gym-wall-a").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_serializes() {
        let record = CalibrationRecord::new(CompletionPayload::from(&SimilarityTransform::identity()));
        let json = serde_json::to_string(&record).unwrap();
        let back: CalibrationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
