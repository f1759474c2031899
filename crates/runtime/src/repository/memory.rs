//! In-memory checkpoint repository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{RepositoryError, Result};
use super::traits::{CheckpointRecord, CheckpointRepository};

/// In-memory checkpoint repository for tests and single-process hosts.
///
/// One lock guards every encounter's history. Thread-safe but not persistent
/// across process restarts.
pub struct InMemoryCheckpointRepository {
    records: RwLock<HashMap<String, Vec<CheckpointRecord>>>,
}

impl InMemoryCheckpointRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCheckpointRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointRepository for InMemoryCheckpointRepository {
    fn save(&self, record: &CheckpointRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        records
            .entry(record.encounter_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn latest(&self, encounter_id: &str) -> Result<Option<CheckpointRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(records
            .get(encounter_id)
            .and_then(|history| history.last().cloned()))
    }

    fn history(&self, encounter_id: &str) -> Result<Vec<CheckpointRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(records.get(encounter_id).cloned().unwrap_or_default())
    }

    fn delete(&self, encounter_id: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        records.remove(encounter_id);
        Ok(())
    }

    fn list_encounters(&self) -> Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut ids: Vec<String> = records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
