//! Repository contract for battle checkpoints.

use battle_core::BattleSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;

/// One saved checkpoint of an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub encounter_id: String,
    /// 1 for the opening checkpoint, then increasing per save.
    pub sequence: u64,
    pub saved_at: DateTime<Utc>,
    pub snapshot: BattleSnapshot,
}

impl CheckpointRecord {
    pub fn new(encounter_id: impl Into<String>, sequence: u64, snapshot: BattleSnapshot) -> Self {
        Self {
            encounter_id: encounter_id.into(),
            sequence,
            saved_at: Utc::now(),
            snapshot,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.snapshot.result.is_some()
    }
}

/// Repository for checkpoint persistence.
///
/// Implementations keep every record of an encounter in save order; shared
/// instances serialize access internally.
pub trait CheckpointRepository: Send + Sync {
    /// Appends a record to its encounter's history.
    fn save(&self, record: &CheckpointRecord) -> Result<()>;

    /// Most recent record of an encounter.
    fn latest(&self, encounter_id: &str) -> Result<Option<CheckpointRecord>>;

    /// Every record of an encounter, oldest first.
    fn history(&self, encounter_id: &str) -> Result<Vec<CheckpointRecord>>;

    /// Removes an encounter's records.
    fn delete(&self, encounter_id: &str) -> Result<()>;

    /// Encounter ids with at least one record, sorted.
    fn list_encounters(&self) -> Result<Vec<String>>;
}
