//! Adapter from the core's checkpoint hook to a repository.

use std::sync::Arc;

use battle_core::{BattleSnapshot, CheckpointError, CheckpointStore};

use super::traits::{CheckpointRecord, CheckpointRepository};

/// [`CheckpointStore`] for one encounter, numbering records as it saves them.
pub struct RepositoryStore {
    repository: Arc<dyn CheckpointRepository>,
    encounter_id: String,
    sequence: u64,
}

impl RepositoryStore {
    pub fn new(repository: Arc<dyn CheckpointRepository>, encounter_id: impl Into<String>) -> Self {
        Self {
            repository,
            encounter_id: encounter_id.into(),
            sequence: 0,
        }
    }

    /// Records saved so far.
    pub fn saved(&self) -> u64 {
        self.sequence
    }
}

impl CheckpointStore for RepositoryStore {
    fn save(&mut self, snapshot: &BattleSnapshot) -> Result<(), CheckpointError> {
        let record = CheckpointRecord::new(&self.encounter_id, self.sequence + 1, snapshot.clone());
        self.repository
            .save(&record)
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?;
        self.sequence += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{Battle, BattleConfig, Combatant, CombatantId, Team};
    use rust_decimal::Decimal;

    use super::*;
    use crate::repository::{InMemoryCheckpointRepository, RepositoryError};

    struct Offline;

    impl CheckpointRepository for Offline {
        fn save(&self, _record: &CheckpointRecord) -> crate::repository::error::Result<()> {
            Err(RepositoryError::LockPoisoned)
        }

        fn latest(&self, _id: &str) -> crate::repository::error::Result<Option<CheckpointRecord>> {
            Ok(None)
        }

        fn history(&self, _id: &str) -> crate::repository::error::Result<Vec<CheckpointRecord>> {
            Ok(Vec::new())
        }

        fn delete(&self, _id: &str) -> crate::repository::error::Result<()> {
            Ok(())
        }

        fn list_encounters(&self) -> crate::repository::error::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn snapshot() -> BattleSnapshot {
        Battle::new(
            Team::new("a").with_member(Combatant::monster(CombatantId(1), "Imp", Decimal::TEN)),
            Team::new("b").with_member(Combatant::monster(CombatantId(2), "Imp", Decimal::TEN)),
            BattleConfig::default(),
            1,
        )
        .snapshot()
    }

    #[test]
    fn numbers_records_in_save_order() {
        let repository = Arc::new(InMemoryCheckpointRepository::new());
        let mut store = RepositoryStore::new(repository.clone(), "duel");
        store.save(&snapshot()).unwrap();
        store.save(&snapshot()).unwrap();

        let history = repository.history("duel").unwrap();
        assert_eq!(
            history.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(store.saved(), 2);
    }

    #[test]
    fn repository_failures_surface_as_unavailable() {
        let mut store = RepositoryStore::new(Arc::new(Offline), "duel");
        let err = store.save(&snapshot()).unwrap_err();
        assert!(matches!(err, CheckpointError::Unavailable(_)));
        assert_eq!(store.saved(), 0);
    }
}
