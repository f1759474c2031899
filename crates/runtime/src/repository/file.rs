//! File-based CheckpointRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{RepositoryError, Result};
use super::traits::{CheckpointRecord, CheckpointRepository};

/// File-based implementation of CheckpointRepository.
///
/// Layout:
/// ```text
/// <base_dir>/<encounter_id>/checkpoint_000001.json
/// <base_dir>/<encounter_id>/checkpoint_000002.json
/// ```
///
/// Each record is written to a temp file and renamed into place, so readers
/// never observe a half-written checkpoint.
pub struct FileCheckpointRepository {
    base_dir: PathBuf,
}

impl FileCheckpointRepository {
    /// Create a new file-based checkpoint repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn encounter_dir(&self, encounter_id: &str) -> Result<PathBuf> {
        let valid = !encounter_id.is_empty()
            && encounter_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RepositoryError::InvalidEncounterId(encounter_id.to_string()));
        }
        Ok(self.base_dir.join(encounter_id))
    }

    fn record_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && filename.starts_with("checkpoint_")
                && filename.ends_with(".json")
            {
                paths.push(path);
            }
        }

        // Zero-padded sequence numbers sort lexically.
        paths.sort();
        Ok(paths)
    }

    fn read_record(path: &Path) -> Result<CheckpointRecord> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| RepositoryError::Json(e.to_string()))
    }
}

impl CheckpointRepository for FileCheckpointRepository {
    fn save(&self, record: &CheckpointRecord) -> Result<()> {
        let dir = self.encounter_dir(&record.encounter_id)?;
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("checkpoint_{:06}.json", record.sequence));
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved checkpoint: {}", path.display());

        Ok(())
    }

    fn latest(&self, encounter_id: &str) -> Result<Option<CheckpointRecord>> {
        let dir = self.encounter_dir(encounter_id)?;
        match Self::record_paths(&dir)?.last() {
            Some(path) => Ok(Some(Self::read_record(path)?)),
            None => Ok(None),
        }
    }

    fn history(&self, encounter_id: &str) -> Result<Vec<CheckpointRecord>> {
        let dir = self.encounter_dir(encounter_id)?;
        Self::record_paths(&dir)?
            .iter()
            .map(|path| Self::read_record(path))
            .collect()
    }

    fn delete(&self, encounter_id: &str) -> Result<()> {
        let dir = self.encounter_dir(encounter_id)?;

        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            tracing::info!("Deleted checkpoints: {}", dir.display());
        }

        Ok(())
    }

    fn list_encounters(&self) -> Result<Vec<String>> {
        let mut encounters = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.is_dir()
                && let Some(name) = path.file_name().and_then(|s| s.to_str())
            {
                encounters.push(name.to_string());
            }
        }

        encounters.sort();
        Ok(encounters)
    }
}
