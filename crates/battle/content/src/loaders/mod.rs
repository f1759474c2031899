//! Content loaders for reading battle data from files or embedded strings.

pub mod catalog;
pub mod config;
pub mod encounter;

pub use catalog::{CatalogGroup, CatalogLoader, SkillCatalog};
pub use config::ConfigLoader;
pub use encounter::{CombatantSpec, EncounterLoader, EncounterSpec, TeamSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
