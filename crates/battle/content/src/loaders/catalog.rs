//! Skill catalog loader.

use std::path::Path;

use battle_core::{AuditReport, Element, SKILL_TABLE_VERSION, audit_catalog};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Skills granted by one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub element: Element,
    pub skills: Vec<String>,
}

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCatalog {
    /// Must match [`SKILL_TABLE_VERSION`].
    pub version: u32,
    pub groups: Vec<CatalogGroup>,
}

impl SkillCatalog {
    /// Every advertised name, in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|group| group.skills.iter().map(String::as_str))
    }

    /// Element that grants `name`, matched case-insensitively.
    pub fn element_of(&self, name: &str) -> Option<Element> {
        let name = name.trim();
        self.groups
            .iter()
            .find(|group| group.skills.iter().any(|skill| skill.eq_ignore_ascii_case(name)))
            .map(|group| group.element)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.skills.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the completeness audit against the engine's skill table.
    pub fn audit(&self) -> AuditReport {
        let names: Vec<&str> = self.names().collect();
        audit_catalog(&names)
    }
}

/// Loader for the skill catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<SkillCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// The catalog shipped with this crate.
    pub fn embedded() -> LoadResult<SkillCatalog> {
        Self::parse(crate::SKILL_CATALOG_RON)
    }

    /// Parse catalog RON and check it was written for the current skill table.
    pub fn parse(content: &str) -> LoadResult<SkillCatalog> {
        let catalog: SkillCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;

        if catalog.version != SKILL_TABLE_VERSION {
            anyhow::bail!(
                "Skill catalog version {} does not match skill table version {}",
                catalog.version,
                SKILL_TABLE_VERSION
            );
        }

        Ok(catalog)
    }
}
