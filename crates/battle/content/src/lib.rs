//! Data-driven battle content and loaders.
//!
//! This crate ships the static data the engine is configured with and the
//! loaders that turn it into `battle-core` types:
//! - Skill catalog (RON): every skill name a combatant can earn, by element
//! - Battle rules (TOML): [`battle_core::BattleConfig`]
//! - Encounters (RON): rosters for headless simulation and tests
//!
//! The shipped files are embedded at compile time so tools and tests work
//! without a data directory.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogGroup, CatalogLoader, CombatantSpec, ConfigLoader, EncounterLoader, EncounterSpec,
    LoadResult, SkillCatalog, TeamSpec,
};

/// Shipped skill catalog.
pub const SKILL_CATALOG_RON: &str = include_str!("../data/skill_catalog.ron");

/// Shipped default battle rules.
pub const BATTLE_CONFIG_TOML: &str = include_str!("../data/battle.toml");

/// Sample encounter.
pub const SAMPLE_ENCOUNTER_RON: &str = include_str!("../data/encounter.ron");
