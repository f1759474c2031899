//! Deterministic turn-based combat resolution.
//!
//! `battle-core` defines the canonical combat rules (combatants, teams,
//! elements, status effects, skills, and the battle state machine) and exposes
//! pure APIs that are reused by the runtime, the content crate, and offline
//! tools. All encounter mutation flows through [`battle::Battle`]; supporting
//! crates depend on the types re-exported here.
//!
//! The crate performs no I/O. Persistence and diagnostics are collaborators
//! passed in by the caller through [`BattleEnv`].
pub mod battle;
pub mod combat;
pub mod combatant;
pub mod config;
pub mod diagnostics;
pub mod element;
pub mod error;
pub mod rng;
pub mod skills;
pub mod status;

pub use battle::{
    AbortReason, Battle, BattleEnv, BattleLog, BattlePhase, BattleResult, BattleSnapshot,
    CheckpointError, CheckpointStore, CombatantSnapshot, LogEntry, NoopStore, OpponentTransition,
    Outcome, Side,
};
pub use combat::{AttackOutcome, AttackReport, DamageBreakdown, ResolveContext, resolve_attack};
pub use combatant::{
    ActionFlags, CheatDeath, Combatant, CombatantId, CombatantKind, DefeatPolicy, PlayerId,
    StatKind, Team, TransientState,
};
pub use config::{BattleConfig, ToggleValue};
pub use diagnostics::{DiagnosticLevel, DiagnosticSink, NullSink, VecSink};
pub use element::{Element, elemental_modifier};
pub use error::{BattleError, CombatError, ErrorSeverity};
pub use rng::{BattleRng, FixedRng, PcgRng, RngOracle};
pub use skills::{
    AuditReport, NON_COMBAT_SKILLS, ProcChance, SKILL_TABLE, SKILL_TABLE_VERSION, SkillBinding,
    SkillDefinition, SkillId, SkillOutcome, SkillResolver, SkillState, Trigger,
    apply_skill_effects, audit_catalog,
};
pub use status::{
    Control, DamageOverTime, EffectAttach, EffectContext, EffectCore, EffectParams,
    EffectRegistry, EffectTags, ModifierMode, Regeneration, RegisteredEffect, StackingWound,
    StatModifier, StatusEffect,
};
