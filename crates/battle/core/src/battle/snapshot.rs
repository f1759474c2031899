//! Checkpoint snapshots and the store they are handed to.
//!
//! The battle saves a snapshot when it starts and on every terminal
//! transition. How snapshots are stored is up to the [`CheckpointStore`].

use rust_decimal::Decimal;

use super::{BattleResult, OpponentTransition};
use crate::combatant::{Combatant, CombatantId, CombatantKind, Team};
use crate::skills::SkillId;

/// Point-in-time view of one combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub kind: CombatantKind,
    pub hp: Decimal,
    pub max_hp: Decimal,
    pub shield: Decimal,
    pub effects: Vec<String>,
    /// `(skill, cooldown_remaining)` in id order.
    pub skills: Vec<(SkillId, u32)>,
}

impl From<&Combatant> for CombatantSnapshot {
    fn from(combatant: &Combatant) -> Self {
        Self {
            id: combatant.id,
            name: combatant.name.clone(),
            kind: combatant.kind,
            hp: combatant.hp(),
            max_hp: combatant.max_hp(),
            shield: combatant.shield,
            effects: combatant
                .status_effects()
                .map(|effect| effect.core().name.clone())
                .collect(),
            skills: combatant
                .skills
                .iter()
                .map(|(id, state)| (*id, state.cooldown_remaining))
                .collect(),
        }
    }
}

/// Point-in-time view of a whole battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSnapshot {
    pub seed: u64,
    pub rng_draws: u64,
    pub ticks: u64,
    pub phase: String,
    pub result: Option<BattleResult>,
    pub active_opponent: Option<CombatantId>,
    pub transition: OpponentTransition,
    pub log_len: u64,
    pub challengers: Vec<CombatantSnapshot>,
    pub opponents: Vec<CombatantSnapshot>,
}

impl BattleSnapshot {
    pub(crate) fn team(team: &Team) -> Vec<CombatantSnapshot> {
        team.members.iter().map(CombatantSnapshot::from).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode checkpoint: {0}")]
    Encode(String),
}

/// Persistence collaborator for battle checkpoints.
pub trait CheckpointStore {
    fn save(&mut self, snapshot: &BattleSnapshot) -> Result<(), CheckpointError>;
}

/// Store that accepts and discards every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStore;

impl CheckpointStore for NoopStore {
    fn save(&mut self, _snapshot: &BattleSnapshot) -> Result<(), CheckpointError> {
        Ok(())
    }
}

impl CheckpointStore for Vec<BattleSnapshot> {
    fn save(&mut self, snapshot: &BattleSnapshot) -> Result<(), CheckpointError> {
        self.push(snapshot.clone());
        Ok(())
    }
}
