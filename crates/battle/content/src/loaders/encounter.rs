//! Encounter roster loader.
//!
//! An encounter file describes both teams and the seed. Building it produces
//! a ready-to-start [`Battle`] with every member's skills bound.

use std::collections::BTreeSet;
use std::path::Path;

use battle_core::{
    Battle, BattleConfig, Combatant, CombatantId, CombatantKind, DiagnosticSink, Element,
    PlayerId, Team,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One combatant as written in an encounter file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub id: u32,
    pub name: String,
    pub kind: CombatantKind,
    #[serde(default)]
    pub owner: Option<u64>,
    pub max_hp: Decimal,
    /// Starting health; full when absent.
    #[serde(default)]
    pub hp: Option<Decimal>,
    #[serde(default)]
    pub damage: Decimal,
    #[serde(default)]
    pub armor: Decimal,
    #[serde(default)]
    pub luck: Decimal,
    #[serde(default)]
    pub shield: Decimal,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub class_bonus: Option<Decimal>,
    #[serde(default)]
    pub lifesteal: Option<Decimal>,
    #[serde(default)]
    pub damage_reflection: Option<Decimal>,
    #[serde(default)]
    pub cheat_death: Option<Decimal>,
    /// Catalog names, bound when the battle is built.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CombatantSpec {
    /// Builds the combatant without skills.
    pub fn build(&self) -> Combatant {
        let mut combatant = match (self.kind, self.owner) {
            (CombatantKind::Player, owner) => Combatant::player(
                CombatantId(self.id),
                &self.name,
                PlayerId(owner.unwrap_or(u64::from(self.id))),
                self.max_hp,
            ),
            (CombatantKind::Pet, Some(owner)) => {
                Combatant::pet(CombatantId(self.id), &self.name, PlayerId(owner), self.max_hp)
            }
            (CombatantKind::Pet, None) | (CombatantKind::Monster, _) => {
                let mut combatant =
                    Combatant::monster(CombatantId(self.id), &self.name, self.max_hp);
                combatant.kind = self.kind;
                combatant
            }
        }
        .with_damage(self.damage)
        .with_armor(self.armor)
        .with_luck(self.luck)
        .with_shield(self.shield)
        .with_element(self.element);

        if let Some(hp) = self.hp {
            combatant = combatant.with_hp(hp);
        }
        if let Some(bonus) = self.class_bonus {
            combatant = combatant.with_class_bonus(bonus);
        }
        if let Some(ratio) = self.lifesteal {
            combatant = combatant.with_lifesteal(ratio);
        }
        if let Some(ratio) = self.damage_reflection {
            combatant = combatant.with_damage_reflection(ratio);
        }
        if let Some(chance) = self.cheat_death {
            combatant = combatant.with_cheat_death(chance);
        }
        combatant
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub members: Vec<CombatantSpec>,
}

impl TeamSpec {
    pub fn build(&self) -> Team {
        self.members
            .iter()
            .fold(Team::new(&self.name), |team, member| team.with_member(member.build()))
    }
}

/// Encounter structure for RON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSpec {
    pub seed: u64,
    pub challengers: TeamSpec,
    pub opponents: TeamSpec,
}

impl EncounterSpec {
    /// Checks roster sizes and id uniqueness.
    pub fn validate(&self) -> LoadResult<()> {
        let mut seen = BTreeSet::new();
        for team in [&self.challengers, &self.opponents] {
            if team.members.is_empty() {
                anyhow::bail!("Team '{}' has no members", team.name);
            }
            if team.members.len() > BattleConfig::MAX_TEAM_SIZE {
                anyhow::bail!(
                    "Team '{}' has {} members (max {})",
                    team.name,
                    team.members.len(),
                    BattleConfig::MAX_TEAM_SIZE
                );
            }
            for member in &team.members {
                if !seen.insert(member.id) {
                    anyhow::bail!("Duplicate combatant id {} ({})", member.id, member.name);
                }
            }
        }
        Ok(())
    }

    /// Builds the battle and binds every member's skills. Unknown skill names
    /// are reported to `sink` and skipped.
    pub fn build(
        &self,
        config: BattleConfig,
        sink: &mut dyn DiagnosticSink,
    ) -> LoadResult<Battle> {
        self.validate()?;

        let mut battle = Battle::new(
            self.challengers.build(),
            self.opponents.build(),
            config,
            self.seed,
        );
        for member in self.challengers.members.iter().chain(&self.opponents.members) {
            if member.skills.is_empty() || battle.combatant(CombatantId(member.id)).is_none() {
                continue;
            }
            battle
                .bind_skills(CombatantId(member.id), &member.skills, sink)
                .map_err(|e| anyhow::anyhow!("Failed to bind skills for {}: {}", member.name, e))?;
        }

        Ok(battle)
    }
}

/// Loader for encounter rosters from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    pub fn load(path: &Path) -> LoadResult<EncounterSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// The sample encounter shipped with this crate.
    pub fn sample() -> LoadResult<EncounterSpec> {
        Self::parse(crate::SAMPLE_ENCOUNTER_RON)
    }

    pub fn parse(content: &str) -> LoadResult<EncounterSpec> {
        let spec: EncounterSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{NullSink, SkillId, VecSink};

    use super::*;

    #[test]
    fn sample_encounter_builds_with_bound_skills() {
        let spec = EncounterLoader::sample().unwrap();
        let mut sink = VecSink::new();
        let battle = spec.build(BattleConfig::default(), &mut sink).unwrap();

        let aria = battle.combatant(CombatantId(1)).unwrap();
        assert!(aria.is_player());
        assert!(aria.skills.contains_key(&SkillId::HolyStrike));
        assert_eq!(aria.class_bonus, Some(Decimal::new(11, 1)));
        assert_eq!(battle.opponents().len(), 2);
        assert_eq!(sink.warnings().count(), 0);
    }

    #[test]
    fn benched_pets_skip_skill_binding() {
        let spec = EncounterLoader::sample().unwrap();
        let config = BattleConfig {
            allow_pets: false,
            ..BattleConfig::default()
        };
        let battle = spec.build(config, &mut NullSink).unwrap();
        assert!(battle.combatant(CombatantId(2)).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut spec = EncounterLoader::sample().unwrap();
        spec.opponents.members[0].id = 1;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate combatant id 1"));
    }
}
