//! Completeness audit between the advertised skill catalog and the table.
//!
//! Three checks:
//!
//! - every catalog name resolves to a [`SkillId`], except
//!   [`crate::skills::NON_COMBAT_SKILLS`]
//! - every [`SkillId`] is reachable: it declares at least one trigger, and a
//!   forced proc in each declared trigger produces a visible effect
//! - every [`SkillId`] is advertised by the catalog

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use strum::IntoEnumIterator;

use super::{SkillId, SkillState, Trigger, is_non_combat};
use crate::combatant::{Combatant, CombatantId, PlayerId};
use crate::rng::BattleRng;
use crate::skills::SkillResolver;
use crate::status::EffectRegistry;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Catalog names with no table entry.
    pub unresolved: Vec<String>,
    /// Table entries with no live execution path.
    pub unreachable: Vec<(SkillId, Option<Trigger>)>,
    /// Table entries the catalog never mentions.
    pub unadvertised: Vec<SkillId>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.unreachable.is_empty() && self.unadvertised.is_empty()
    }

    pub fn problems(&self) -> usize {
        self.unresolved.len() + self.unreachable.len() + self.unadvertised.len()
    }
}

/// Audits `catalog` (display names as advertised to players) against the
/// skill table.
pub fn audit_catalog<S: AsRef<str>>(catalog: &[S]) -> AuditReport {
    let mut report = AuditReport::default();
    let mut advertised = BTreeSet::new();

    for name in catalog.iter().map(AsRef::as_ref) {
        if is_non_combat(name) {
            continue;
        }
        match SkillId::from_name(name) {
            Some(id) => {
                advertised.insert(id);
            }
            None => report.unresolved.push(name.to_string()),
        }
    }

    let registry = EffectRegistry::with_builtins();
    for id in SkillId::iter() {
        let triggers = id.triggers();
        if triggers.is_empty() {
            report.unreachable.push((id, None));
        }
        for trigger in triggers {
            if !has_visible_effect(id, *trigger, &registry) {
                report.unreachable.push((id, Some(*trigger)));
            }
        }
        if !advertised.contains(&id) {
            report.unadvertised.push(id);
        }
    }

    report
}

/// Forces `id` to proc in `trigger` and reports whether it did anything.
fn has_visible_effect(id: SkillId, trigger: Trigger, registry: &EffectRegistry) -> bool {
    let mut rng = BattleRng::fixed();
    let mut resolver = SkillResolver::new(&mut rng, registry);

    let mut owner = Combatant::pet(CombatantId(1), "Subject", PlayerId(0), Decimal::from(1_000))
        .with_damage(Decimal::from(100))
        .with_hp(Decimal::from(500));
    let mut state = SkillState::from_definition(id.definition());
    state.stacks = 1;
    owner.skills.insert(id, state);

    let mut other = Combatant::monster(CombatantId(2), "Dummy", Decimal::from(1_000))
        .with_damage(Decimal::from(100));

    let messages = match trigger {
        Trigger::OnAttack => {
            resolver
                .on_attack(&mut owner, &mut other, Decimal::from(100))
                .messages
        }
        Trigger::OnDamageTaken => {
            resolver
                .on_damage_taken(&mut owner, &mut other, Decimal::from(600))
                .messages
        }
        Trigger::OnLethalDamage => resolver.on_lethal_damage(&mut owner),
        Trigger::PerTurn => resolver.per_turn(&mut owner),
    };

    !messages.is_empty()
        && owner
            .skills
            .get(&id)
            .is_some_and(|s| s.cooldown_remaining == s.cooldown)
}
