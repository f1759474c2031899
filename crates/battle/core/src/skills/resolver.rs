//! Skill resolution across the trigger contexts.
//!
//! Every context follows the same steps for each bound skill, in [`SkillId`]
//! order:
//!
//! 1. skip skills that do not run in this context or are on cooldown
//! 2. skip skills whose precondition does not hold (nothing to heal, no
//!    charges left, ...); no roll is consumed
//! 3. roll the proc chance
//! 4. run the handler; on success emit its message and start the cooldown
//!
//! Cooldowns only ever decrease in [`SkillResolver::per_turn`], once per
//! call, so any number of attacks inside one turn sees the same cooldown. A
//! cooldown of `n` means the skill sits out `n - 1` full turns, whatever its
//! trigger.

use rust_decimal::Decimal;

use super::{SkillId, SkillState, Trigger};
use crate::combatant::{ActionFlags, Combatant, CombatantId, StatKind};
use crate::rng::BattleRng;
use crate::status::{
    Control, DamageOverTime, EffectAttach, EffectParams, EffectRegistry, EffectTags,
    ModifierMode, RegisteredEffect, Regeneration, StackingWound, StatModifier,
};

/// Adjusted damage plus the log lines produced while adjusting it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillOutcome {
    pub damage: Decimal,
    pub messages: Vec<String>,
}

const BURN_DURATION: i32 = 3;
const BURN_MAX_STACKS: u32 = 3;
const VENOM_DURATION: i32 = 3;
const WOUND_DURATION: i32 = 4;
const WOUND_GROWTH_CHANCE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
const PARALYSIS_DURATION: i32 = 1;
const AEGIS_SHIELD_RATIO: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
const HEALING_RAIN_DURATION: i32 = 3;
const BATTLE_FURY_DURATION: i32 = 2;
const IRON_WILL_DURATION: i32 = 3;

pub struct SkillResolver<'a> {
    pub rng: &'a mut BattleRng,
    pub effects: &'a EffectRegistry,
}

impl<'a> SkillResolver<'a> {
    pub fn new(rng: &'a mut BattleRng, effects: &'a EffectRegistry) -> Self {
        Self { rng, effects }
    }

    /// Runs the attacker's on-attack skills against `raw` damage.
    pub fn on_attack(
        &mut self,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        raw: Decimal,
    ) -> SkillOutcome {
        let mut outcome = SkillOutcome {
            damage: raw,
            messages: Vec::new(),
        };

        for id in ready(attacker, Trigger::OnAttack) {
            let state = attacker.skills[&id];
            if !attack_precondition(id, &state) || !self.roll(&state) {
                continue;
            }
            if let Some(message) =
                self.attack_effect(id, state, attacker, defender, &mut outcome.damage)
            {
                start_cooldown(attacker, id);
                outcome.messages.push(message);
            }
        }

        outcome
    }

    /// Runs the defender's on-damage-taken skills against incoming `damage`.
    pub fn on_damage_taken(
        &mut self,
        defender: &mut Combatant,
        attacker: &mut Combatant,
        damage: Decimal,
    ) -> SkillOutcome {
        let mut outcome = SkillOutcome {
            damage,
            messages: Vec::new(),
        };

        for id in ready(defender, Trigger::OnDamageTaken) {
            let state = defender.skills[&id];
            if !defense_precondition(id, outcome.damage) || !self.roll(&state) {
                continue;
            }
            if let Some(message) =
                self.defense_effect(id, state, defender, attacker, &mut outcome.damage)
            {
                start_cooldown(defender, id);
                outcome.messages.push(message);
            }
        }

        outcome
    }

    /// Runs the defender's death-prevention skills against a hit that would
    /// otherwise kill it. A proc sets [`ActionFlags::CANNOT_DIE`] for the
    /// rest of the hit.
    pub fn on_lethal_damage(&mut self, defender: &mut Combatant) -> Vec<String> {
        let mut messages = Vec::new();

        for id in ready(defender, Trigger::OnLethalDamage) {
            let state = defender.skills[&id];
            if !lethal_precondition(&state) || !self.roll(&state) {
                continue;
            }
            if let Some(message) = lethal_effect(id, defender) {
                start_cooldown(defender, id);
                messages.push(message);
            }
        }

        messages
    }

    /// Advances cooldowns by one turn, then runs time-based skills that are
    /// ready, including those whose cooldown ran out in this call.
    pub fn per_turn(&mut self, combatant: &mut Combatant) -> Vec<String> {
        for state in combatant.skills.values_mut() {
            state.cooldown_remaining = state.cooldown_remaining.saturating_sub(1);
        }

        let mut messages = Vec::new();
        for id in ready(combatant, Trigger::PerTurn) {
            let state = combatant.skills[&id];
            if !turn_precondition(id, &state, combatant) || !self.roll(&state) {
                continue;
            }
            if let Some(message) = self.turn_effect(id, state, combatant) {
                start_cooldown(combatant, id);
                messages.push(message);
            }
        }

        messages
    }

    fn roll(&mut self, state: &SkillState) -> bool {
        self.rng.chance(state.proc_chance.probability())
    }

    fn attach(
        &self,
        kind: &str,
        params: &EffectParams,
        target: &mut Combatant,
        applier: CombatantId,
    ) -> bool {
        match self.effects.create(kind, params) {
            Ok(effect) => target.add_status_effect(effect, Some(applier)) != EffectAttach::Rejected,
            Err(_) => false,
        }
    }

    fn attack_effect(
        &mut self,
        id: SkillId,
        state: SkillState,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        damage: &mut Decimal,
    ) -> Option<String> {
        let name = id.name();
        let raw = *damage;

        let message = match id {
            SkillId::FlameBurst | SkillId::TidalWave => {
                *damage *= state.magnitude;
                format!(
                    "{}'s {name} amplifies the hit to {}!",
                    attacker.name,
                    damage.round_dp(2)
                )
            }
            SkillId::GaleForce => {
                *damage *= state.magnitude;
                defender.transient.flags |= ActionFlags::IGNORE_ARMOR;
                format!(
                    "{}'s {name} cuts straight through {}'s armor!",
                    attacker.name, defender.name
                )
            }
            SkillId::InfernoStrike => {
                let params = EffectParams::new("Burn", BURN_DURATION)
                    .magnitude(raw * state.magnitude)
                    .stacks(1, BURN_MAX_STACKS)
                    .tags(EffectTags::BURN);
                if !self.attach(DamageOverTime::KIND, &params, defender, attacker.id) {
                    return None;
                }
                format!("{}'s {name} sets {} ablaze!", attacker.name, defender.name)
            }
            SkillId::VenomFang => {
                let params = EffectParams::new("Venom", VENOM_DURATION)
                    .magnitude(attacker.damage * state.magnitude)
                    .stacks(1, state.max_stacks)
                    .tags(EffectTags::POISON);
                if !self.attach(DamageOverTime::KIND, &params, defender, attacker.id) {
                    return None;
                }
                format!("{}'s {name} poisons {}!", attacker.name, defender.name)
            }
            SkillId::FesteringWound => {
                let params = EffectParams::new("Festering Wound", WOUND_DURATION)
                    .magnitude(raw * state.magnitude)
                    .stacks(1, state.max_stacks)
                    .growth_chance(WOUND_GROWTH_CHANCE)
                    .tags(EffectTags::BLEED);
                if !self.attach(StackingWound::KIND, &params, defender, attacker.id) {
                    return None;
                }
                format!(
                    "{}'s {name} opens a festering wound on {}!",
                    attacker.name, defender.name
                )
            }
            SkillId::StaticShock => {
                let params =
                    EffectParams::new("Paralyzed", PARALYSIS_DURATION).tags(EffectTags::STUN);
                if !self.attach(Control::KIND, &params, defender, attacker.id) {
                    return None;
                }
                format!("{}'s {name} paralyzes {}!", attacker.name, defender.name)
            }
            SkillId::ChainLightning => {
                let extra = raw * state.magnitude;
                *damage += extra;
                defender.transient.partial_true_damage += extra;
                format!(
                    "{}'s {name} arcs for {} extra true damage!",
                    attacker.name,
                    extra.round_dp(2)
                )
            }
            SkillId::HolyStrike => {
                let portion = raw * state.magnitude;
                defender.transient.partial_true_damage += portion;
                defender.transient.pending_bypass_shield += portion;
                format!(
                    "{}'s {name} sears past {}'s defenses for {}!",
                    attacker.name,
                    defender.name,
                    portion.round_dp(2)
                )
            }
            SkillId::ShadowStrike => {
                defender.transient.flags |= ActionFlags::TRUE_DAMAGE;
                format!("{}'s {name} deals true damage!", attacker.name)
            }
            SkillId::VoidRend => {
                defender.transient.flags |= ActionFlags::BYPASS_ALL_DEFENSES;
                format!("{}'s {name} tears through every defense!", attacker.name)
            }
            SkillId::VampiricBite => {
                attacker.transient.lifesteal_ratio += state.magnitude;
                format!("{}'s {name} drains {}'s life!", attacker.name, defender.name)
            }
            SkillId::Overcharge => {
                let bonus = state.magnitude * Decimal::from(state.stacks);
                *damage *= Decimal::ONE + bonus;
                if let Some(skill) = attacker.skills.get_mut(&id) {
                    skill.stacks = 0;
                }
                format!(
                    "{} releases {} {name} stacks for +{}% damage!",
                    attacker.name,
                    state.stacks,
                    (bonus * Decimal::ONE_HUNDRED).round_dp(0)
                )
            }
            SkillId::BarkSkin
            | SkillId::ThornArmor
            | SkillId::EvasiveGust
            | SkillId::DivineAegis
            | SkillId::PhoenixRebirth
            | SkillId::SpikedHide
            | SkillId::Regrowth
            | SkillId::HealingRain
            | SkillId::TidalBarrier
            | SkillId::BattleFury
            | SkillId::IronWill => return None,
        };

        Some(message)
    }

    fn defense_effect(
        &mut self,
        id: SkillId,
        state: SkillState,
        defender: &mut Combatant,
        attacker: &mut Combatant,
        damage: &mut Decimal,
    ) -> Option<String> {
        let name = id.name();

        let message = match id {
            SkillId::BarkSkin => {
                *damage *= state.magnitude;
                format!("{}'s {name} hardens against the blow!", defender.name)
            }
            SkillId::ThornArmor => {
                let counter = *damage * state.magnitude;
                let dealt = attacker.take_damage(counter);
                format!(
                    "{}'s {name} pricks {} for {}!",
                    defender.name,
                    attacker.name,
                    dealt.round_dp(2)
                )
            }
            SkillId::EvasiveGust => {
                *damage = Decimal::ZERO;
                format!("{} dodges on an {name}!", defender.name)
            }
            SkillId::DivineAegis => {
                *damage *= state.magnitude;
                let shield = defender.max_hp() * AEGIS_SHIELD_RATIO;
                defender.shield += shield;
                format!(
                    "{}'s {name} halves the blow and grants a {} shield!",
                    defender.name,
                    shield.round_dp(2)
                )
            }
            SkillId::SpikedHide => {
                defender.transient.reflect_ratio += state.magnitude;
                format!("{}'s {name} turns the blow back on {}!", defender.name, attacker.name)
            }
            SkillId::FlameBurst
            | SkillId::InfernoStrike
            | SkillId::TidalWave
            | SkillId::StaticShock
            | SkillId::ChainLightning
            | SkillId::VenomFang
            | SkillId::GaleForce
            | SkillId::HolyStrike
            | SkillId::ShadowStrike
            | SkillId::VoidRend
            | SkillId::FesteringWound
            | SkillId::VampiricBite
            | SkillId::Overcharge
            | SkillId::PhoenixRebirth
            | SkillId::Regrowth
            | SkillId::HealingRain
            | SkillId::TidalBarrier
            | SkillId::BattleFury
            | SkillId::IronWill => return None,
        };

        Some(message)
    }

    fn turn_effect(
        &mut self,
        id: SkillId,
        state: SkillState,
        combatant: &mut Combatant,
    ) -> Option<String> {
        let name = id.name();
        let owner = combatant.id;

        let message = match id {
            SkillId::Regrowth => {
                let healed = combatant.receive_healing(combatant.max_hp() * state.magnitude);
                format!("{}'s {name} restores {} HP.", combatant.name, healed.round_dp(2))
            }
            SkillId::HealingRain => {
                let params = EffectParams::new(name, HEALING_RAIN_DURATION)
                    .magnitude(combatant.max_hp() * state.magnitude)
                    .tags(EffectTags::HEAL);
                if !self.attach(Regeneration::KIND, &params, combatant, owner) {
                    return None;
                }
                format!("{}'s {name} begins to fall.", combatant.name)
            }
            SkillId::TidalBarrier => {
                let shield = combatant.max_hp() * state.magnitude;
                combatant.shield += shield;
                format!(
                    "{}'s {name} raises a {} shield.",
                    combatant.name,
                    shield.round_dp(2)
                )
            }
            SkillId::BattleFury => {
                let params = EffectParams::new(name, BATTLE_FURY_DURATION).stat(
                    StatKind::Damage,
                    ModifierMode::Multiplicative {
                        factor: state.magnitude,
                        floor: Decimal::ZERO,
                    },
                );
                if !self.attach(StatModifier::KIND, &params, combatant, owner) {
                    return None;
                }
                format!("{} is consumed by {name}!", combatant.name)
            }
            SkillId::IronWill => {
                let params = EffectParams::new(name, IRON_WILL_DURATION)
                    .stat(StatKind::Armor, ModifierMode::Additive(state.magnitude));
                if !self.attach(StatModifier::KIND, &params, combatant, owner) {
                    return None;
                }
                format!("{}'s {name} bolsters their armor.", combatant.name)
            }
            SkillId::Overcharge => {
                let stacks = match combatant.skills.get_mut(&id) {
                    Some(skill) => {
                        skill.stacks = (skill.stacks + 1).min(skill.max_stacks);
                        skill.stacks
                    }
                    None => return None,
                };
                format!("{} builds {name} ({stacks}/{}).", combatant.name, state.max_stacks)
            }
            SkillId::FlameBurst
            | SkillId::InfernoStrike
            | SkillId::TidalWave
            | SkillId::StaticShock
            | SkillId::ChainLightning
            | SkillId::VenomFang
            | SkillId::GaleForce
            | SkillId::HolyStrike
            | SkillId::ShadowStrike
            | SkillId::VoidRend
            | SkillId::FesteringWound
            | SkillId::VampiricBite
            | SkillId::BarkSkin
            | SkillId::ThornArmor
            | SkillId::EvasiveGust
            | SkillId::DivineAegis
            | SkillId::PhoenixRebirth
            | SkillId::SpikedHide => return None,
        };

        Some(message)
    }
}

/// Bound skills that run in `trigger` and are off cooldown, in id order.
fn ready(combatant: &Combatant, trigger: Trigger) -> Vec<SkillId> {
    combatant
        .skills
        .iter()
        .filter(|(id, state)| id.runs_on(trigger) && state.is_ready())
        .map(|(id, _)| *id)
        .collect()
}

fn start_cooldown(combatant: &mut Combatant, id: SkillId) {
    if let Some(state) = combatant.skills.get_mut(&id) {
        state.cooldown_remaining = state.cooldown;
    }
}

fn attack_precondition(id: SkillId, state: &SkillState) -> bool {
    match id {
        SkillId::Overcharge => state.stacks > 0,
        _ => true,
    }
}

fn defense_precondition(id: SkillId, damage: Decimal) -> bool {
    match id {
        SkillId::EvasiveGust | SkillId::BarkSkin | SkillId::DivineAegis | SkillId::ThornArmor => {
            damage > Decimal::ZERO
        }
        _ => true,
    }
}

fn lethal_precondition(state: &SkillState) -> bool {
    state.charges.is_none_or(|charges| charges > 0)
}

fn lethal_effect(id: SkillId, defender: &mut Combatant) -> Option<String> {
    match id {
        SkillId::PhoenixRebirth => {
            defender.transient.flags |= ActionFlags::CANNOT_DIE;
            if let Some(charges) = defender
                .skills
                .get_mut(&id)
                .and_then(|skill| skill.charges.as_mut())
            {
                *charges = charges.saturating_sub(1);
            }
            Some(format!("{} rises from the ashes with {}!", defender.name, id.name()))
        }
        _ => None,
    }
}

fn turn_precondition(id: SkillId, state: &SkillState, combatant: &Combatant) -> bool {
    match id {
        SkillId::Regrowth => combatant.hp() < combatant.max_hp(),
        SkillId::Overcharge => state.stacks < state.max_stacks,
        _ => true,
    }
}
