//! Attack resolution.

use rust_decimal::Decimal;

use super::damage::{absorb_with_shield, mitigate};
use super::hit::roll_hit;
use crate::combatant::{ActionFlags, Combatant};
use crate::config::BattleConfig;
use crate::diagnostics::DiagnosticSink;
use crate::element::elemental_modifier;
use crate::rng::BattleRng;
use crate::skills::SkillResolver;
use crate::status::EffectRegistry;

/// Collaborators borrowed from the battle for one resolution.
pub struct ResolveContext<'a> {
    pub rng: &'a mut BattleRng,
    pub registry: &'a EffectRegistry,
    pub config: &'a BattleConfig,
    pub diagnostics: &'a mut dyn DiagnosticSink,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Miss,
    Hit,
}

/// Every intermediate value of a landed hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageBreakdown {
    /// Pre-skill damage: base + variance, elemental and class multipliers.
    pub raw: Decimal,
    /// After on-attack skills, effect hooks and on-damage-taken skills.
    pub adjusted: Decimal,
    /// After armor.
    pub mitigated: Decimal,
    pub shield_bypassed: Decimal,
    pub shield_absorbed: Decimal,
    pub hp_damage: Decimal,
    pub lifesteal: Decimal,
    pub reflected: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackReport {
    pub outcome: AttackOutcome,
    pub breakdown: DamageBreakdown,
    pub messages: Vec<String>,
    /// The defender went from alive to dead on this attack.
    pub killed: bool,
    pub death_prevented: bool,
}

impl AttackReport {
    fn miss(attacker: &Combatant, defender: &Combatant) -> Self {
        Self {
            outcome: AttackOutcome::Miss,
            breakdown: DamageBreakdown::default(),
            messages: vec![format!("{} misses {}.", attacker.name, defender.name)],
            killed: false,
            death_prevented: false,
        }
    }
}

/// Resolves one attack from `attacker` on `defender`: hit roll, raw damage,
/// then [`apply_hit`].
pub fn resolve_attack(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    ctx: &mut ResolveContext<'_>,
) -> AttackReport {
    attacker.transient.clear();
    defender.transient.clear();

    if !roll_hit(attacker, ctx.config, ctx.rng) {
        return AttackReport::miss(attacker, defender);
    }

    let variance = ctx.rng.range(0, ctx.config.damage_variance);
    let mut raw = attacker.effective_damage() + Decimal::from(variance);

    if ctx.config.elemental_effects_enabled {
        let modifier = elemental_modifier(
            attacker.element,
            defender.element,
            ctx.rng,
            ctx.diagnostics,
        );
        raw *= Decimal::ONE + modifier;
    }
    if ctx.config.class_bonus_enabled
        && let Some(bonus) = attacker.class_bonus
    {
        raw *= bonus;
    }

    apply_hit(attacker, defender, raw, ctx)
}

/// Applies a landed hit of `raw` damage.
///
/// Order: on-attack skills, defender incoming hooks, on-damage-taken skills,
/// armor, shield, death prevention (lethal-damage skills, then cheat death),
/// health, lifesteal, reflection, effect reactions. Lifesteal and reflection
/// skip an attacker that died during the hit. Transient state on both sides
/// is cleared afterwards.
pub fn apply_hit(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    raw: Decimal,
    ctx: &mut ResolveContext<'_>,
) -> AttackReport {
    let mut messages = Vec::new();
    let mut breakdown = DamageBreakdown {
        raw,
        ..DamageBreakdown::default()
    };
    let was_alive = defender.is_alive();

    let mut skills = SkillResolver::new(ctx.rng, ctx.registry);
    let attack = skills.on_attack(attacker, defender, raw);
    messages.extend(attack.messages);

    let incoming = defender.incoming_damage(attack.damage);
    let taken = skills.on_damage_taken(defender, attacker, incoming);
    messages.extend(taken.messages);
    breakdown.adjusted = taken.damage.max(Decimal::ZERO);

    let (total, bypass) = mitigate(
        breakdown.adjusted,
        defender.armor,
        &defender.transient,
        ctx.config.minimum_damage,
    );
    let (absorbed, mut hp_damage) = absorb_with_shield(total, bypass, &mut defender.shield);
    breakdown.mitigated = total;
    breakdown.shield_bypassed = bypass;
    breakdown.shield_absorbed = absorbed;

    let mut death_prevented = false;
    if hp_damage >= defender.hp() && defender.is_alive() {
        messages.extend(skills.on_lethal_damage(defender));
        if defender.transient.flags.contains(ActionFlags::CANNOT_DIE) {
            hp_damage = (defender.hp() - Decimal::ONE).max(Decimal::ZERO);
            death_prevented = true;
        } else if ctx.config.cheat_death_enabled
            && let Some(cheat) = defender.cheat_death.as_mut()
            && !cheat.used
            && ctx.rng.chance(cheat.chance)
        {
            cheat.used = true;
            hp_damage = (defender.hp() - Decimal::ONE).max(Decimal::ZERO);
            death_prevented = true;
            messages.push(format!("{} cheats death!", defender.name));
        }
    }

    breakdown.hp_damage = defender.take_damage(hp_damage);
    messages.push(hit_message(attacker, defender, &breakdown));

    let lifesteal_ratio =
        attacker.lifesteal.unwrap_or_default() + attacker.transient.lifesteal_ratio;
    if attacker.is_alive() && lifesteal_ratio > Decimal::ZERO && total > Decimal::ZERO {
        breakdown.lifesteal = attacker.receive_healing(total * lifesteal_ratio);
        if breakdown.lifesteal > Decimal::ZERO {
            messages.push(format!(
                "{} steals {} HP.",
                attacker.name,
                breakdown.lifesteal.round_dp(2)
            ));
        }
    }

    if ctx.config.damage_reflection_enabled && attacker.is_alive() {
        let ratio =
            defender.damage_reflection.unwrap_or_default() + defender.transient.reflect_ratio;
        if ratio > Decimal::ZERO && total > Decimal::ZERO {
            breakdown.reflected = attacker.take_damage(total * ratio);
            messages.push(format!(
                "{} reflects {} damage back to {}.",
                defender.name,
                breakdown.reflected.round_dp(2),
                attacker.name
            ));
        }
    }

    if total > Decimal::ZERO {
        messages.extend(attacker.notify_attack(defender.id, total, ctx.rng));
        messages.extend(defender.notify_defend(attacker.id, total, ctx.rng));
    }

    attacker.transient.clear();
    defender.transient.clear();

    AttackReport {
        outcome: AttackOutcome::Hit,
        breakdown,
        messages,
        killed: was_alive && !defender.is_alive(),
        death_prevented,
    }
}

fn hit_message(attacker: &Combatant, defender: &Combatant, breakdown: &DamageBreakdown) -> String {
    let mut message = format!(
        "{} hits {} for {} damage",
        attacker.name,
        defender.name,
        breakdown.hp_damage.round_dp(2)
    );
    if breakdown.shield_absorbed > Decimal::ZERO {
        message.push_str(&format!(
            " ({} absorbed by shield)",
            breakdown.shield_absorbed.round_dp(2)
        ));
    }
    if defender.is_alive() {
        message.push('.');
    } else {
        message.push_str(&format!(". {} falls!", defender.name));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatantId, PlayerId};
    use crate::diagnostics::NullSink;
    use crate::element::Element;

    #[test]
    fn miss_changes_nothing() {
        let mut rng = BattleRng::with_oracle(0, crate::rng::FixedRng(9_999));
        let registry = EffectRegistry::with_builtins();
        let config = BattleConfig::default();
        let mut sink = NullSink;
        let mut ctx = ResolveContext {
            rng: &mut rng,
            registry: &registry,
            config: &config,
            diagnostics: &mut sink,
        };

        let mut rat = Combatant::monster(CombatantId(1), "Rat", Decimal::from(10))
            .with_damage(Decimal::from(5));
        let mut hero = Combatant::player(CombatantId(2), "Hero", PlayerId(1), Decimal::from(100));
        let report = resolve_attack(&mut rat, &mut hero, &mut ctx);
        assert_eq!(report.outcome, AttackOutcome::Miss);
        assert_eq!(hero.hp(), Decimal::from(100));
    }

    #[test]
    fn elemental_and_class_multipliers_scale_raw_damage() {
        let mut rng = BattleRng::fixed();
        let registry = EffectRegistry::with_builtins();
        let config = BattleConfig::default().with_guaranteed_player_hits(true);
        let mut sink = NullSink;
        let mut ctx = ResolveContext {
            rng: &mut rng,
            registry: &registry,
            config: &config,
            diagnostics: &mut sink,
        };

        let mut hero = Combatant::player(CombatantId(1), "Hero", PlayerId(1), Decimal::from(100))
            .with_damage(Decimal::from(100))
            .with_element(Element::Water)
            .with_class_bonus(Decimal::new(12, 1));
        let mut golem = Combatant::monster(CombatantId(2), "Golem", Decimal::from(1_000))
            .with_element(Element::Fire);

        let report = resolve_attack(&mut hero, &mut golem, &mut ctx);
        // 100 * 1.10 * 1.2
        assert_eq!(report.breakdown.raw, Decimal::from(132));
        assert_eq!(golem.hp(), Decimal::from(868));
    }

    #[test]
    fn cannot_die_leaves_one_hp() {
        let mut rng = BattleRng::fixed();
        let registry = EffectRegistry::with_builtins();
        let config = BattleConfig::default();
        let mut sink = NullSink;
        let mut ctx = ResolveContext {
            rng: &mut rng,
            registry: &registry,
            config: &config,
            diagnostics: &mut sink,
        };

        let mut ogre = Combatant::monster(CombatantId(1), "Ogre", Decimal::from(100));
        let mut pet = Combatant::pet(CombatantId(2), "Cat", PlayerId(1), Decimal::from(50))
            .with_cheat_death(Decimal::ONE);

        let report = apply_hit(&mut ogre, &mut pet, Decimal::from(500), &mut ctx);
        assert!(report.death_prevented);
        assert!(!report.killed);
        assert_eq!(pet.hp(), Decimal::ONE);

        let report = apply_hit(&mut ogre, &mut pet, Decimal::from(500), &mut ctx);
        assert!(report.killed);
        assert!(pet.cheat_death.is_some_and(|c| c.used));
    }
}
