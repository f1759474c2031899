//! Built-in effect catalog.

use std::any::Any;

use rust_decimal::Decimal;

use super::{EffectContext, EffectCore, EffectParams, EffectTags, RegisteredEffect, StatusEffect};
use crate::combatant::{Combatant, CombatantId, StatKind};

// ============================================================================
// Damage over time
// ============================================================================

/// Fixed damage per turn, scaled by stack count, dealt at turn start.
#[derive(Clone, Debug)]
pub struct DamageOverTime {
    core: EffectCore,
    pub per_turn: Decimal,
}

impl DamageOverTime {
    pub fn new(name: impl Into<String>, per_turn: Decimal, duration: i32) -> Self {
        let mut core = EffectCore::new(name, duration);
        core.tags = EffectTags::DEBUFF;
        Self { core, per_turn }
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.core.max_stacks = max_stacks.max(1);
        self
    }

    pub fn with_tags(mut self, tags: EffectTags) -> Self {
        self.core.tags |= tags;
        self
    }

    pub fn damage_this_turn(&self) -> Decimal {
        self.per_turn * Decimal::from(self.core.stacks)
    }
}

impl RegisteredEffect for DamageOverTime {
    const KIND: &'static str = "damage_over_time";

    fn build(params: &EffectParams) -> Self {
        let mut effect = Self::new(params.name.clone(), params.magnitude, params.duration)
            .with_max_stacks(params.max_stacks)
            .with_tags(params.tags);
        effect.core.description = params.description.clone();
        effect.core.stacks = params.stacks.clamp(1, effect.core.max_stacks);
        effect
    }
}

impl StatusEffect for DamageOverTime {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_turn_start(&mut self, owner: &mut Combatant, ctx: &mut EffectContext<'_>) {
        let amount = self.damage_this_turn();
        if amount <= Decimal::ZERO || !owner.is_alive() {
            return;
        }
        owner.take_damage(amount);
        ctx.say(format!(
            "{} suffers {} damage from {}.",
            owner.name,
            amount.round_dp(2),
            self.core.name
        ));
    }
}

// ============================================================================
// Stat modifier
// ============================================================================

/// How a [`StatModifier`] changes its stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierMode {
    /// Adds a flat amount per stack.
    Additive(Decimal),
    /// Multiplies the current value per stack, never going below `floor`.
    Multiplicative { factor: Decimal, floor: Decimal },
}

/// Temporary change to one of the owner's stats.
///
/// The modifier remembers the value it found and the exact delta it applied.
/// Removal subtracts only that delta, so removing several modifiers on the
/// same stat in any order restores the base value exactly.
#[derive(Clone, Debug)]
pub struct StatModifier {
    core: EffectCore,
    pub stat: StatKind,
    pub mode: ModifierMode,
    previous_value: Option<Decimal>,
    applied_delta: Decimal,
}

impl StatModifier {
    pub fn new(name: impl Into<String>, stat: StatKind, mode: ModifierMode, duration: i32) -> Self {
        let mut core = EffectCore::new(name, duration);
        core.tags = EffectTags::STAT | Self::polarity(mode);
        Self {
            core,
            stat,
            mode,
            previous_value: None,
            applied_delta: Decimal::ZERO,
        }
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.core.max_stacks = max_stacks.max(1);
        self
    }

    pub fn applied_delta(&self) -> Decimal {
        self.applied_delta
    }

    fn polarity(mode: ModifierMode) -> EffectTags {
        let beneficial = match mode {
            ModifierMode::Additive(amount) => amount >= Decimal::ZERO,
            ModifierMode::Multiplicative { factor, .. } => factor >= Decimal::ONE,
        };
        if beneficial {
            EffectTags::BUFF
        } else {
            EffectTags::DEBUFF
        }
    }

    fn apply_once(&mut self, owner: &mut Combatant) {
        let current = owner.stat(self.stat);
        let updated = match self.mode {
            ModifierMode::Additive(amount) => current + amount,
            ModifierMode::Multiplicative { factor, floor } => (current * factor).max(floor),
        };
        owner.set_stat(self.stat, updated);
        self.applied_delta += updated - current;
    }
}

impl RegisteredEffect for StatModifier {
    const KIND: &'static str = "stat_modifier";

    fn build(params: &EffectParams) -> Self {
        let mode = params
            .modifier
            .unwrap_or(ModifierMode::Additive(params.magnitude));
        let mut effect = Self::new(params.name.clone(), params.stat, mode, params.duration)
            .with_max_stacks(params.max_stacks);
        effect.core.description = params.description.clone();
        effect.core.tags |= params.tags;
        effect
    }
}

impl StatusEffect for StatModifier {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_apply(&mut self, owner: &mut Combatant) {
        self.previous_value = Some(owner.stat(self.stat));
        for _ in 0..self.core.stacks {
            self.apply_once(owner);
        }
    }

    fn on_stacked(&mut self, owner: &mut Combatant, added: u32) {
        for _ in 0..added {
            self.apply_once(owner);
        }
    }

    fn on_remove(&mut self, owner: &mut Combatant) {
        let current = owner.stat(self.stat);
        let restored = match self.previous_value.take() {
            // Nothing else touched the stat: put back the recorded value.
            Some(previous) if current == previous + self.applied_delta => previous,
            _ => current - self.applied_delta,
        };
        owner.set_stat(self.stat, restored);
        self.applied_delta = Decimal::ZERO;
    }
}

// ============================================================================
// Control
// ============================================================================

/// Prevents the owner from acting while active.
#[derive(Clone, Debug)]
pub struct Control {
    core: EffectCore,
}

impl Control {
    pub fn new(name: impl Into<String>, duration: i32) -> Self {
        let mut core = EffectCore::new(name, duration);
        core.tags = EffectTags::DEBUFF | EffectTags::STUN;
        Self { core }
    }
}

impl RegisteredEffect for Control {
    const KIND: &'static str = "control";

    fn build(params: &EffectParams) -> Self {
        let mut effect = Self::new(params.name.clone(), params.duration);
        effect.core.description = params.description.clone();
        effect.core.tags |= params.tags;
        effect
    }
}

impl StatusEffect for Control {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn can_act(&self) -> bool {
        !self.is_active()
    }
}

// ============================================================================
// Regeneration
// ============================================================================

/// Heals the owner at turn start.
#[derive(Clone, Debug)]
pub struct Regeneration {
    core: EffectCore,
    pub per_turn: Decimal,
}

impl Regeneration {
    pub fn new(name: impl Into<String>, per_turn: Decimal, duration: i32) -> Self {
        let mut core = EffectCore::new(name, duration);
        core.tags = EffectTags::BUFF | EffectTags::HEAL;
        Self { core, per_turn }
    }
}

impl RegisteredEffect for Regeneration {
    const KIND: &'static str = "regeneration";

    fn build(params: &EffectParams) -> Self {
        let mut effect = Self::new(params.name.clone(), params.magnitude, params.duration);
        effect.core.description = params.description.clone();
        effect.core.max_stacks = params.max_stacks.max(1);
        effect.core.tags |= params.tags;
        effect
    }
}

impl StatusEffect for Regeneration {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    // After damage-over-time, so a full-health owner still benefits.
    fn priority(&self) -> i32 {
        10
    }

    fn on_turn_start(&mut self, owner: &mut Combatant, ctx: &mut EffectContext<'_>) {
        if !owner.is_alive() {
            return;
        }
        let amount = self.per_turn * Decimal::from(self.core.stacks);
        let healed = owner.heal(amount);
        if healed > Decimal::ZERO {
            ctx.say(format!(
                "{} regenerates {} HP from {}.",
                owner.name,
                healed.round_dp(2),
                self.core.name
            ));
        }
    }
}

// ============================================================================
// Stacking wound
// ============================================================================

/// Damage over time whose stacks may grow each time the owner is hit.
///
/// Also reduces healing received by [`StackingWound::HEAL_REDUCTION_PER_STACK`]
/// per stack, up to [`StackingWound::MAX_HEAL_REDUCTION`].
#[derive(Clone, Debug)]
pub struct StackingWound {
    core: EffectCore,
    pub per_stack: Decimal,
    pub growth_chance: Decimal,
}

impl StackingWound {
    pub const HEAL_REDUCTION_PER_STACK: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
    pub const MAX_HEAL_REDUCTION: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

    pub fn new(
        name: impl Into<String>,
        per_stack: Decimal,
        growth_chance: Decimal,
        duration: i32,
        max_stacks: u32,
    ) -> Self {
        let mut core = EffectCore::new(name, duration);
        core.tags = EffectTags::DEBUFF | EffectTags::BLEED;
        core.max_stacks = max_stacks.max(1);
        Self {
            core,
            per_stack,
            growth_chance,
        }
    }
}

impl RegisteredEffect for StackingWound {
    const KIND: &'static str = "stacking_wound";

    fn build(params: &EffectParams) -> Self {
        let mut effect = Self::new(
            params.name.clone(),
            params.magnitude,
            params.growth_chance,
            params.duration,
            params.max_stacks,
        );
        effect.core.description = params.description.clone();
        effect.core.stacks = params.stacks.clamp(1, effect.core.max_stacks);
        effect.core.tags |= params.tags;
        effect
    }
}

impl StatusEffect for StackingWound {
    fn core(&self) -> &EffectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EffectCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_turn_start(&mut self, owner: &mut Combatant, ctx: &mut EffectContext<'_>) {
        let amount = self.per_stack * Decimal::from(self.core.stacks);
        if amount <= Decimal::ZERO || !owner.is_alive() {
            return;
        }
        owner.take_damage(amount);
        ctx.say(format!(
            "{} bleeds for {} from {} ({} stacks).",
            owner.name,
            amount.round_dp(2),
            self.core.name,
            self.core.stacks
        ));
    }

    fn on_defend(
        &mut self,
        owner: &mut Combatant,
        _attacker: CombatantId,
        damage: Decimal,
        ctx: &mut EffectContext<'_>,
    ) {
        if damage <= Decimal::ZERO || self.core.stacks >= self.core.max_stacks {
            return;
        }
        if ctx.rng.chance(self.growth_chance) {
            self.core.stacks += 1;
            ctx.say(format!(
                "{}'s {} deepens to {} stacks.",
                owner.name, self.core.name, self.core.stacks
            ));
        }
    }

    fn on_heal(&mut self, amount: Decimal) -> Decimal {
        let reduction = (Self::HEAL_REDUCTION_PER_STACK * Decimal::from(self.core.stacks))
            .min(Self::MAX_HEAL_REDUCTION);
        amount * (Decimal::ONE - reduction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Combatant, CombatantId};
    use crate::rng::BattleRng;

    fn dummy(hp: i64) -> Combatant {
        Combatant::monster(CombatantId(1), "Dummy", Decimal::from(hp))
            .with_damage(Decimal::from(100))
            .with_armor(Decimal::from(100))
    }

    fn run_turn(target: &mut Combatant, rng: &mut BattleRng) {
        target.start_turn(rng);
        target.end_turn(rng);
    }

    #[test]
    fn damage_over_time_with_regeneration_nets_per_turn() {
        let mut target = dummy(500);
        let mut rng = BattleRng::fixed();
        target.add_status_effect(
            Box::new(Regeneration::new("Rejuvenation", Decimal::from(20), 3)),
            None,
        );
        target.add_status_effect(
            Box::new(DamageOverTime::new("Poison", Decimal::from(50), 3)),
            None,
        );

        let mut history = vec![target.hp()];
        for _ in 0..5 {
            run_turn(&mut target, &mut rng);
            history.push(target.hp());
        }

        let expected: Vec<Decimal> = [500, 470, 440, 410, 410, 410]
            .into_iter()
            .map(Decimal::from)
            .collect();
        assert_eq!(history, expected);
        assert_eq!(target.status_effects().count(), 0);
    }

    #[test]
    fn stacked_modifiers_restore_exactly_in_any_order() {
        let mut target = dummy(500);
        target.add_status_effect(
            Box::new(StatModifier::new(
                "Iron Will",
                StatKind::Armor,
                ModifierMode::Additive(Decimal::from(50)),
                3,
            )),
            None,
        );
        target.add_status_effect(
            Box::new(StatModifier::new(
                "Sundered",
                StatKind::Armor,
                ModifierMode::Multiplicative {
                    factor: Decimal::new(5, 1),
                    floor: Decimal::ZERO,
                },
                3,
            )),
            None,
        );
        assert_eq!(target.armor, Decimal::from(75));

        assert!(target.remove_status_effect("Iron Will"));
        assert_eq!(target.armor, Decimal::from(25));
        assert!(target.remove_status_effect("Sundered"));
        assert_eq!(target.armor, Decimal::from(100));
    }

    #[test]
    fn multiplicative_modifier_respects_floor() {
        let mut target = dummy(500);
        target.add_status_effect(
            Box::new(StatModifier::new(
                "Crippled",
                StatKind::Damage,
                ModifierMode::Multiplicative {
                    factor: Decimal::new(1, 1),
                    floor: Decimal::from(40),
                },
                2,
            )),
            None,
        );
        assert_eq!(target.damage, Decimal::from(40));
    }

    #[test]
    fn control_blocks_actions_until_expiry() {
        let mut target = dummy(500);
        let mut rng = BattleRng::fixed();
        target.add_status_effect(Box::new(Control::new("Paralyzed", 1)), None);
        assert!(!target.can_act());
        run_turn(&mut target, &mut rng);
        assert!(target.can_act());
    }

    #[test]
    fn wound_grows_when_hit_and_caps() {
        let mut target = dummy(5_000);
        let mut rng = BattleRng::fixed();
        target.add_status_effect(
            Box::new(StackingWound::new(
                "Festering Wound",
                Decimal::from(4),
                Decimal::ONE,
                4,
                3,
            )),
            None,
        );
        for _ in 0..5 {
            target.notify_defend(CombatantId(9), Decimal::from(10), &mut rng);
        }
        let wound = target
            .status_effects()
            .find(|e| e.kind() == StackingWound::KIND)
            .map(|e| e.core().stacks);
        assert_eq!(wound, Some(3));

        let healed = target.receive_healing(Decimal::from(100));
        assert_eq!(healed, Decimal::ZERO);
        target.take_damage(Decimal::from(200));
        assert_eq!(target.receive_healing(Decimal::from(100)), Decimal::from(70));
    }
}
