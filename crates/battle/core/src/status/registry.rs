//! String-keyed effect factory.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{Control, DamageOverTime, ModifierMode, Regeneration, StackingWound, StatModifier};
use super::{EffectTags, StatusEffect};
use crate::combatant::StatKind;
use crate::error::BattleError;

/// Construction parameters shared by every effect kind.
///
/// Each kind reads only the fields it needs; the rest keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectParams {
    pub name: String,
    pub description: String,
    pub duration: i32,
    pub stacks: u32,
    pub max_stacks: u32,
    /// Per-turn amount for damage and healing kinds, flat amount for additive
    /// stat modifiers.
    pub magnitude: Decimal,
    pub stat: StatKind,
    pub modifier: Option<ModifierMode>,
    pub growth_chance: Decimal,
    pub tags: EffectTags,
}

impl EffectParams {
    pub fn new(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Self::default()
        }
    }

    pub fn magnitude(mut self, magnitude: Decimal) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn stacks(mut self, stacks: u32, max_stacks: u32) -> Self {
        self.stacks = stacks;
        self.max_stacks = max_stacks;
        self
    }

    pub fn stat(mut self, stat: StatKind, modifier: ModifierMode) -> Self {
        self.stat = stat;
        self.modifier = Some(modifier);
        self
    }

    pub fn growth_chance(mut self, chance: Decimal) -> Self {
        self.growth_chance = chance;
        self
    }

    pub fn tags(mut self, tags: EffectTags) -> Self {
        self.tags = tags;
        self
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            duration: 1,
            stacks: 1,
            max_stacks: 1,
            magnitude: Decimal::ZERO,
            stat: StatKind::Damage,
            modifier: None,
            growth_chance: Decimal::ZERO,
            tags: EffectTags::empty(),
        }
    }
}

/// An effect type that can be built by the registry.
pub trait RegisteredEffect: StatusEffect + Sized {
    /// Registry key; also returned by [`StatusEffect::kind`].
    const KIND: &'static str;

    fn build(params: &EffectParams) -> Self;
}

type Constructor = fn(&EffectParams) -> Box<dyn StatusEffect>;

fn construct<T: RegisteredEffect>(params: &EffectParams) -> Box<dyn StatusEffect> {
    Box::new(T::build(params))
}

/// Builds effects by kind name.
#[derive(Clone, Default)]
pub struct EffectRegistry {
    constructors: HashMap<&'static str, Constructor>,
}

impl EffectRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register::<DamageOverTime>()
            .register::<StatModifier>()
            .register::<Control>()
            .register::<Regeneration>()
            .register::<StackingWound>();
        registry
    }

    /// Registers `T` under `T::KIND`, replacing any previous entry.
    pub fn register<T: RegisteredEffect>(&mut self) -> &mut Self {
        self.constructors.insert(T::KIND, construct::<T>);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.constructors.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn create(
        &self,
        kind: &str,
        params: &EffectParams,
    ) -> Result<Box<dyn StatusEffect>, BattleError> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| BattleError::UnknownEffect(kind.to_string()))?;
        Ok(constructor(params))
    }
}

impl core::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::combatant::{Combatant, CombatantId};
    use crate::status::{EffectAttach, EffectCore};

    /// Halves incoming damage. Lives only in tests to prove that new kinds
    /// plug in without touching the registry.
    #[derive(Debug)]
    struct Bulwark {
        core: EffectCore,
    }

    impl RegisteredEffect for Bulwark {
        const KIND: &'static str = "bulwark";

        fn build(params: &EffectParams) -> Self {
            Self {
                core: EffectCore::new(params.name.clone(), params.duration),
            }
        }
    }

    impl StatusEffect for Bulwark {
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

        fn modify_incoming_damage(&self, damage: Decimal) -> Decimal {
            damage / Decimal::TWO
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = EffectRegistry::with_builtins();
        assert_eq!(
            registry.kinds(),
            vec![
                "control",
                "damage_over_time",
                "regeneration",
                "stacking_wound",
                "stat_modifier"
            ]
        );
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let registry = EffectRegistry::with_builtins();
        let err = registry
            .create("frostbite", &EffectParams::new("Frostbite", 2))
            .unwrap_err();
        assert_eq!(err, BattleError::UnknownEffect("frostbite".into()));
    }

    #[test]
    fn registered_kind_builds_and_hooks_run() {
        let mut registry = EffectRegistry::with_builtins();
        registry.register::<Bulwark>();

        let effect = registry
            .create("bulwark", &EffectParams::new("Bulwark", 2))
            .unwrap();
        let mut knight = Combatant::monster(CombatantId(3), "Knight", Decimal::from(300));
        assert_eq!(knight.add_status_effect(effect, None), EffectAttach::Attached);
        assert_eq!(knight.incoming_damage(Decimal::from(80)), Decimal::from(40));
    }

    #[test]
    fn same_kind_stacks_up_to_cap_then_refreshes() {
        let registry = EffectRegistry::with_builtins();
        let params = EffectParams::new("Venom", 2)
            .magnitude(Decimal::from(5))
            .stacks(1, 2)
            .tags(EffectTags::POISON);
        let mut target = Combatant::monster(CombatantId(4), "Slime", Decimal::from(100));

        let mut outcomes = Vec::new();
        for duration in [2, 4, 3] {
            let mut params = params.clone();
            params.duration = duration;
            let effect = registry.create(DamageOverTime::KIND, &params).unwrap();
            outcomes.push(target.add_status_effect(effect, Some(CombatantId(1))));
        }

        assert_eq!(
            outcomes,
            vec![
                EffectAttach::Attached,
                EffectAttach::Stacked,
                EffectAttach::Refreshed
            ]
        );
        let venom = target.status_effects().next().map(|e| e.core().clone());
        let venom = venom.unwrap();
        assert_eq!(venom.stacks, 2);
        assert_eq!(venom.duration, 4);
        assert_eq!(venom.applier, Some(CombatantId(1)));
        assert_eq!(venom.target, Some(CombatantId(4)));
    }

    #[test]
    fn multiplicative_modifier_from_the_factory_reverts_exactly() {
        let registry = EffectRegistry::with_builtins();
        let sunder = EffectParams::new("Sunder", 3).stacks(1, 2).stat(
            StatKind::Armor,
            ModifierMode::Multiplicative {
                factor: Decimal::new(5, 1),
                floor: Decimal::from(30),
            },
        );
        let iron_will = EffectParams::new("Iron Will", 3)
            .stat(StatKind::Armor, ModifierMode::Additive(Decimal::from(10)));
        let mut golem = Combatant::monster(CombatantId(5), "Golem", Decimal::from(500))
            .with_armor(Decimal::from(100));

        let effect = registry.create(StatModifier::KIND, &sunder).unwrap();
        assert_eq!(golem.add_status_effect(effect, None), EffectAttach::Attached);
        assert_eq!(golem.armor, Decimal::from(50));
        assert!(golem.status_effects().any(|e| e.core().tags.contains(EffectTags::DEBUFF)));

        // 50 * 0.5 = 25, held at the floor.
        let effect = registry.create(StatModifier::KIND, &sunder).unwrap();
        assert_eq!(golem.add_status_effect(effect, None), EffectAttach::Stacked);
        assert_eq!(golem.armor, Decimal::from(30));

        assert!(golem.remove_status_effect("Sunder"));
        assert_eq!(golem.armor, Decimal::from(100));

        let effect = registry.create(StatModifier::KIND, &sunder).unwrap();
        golem.add_status_effect(effect, None);
        let effect = registry.create(StatModifier::KIND, &iron_will).unwrap();
        golem.add_status_effect(effect, None);
        assert_eq!(golem.armor, Decimal::from(60));

        assert!(golem.remove_status_effect("Sunder"));
        assert_eq!(golem.armor, Decimal::from(110));
        assert!(golem.remove_status_effect("Iron Will"));
        assert_eq!(golem.armor, Decimal::from(100));
    }

    #[test]
    fn different_kinds_never_stack() {
        let registry = EffectRegistry::with_builtins();
        let params = EffectParams::new("Shared Name", 2).stacks(1, 5);
        let mut dot = registry.create(DamageOverTime::KIND, &params).unwrap();
        let regen = registry.create(Regeneration::KIND, &params).unwrap();
        assert!(!dot.try_stack(regen.as_ref()));
    }
}
