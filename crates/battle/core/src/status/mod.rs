//! Status effects: timed modifiers attached to a combatant.
//!
//! Every effect is a concrete type implementing [`StatusEffect`]. Shared
//! bookkeeping (duration, stacks, tags, back-references) lives in
//! [`EffectCore`]; behavior lives in the lifecycle and damage-shaping hooks.
//!
//! # Lifecycle
//!
//! ```text
//! apply() -> on_apply() -> { on_turn_start() ... on_turn_end() tick() }* -> on_remove()
//! ```
//!
//! Effects are constructed by string kind through [`EffectRegistry`]. Each
//! type registers itself with [`EffectRegistry::register`] so adding a new
//! effect never touches a central switch.

mod kinds;
mod registry;

use std::any::Any;
use std::fmt::Debug;

use bitflags::bitflags;
use rust_decimal::Decimal;

use crate::combatant::{Combatant, CombatantId};
use crate::rng::BattleRng;

pub use kinds::{Control, DamageOverTime, ModifierMode, Regeneration, StackingWound, StatModifier};
pub use registry::{EffectParams, EffectRegistry, RegisteredEffect};

bitflags! {
    /// Categorization used for cleansing, display and stacking queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EffectTags: u16 {
        const BUFF   = 1 << 0;
        const DEBUFF = 1 << 1;
        const POISON = 1 << 2;
        const BLEED  = 1 << 3;
        const BURN   = 1 << 4;
        const STUN   = 1 << 5;
        const HEAL   = 1 << 6;
        const STAT   = 1 << 7;
    }
}

/// State shared by every effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectCore {
    pub name: String,
    pub description: String,
    /// Remaining turns. [`EffectCore::PERMANENT`] never expires via `tick`.
    pub duration: i32,
    pub stacks: u32,
    pub max_stacks: u32,
    pub target: Option<CombatantId>,
    pub applier: Option<CombatantId>,
    pub tags: EffectTags,
}

impl EffectCore {
    pub const PERMANENT: i32 = -1;

    pub fn new(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            duration,
            stacks: 1,
            max_stacks: 1,
            target: None,
            applier: None,
            tags: EffectTags::empty(),
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.duration == Self::PERMANENT
    }

    pub fn is_active(&self) -> bool {
        self.is_permanent() || self.duration > 0
    }

    /// Consumes one turn. Returns whether the effect is still active.
    pub fn tick(&mut self) -> bool {
        if self.is_permanent() {
            return true;
        }
        if self.duration > 0 {
            self.duration -= 1;
        }
        self.duration > 0
    }

    /// Folds `other` into `self`: longer duration wins (permanent beats
    /// everything) and stacks add up to `max_stacks`.
    pub fn merge(&mut self, other: &EffectCore) {
        self.duration = longer_duration(self.duration, other.duration);
        self.stacks = self.stacks.saturating_add(other.stacks).min(self.max_stacks);
    }

    /// Extends the duration without touching stacks.
    pub fn refresh(&mut self, duration: i32) {
        self.duration = longer_duration(self.duration, duration);
    }
}

fn longer_duration(a: i32, b: i32) -> i32 {
    if a == EffectCore::PERMANENT || b == EffectCore::PERMANENT {
        EffectCore::PERMANENT
    } else {
        a.max(b)
    }
}

/// Result of attaching an effect to a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectAttach {
    /// A new effect instance was attached and `on_apply` ran.
    Attached,
    /// Merged into an existing instance of the same kind.
    Stacked,
    /// An existing instance was at its stack cap; only its duration moved.
    Refreshed,
    /// The combatant is already carrying the maximum number of effects.
    Rejected,
}

/// Per-hook collaborators: the battle's RNG and an output buffer for log
/// messages.
pub struct EffectContext<'a> {
    pub rng: &'a mut BattleRng,
    pub messages: Vec<String>,
}

impl<'a> EffectContext<'a> {
    pub fn new(rng: &'a mut BattleRng) -> Self {
        Self {
            rng,
            messages: Vec::new(),
        }
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Behavior contract for a status effect.
///
/// Hooks receive the owning combatant explicitly. While hooks run, the
/// owner's effect list is detached, so a hook may attach new effects to the
/// owner but never sees itself through `owner`.
pub trait StatusEffect: Any + Debug + Send {
    fn core(&self) -> &EffectCore;
    fn core_mut(&mut self) -> &mut EffectCore;

    /// Registry identifier of the concrete type.
    fn kind(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// Hook execution order; lower runs first.
    fn priority(&self) -> i32 {
        0
    }

    fn apply(&mut self, target: CombatantId, source: Option<CombatantId>) {
        let core = self.core_mut();
        core.target = Some(target);
        core.applier = source;
    }

    /// Marks the effect expired. Owner-side cleanup happens in `on_remove`.
    fn remove(&mut self) {
        self.core_mut().duration = 0;
    }

    fn tick(&mut self) -> bool {
        self.core_mut().tick()
    }

    fn is_active(&self) -> bool {
        self.core().is_active()
    }

    fn can_act(&self) -> bool {
        true
    }

    /// Merges `other` into `self` if both are the same concrete effect and
    /// `self` is below its stack cap.
    fn try_stack(&mut self, other: &dyn StatusEffect) -> bool {
        if self.kind() != other.kind() || self.as_any().type_id() != other.as_any().type_id() {
            return false;
        }
        if self.core().stacks >= self.core().max_stacks {
            return false;
        }
        self.core_mut().merge(other.core());
        true
    }

    fn on_stacked(&mut self, _owner: &mut Combatant, _added: u32) {}

    fn on_apply(&mut self, _owner: &mut Combatant) {}

    fn on_remove(&mut self, _owner: &mut Combatant) {}

    fn on_turn_start(&mut self, _owner: &mut Combatant, _ctx: &mut EffectContext<'_>) {}

    fn on_turn_end(&mut self, _owner: &mut Combatant, _ctx: &mut EffectContext<'_>) {}

    fn modify_outgoing_damage(&self, damage: Decimal) -> Decimal {
        damage
    }

    fn modify_incoming_damage(&self, damage: Decimal) -> Decimal {
        damage
    }

    fn on_attack(
        &mut self,
        _owner: &mut Combatant,
        _target: CombatantId,
        _damage: Decimal,
        _ctx: &mut EffectContext<'_>,
    ) {
    }

    fn on_defend(
        &mut self,
        _owner: &mut Combatant,
        _attacker: CombatantId,
        _damage: Decimal,
        _ctx: &mut EffectContext<'_>,
    ) {
    }

    /// Adjusts healing about to be received by the owner.
    fn on_heal(&mut self, amount: Decimal) -> Decimal {
        amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_duration_ticks_down_to_inactive() {
        let mut core = EffectCore::new("Burn", 3);
        let mut seen = vec![core.duration];
        while core.tick() {
            seen.push(core.duration);
        }
        assert_eq!(seen, vec![3, 2, 1]);
        assert_eq!(core.duration, 0);
        assert!(!core.is_active());
        assert!(!core.tick());
    }

    #[test]
    fn permanent_never_expires() {
        let mut core = EffectCore::new("Curse", EffectCore::PERMANENT);
        for _ in 0..1_000 {
            assert!(core.tick());
        }
        assert!(core.is_active());
    }

    #[test]
    fn merge_caps_stacks_and_keeps_longer_duration() {
        let mut a = EffectCore::new("Venom", 2);
        a.max_stacks = 3;
        let mut b = EffectCore::new("Venom", 5);
        b.stacks = 4;

        a.merge(&b);
        assert_eq!(a.stacks, 3);
        assert_eq!(a.duration, 5);

        let permanent = EffectCore::new("Venom", EffectCore::PERMANENT);
        a.merge(&permanent);
        assert!(a.is_permanent());
    }
}
