//! Combatants and teams.
//!
//! A [`Combatant`] is one participant in an encounter: a player character, a
//! pet, or a scripted monster. It owns its stats, active status effects,
//! bound skill state, and the transient flags of the action currently being
//! resolved. Mutation happens only through the explicit methods below; a
//! combatant never reaches into its team.

mod flags;
mod team;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::BattleConfig;
use crate::element::Element;
use crate::rng::BattleRng;
use crate::skills::{SkillId, SkillState};
use crate::status::{EffectAttach, EffectContext, StatusEffect};

pub use flags::{ActionFlags, TransientState};
pub use team::{DefeatPolicy, Team};

/// Identifier of a combatant, unique within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Account that owns a combatant. Used only for lookups, never for lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u64);

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "player:{}", self.0)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CombatantKind {
    Player,
    Pet,
    Monster,
}

/// Stats that status effects may modify.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatKind {
    #[default]
    Damage,
    Armor,
    Luck,
}

/// Once-per-battle chance to survive a killing blow at 1 HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheatDeath {
    pub chance: Decimal,
    pub used: bool,
}

impl CheatDeath {
    pub fn new(chance: Decimal) -> Self {
        Self {
            chance,
            used: false,
        }
    }
}

#[derive(Debug)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub owner: Option<PlayerId>,
    pub kind: CombatantKind,
    hp: Decimal,
    max_hp: Decimal,
    pub damage: Decimal,
    pub armor: Decimal,
    pub luck: Decimal,
    pub element: Element,
    pub shield: Decimal,

    /// Raw damage multiplier granted by the combatant's class.
    pub class_bonus: Option<Decimal>,
    /// Share of dealt damage returned as healing.
    pub lifesteal: Option<Decimal>,
    /// Share of received damage returned to the attacker.
    pub damage_reflection: Option<Decimal>,
    pub cheat_death: Option<CheatDeath>,

    pub skills: BTreeMap<SkillId, SkillState>,
    pub transient: TransientState,
    effects: Vec<Box<dyn StatusEffect>>,
}

impl Combatant {
    fn new(id: CombatantId, name: impl Into<String>, kind: CombatantKind, max_hp: Decimal) -> Self {
        let max_hp = max_hp.max(Decimal::ZERO);
        Self {
            id,
            name: name.into(),
            owner: None,
            kind,
            hp: max_hp,
            max_hp,
            damage: Decimal::ZERO,
            armor: Decimal::ZERO,
            luck: Decimal::ZERO,
            element: Element::Unknown,
            shield: Decimal::ZERO,
            class_bonus: None,
            lifesteal: None,
            damage_reflection: None,
            cheat_death: None,
            skills: BTreeMap::new(),
            transient: TransientState::default(),
            effects: Vec::new(),
        }
    }

    pub fn player(
        id: CombatantId,
        name: impl Into<String>,
        owner: PlayerId,
        max_hp: Decimal,
    ) -> Self {
        Self::new(id, name, CombatantKind::Player, max_hp).with_owner(owner)
    }

    pub fn pet(id: CombatantId, name: impl Into<String>, owner: PlayerId, max_hp: Decimal) -> Self {
        Self::new(id, name, CombatantKind::Pet, max_hp).with_owner(owner)
    }

    pub fn monster(id: CombatantId, name: impl Into<String>, max_hp: Decimal) -> Self {
        Self::new(id, name, CombatantKind::Monster, max_hp)
    }

    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_damage(mut self, damage: Decimal) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_armor(mut self, armor: Decimal) -> Self {
        self.armor = armor;
        self
    }

    pub fn with_luck(mut self, luck: Decimal) -> Self {
        self.luck = luck;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_shield(mut self, shield: Decimal) -> Self {
        self.shield = shield.max(Decimal::ZERO);
        self
    }

    /// Starts the combatant below full health. Clamped to `[0, max_hp]`.
    pub fn with_hp(mut self, hp: Decimal) -> Self {
        self.hp = hp.clamp(Decimal::ZERO, self.max_hp);
        self
    }

    pub fn with_class_bonus(mut self, multiplier: Decimal) -> Self {
        self.class_bonus = Some(multiplier);
        self
    }

    pub fn with_lifesteal(mut self, ratio: Decimal) -> Self {
        self.lifesteal = Some(ratio);
        self
    }

    pub fn with_damage_reflection(mut self, ratio: Decimal) -> Self {
        self.damage_reflection = Some(ratio);
        self
    }

    pub fn with_cheat_death(mut self, chance: Decimal) -> Self {
        self.cheat_death = Some(CheatDeath::new(chance));
        self
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub fn hp(&self) -> Decimal {
        self.hp
    }

    pub fn max_hp(&self) -> Decimal {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > Decimal::ZERO
    }

    pub fn is_pet(&self) -> bool {
        self.kind == CombatantKind::Pet
    }

    pub fn is_player(&self) -> bool {
        self.kind == CombatantKind::Player
    }

    /// Player and pet combatants are controlled by a human account.
    pub fn is_player_side(&self) -> bool {
        matches!(self.kind, CombatantKind::Player | CombatantKind::Pet)
    }

    /// Remaining health as a fraction of maximum, in `[0, 1]`.
    pub fn hp_fraction(&self) -> Decimal {
        if self.max_hp.is_zero() {
            return Decimal::ZERO;
        }
        self.hp / self.max_hp
    }

    /// Removes up to `amount` HP, never going below zero. Returns the HP
    /// actually lost.
    pub fn take_damage(&mut self, amount: Decimal) -> Decimal {
        let amount = amount.max(Decimal::ZERO).min(self.hp);
        self.hp -= amount;
        amount
    }

    /// Restores up to `amount` HP, never exceeding `max_hp`. Returns the HP
    /// actually restored. A dead combatant cannot be healed.
    pub fn heal(&mut self, amount: Decimal) -> Decimal {
        if !self.is_alive() {
            return Decimal::ZERO;
        }
        let amount = amount.max(Decimal::ZERO).min(self.max_hp - self.hp);
        self.hp += amount;
        amount
    }

    /// Heals after letting active effects adjust the amount.
    pub fn receive_healing(&mut self, amount: Decimal) -> Decimal {
        let adjusted = self
            .effects
            .iter_mut()
            .fold(amount, |acc, effect| effect.on_heal(acc));
        self.heal(adjusted)
    }

    // ========================================================================
    // Stats
    // ========================================================================

    pub fn stat(&self, stat: StatKind) -> Decimal {
        match stat {
            StatKind::Damage => self.damage,
            StatKind::Armor => self.armor,
            StatKind::Luck => self.luck,
        }
    }

    pub fn set_stat(&mut self, stat: StatKind, value: Decimal) {
        match stat {
            StatKind::Damage => self.damage = value,
            StatKind::Armor => self.armor = value,
            StatKind::Luck => self.luck = value,
        }
    }

    /// Base damage after every active effect's outgoing modifier.
    pub fn effective_damage(&self) -> Decimal {
        self.effects
            .iter()
            .fold(self.damage, |acc, effect| effect.modify_outgoing_damage(acc))
            .max(Decimal::ZERO)
    }

    /// Incoming damage after every active effect's incoming modifier.
    pub fn incoming_damage(&self, damage: Decimal) -> Decimal {
        self.effects
            .iter()
            .fold(damage, |acc, effect| effect.modify_incoming_damage(acc))
            .max(Decimal::ZERO)
    }

    pub fn can_act(&self) -> bool {
        self.is_alive() && self.effects.iter().all(|effect| effect.can_act())
    }

    // ========================================================================
    // Status effects
    // ========================================================================

    pub fn status_effects(&self) -> impl Iterator<Item = &dyn StatusEffect> {
        self.effects.iter().map(|effect| effect.as_ref())
    }

    pub fn has_status_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|effect| effect.core().name == name)
    }

    /// Attaches `effect`, or folds it into an existing effect of the same
    /// kind and name.
    pub fn add_status_effect(
        &mut self,
        mut effect: Box<dyn StatusEffect>,
        applier: Option<CombatantId>,
    ) -> EffectAttach {
        effect.apply(self.id, applier);

        let existing = self.effects.iter().position(|current| {
            current.kind() == effect.kind() && current.core().name == effect.core().name
        });

        if let Some(index) = existing {
            let mut current = self.effects.remove(index);
            let before = current.core().stacks;
            let outcome = if current.try_stack(effect.as_ref()) {
                let added = current.core().stacks.saturating_sub(before);
                current.on_stacked(self, added);
                EffectAttach::Stacked
            } else {
                current.core_mut().refresh(effect.core().duration);
                EffectAttach::Refreshed
            };
            self.effects.insert(index, current);
            return outcome;
        }

        if self.effects.len() >= BattleConfig::MAX_STATUS_EFFECTS {
            return EffectAttach::Rejected;
        }

        effect.on_apply(self);
        self.effects.push(effect);
        EffectAttach::Attached
    }

    /// Removes the effect called `name`, running its `on_remove` hook.
    /// Returns false when no such effect is attached.
    pub fn remove_status_effect(&mut self, name: &str) -> bool {
        let Some(index) = self
            .effects
            .iter()
            .position(|effect| effect.core().name == name)
        else {
            return false;
        };
        let mut effect = self.effects.remove(index);
        effect.remove();
        effect.on_remove(self);
        true
    }

    /// Runs `on_turn_start` for every effect in priority order.
    pub fn start_turn(&mut self, rng: &mut BattleRng) -> Vec<String> {
        let mut ctx = EffectContext::new(rng);
        let mut effects = std::mem::take(&mut self.effects);
        effects.sort_by_key(|effect| effect.priority());
        for effect in effects.iter_mut() {
            effect.on_turn_start(self, &mut ctx);
        }
        self.reattach(effects);
        ctx.into_messages()
    }

    /// Runs `on_turn_end`, ticks every effect, and removes the expired ones.
    pub fn end_turn(&mut self, rng: &mut BattleRng) -> Vec<String> {
        let mut ctx = EffectContext::new(rng);
        let mut effects = std::mem::take(&mut self.effects);
        for effect in effects.iter_mut() {
            effect.on_turn_end(self, &mut ctx);
        }

        let mut kept = Vec::with_capacity(effects.len());
        for mut effect in effects {
            if effect.tick() {
                kept.push(effect);
            } else {
                effect.on_remove(self);
                ctx.say(format!("{}'s {} wears off.", self.name, effect.core().name));
            }
        }
        self.reattach(kept);
        ctx.into_messages()
    }

    /// Lets effects react to this combatant landing a hit.
    pub fn notify_attack(
        &mut self,
        target: CombatantId,
        damage: Decimal,
        rng: &mut BattleRng,
    ) -> Vec<String> {
        let mut ctx = EffectContext::new(rng);
        let mut effects = std::mem::take(&mut self.effects);
        for effect in effects.iter_mut() {
            effect.on_attack(self, target, damage, &mut ctx);
        }
        self.reattach(effects);
        ctx.into_messages()
    }

    /// Lets effects react to this combatant being hit.
    pub fn notify_defend(
        &mut self,
        attacker: CombatantId,
        damage: Decimal,
        rng: &mut BattleRng,
    ) -> Vec<String> {
        let mut ctx = EffectContext::new(rng);
        let mut effects = std::mem::take(&mut self.effects);
        for effect in effects.iter_mut() {
            effect.on_defend(self, attacker, damage, &mut ctx);
        }
        self.reattach(effects);
        ctx.into_messages()
    }

    // Effects attached by hooks while the list was detached go after the
    // existing ones.
    fn reattach(&mut self, mut effects: Vec<Box<dyn StatusEffect>>) {
        effects.append(&mut self.effects);
        self.effects = effects;
    }
}
