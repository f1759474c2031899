//! Skill effects: named abilities that proc during combat.
//!
//! Skills are a closed set ([`SkillId`]). Each id maps through the static
//! [`SKILL_TABLE`] to its authored parameters and, through
//! [`SkillId::triggers`], to the trigger contexts in which it runs. Both
//! mappings are exhaustive over the enum, and [`audit_catalog`] checks them
//! against the externally advertised skill catalog.
//!
//! Binding happens once per battle via [`apply_skill_effects`]; resolution
//! happens through [`SkillResolver`].

mod audit;
mod resolver;

use rust_decimal::Decimal;

use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::diagnostics::DiagnosticSink;

pub use audit::{AuditReport, audit_catalog};
pub use resolver::{SkillOutcome, SkillResolver};

use ProcChance::{Fraction, Percent};

/// Bumped whenever a skill is added, removed, or rebalanced.
pub const SKILL_TABLE_VERSION: u32 = 4;

/// Catalog names that are deliberately not combat skills.
pub const NON_COMBAT_SKILLS: &[&str] = &["Treasure Sense"];

/// The contexts in which a skill can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    OnAttack,
    OnDamageTaken,
    /// After armor and shield, when the remaining damage would kill.
    OnLethalDamage,
    PerTurn,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::IntoStaticStr,
    strum::EnumString,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SkillId {
    FlameBurst,
    InfernoStrike,
    TidalWave,
    StaticShock,
    ChainLightning,
    VenomFang,
    GaleForce,
    HolyStrike,
    ShadowStrike,
    VoidRend,
    FesteringWound,
    VampiricBite,
    Overcharge,
    BarkSkin,
    ThornArmor,
    EvasiveGust,
    DivineAegis,
    PhoenixRebirth,
    SpikedHide,
    Regrowth,
    HealingRain,
    TidalBarrier,
    BattleFury,
    IronWill,
}

impl SkillId {
    /// Stable snake_case identifier, e.g. `flame_burst`.
    pub fn slug(self) -> &'static str {
        self.into()
    }

    pub fn definition(self) -> &'static SkillDefinition {
        &SKILL_TABLE[self as usize]
    }

    /// Display name as advertised in the catalog.
    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Resolves a catalog display name or slug, ignoring case and
    /// surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        SKILL_TABLE
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
            .map(|def| def.id)
            .or_else(|| name.parse().ok())
    }

    /// Trigger contexts in which this skill runs.
    pub fn triggers(self) -> &'static [Trigger] {
        use Trigger::*;

        match self {
            Self::FlameBurst
            | Self::InfernoStrike
            | Self::TidalWave
            | Self::StaticShock
            | Self::ChainLightning
            | Self::VenomFang
            | Self::GaleForce
            | Self::HolyStrike
            | Self::ShadowStrike
            | Self::VoidRend
            | Self::FesteringWound
            | Self::VampiricBite => &[OnAttack],
            Self::Overcharge => &[OnAttack, PerTurn],
            Self::BarkSkin
            | Self::ThornArmor
            | Self::EvasiveGust
            | Self::DivineAegis
            | Self::SpikedHide => &[OnDamageTaken],
            Self::PhoenixRebirth => &[OnLethalDamage],
            Self::Regrowth
            | Self::HealingRain
            | Self::TidalBarrier
            | Self::BattleFury
            | Self::IronWill => &[PerTurn],
        }
    }

    pub fn runs_on(self, trigger: Trigger) -> bool {
        self.triggers().contains(&trigger)
    }
}

/// How a proc chance was authored.
///
/// Both forms are kept exactly as written: `Percent(15)` means 15% and
/// `Fraction(0.10)` means 10%.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcChance {
    Percent(u32),
    Fraction(Decimal),
}

impl ProcChance {
    /// Probability in `[0, 1]`.
    pub fn probability(self) -> Decimal {
        match self {
            Self::Percent(percent) => Decimal::from(percent) / Decimal::ONE_HUNDRED,
            Self::Fraction(fraction) => fraction,
        }
    }
}

/// Authored parameters of one skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: &'static str,
    pub chance: ProcChance,
    /// Per-turn ticks to wait after a proc.
    pub cooldown: u32,
    pub magnitude: Decimal,
    pub max_stacks: u32,
    /// Limited uses per battle, if any.
    pub charges: Option<u32>,
}

const fn dec(mantissa: u32, scale: u32) -> Decimal {
    Decimal::from_parts(mantissa, 0, 0, false, scale)
}

const fn def(
    id: SkillId,
    name: &'static str,
    chance: ProcChance,
    cooldown: u32,
    magnitude: Decimal,
) -> SkillDefinition {
    SkillDefinition {
        id,
        name,
        chance,
        cooldown,
        magnitude,
        max_stacks: 1,
        charges: None,
    }
}

/// Ordered like [`SkillId`]; `SkillId as usize` indexes into it.
pub static SKILL_TABLE: [SkillDefinition; 24] = [
    def(SkillId::FlameBurst, "Flame Burst", Percent(15), 2, dec(15, 1)),
    def(SkillId::InfernoStrike, "Inferno Strike", Fraction(dec(10, 2)), 3, dec(20, 2)),
    def(SkillId::TidalWave, "Tidal Wave", Percent(20), 2, dec(13, 1)),
    def(SkillId::StaticShock, "Static Shock", Fraction(dec(12, 2)), 3, dec(1, 0)),
    def(SkillId::ChainLightning, "Chain Lightning", Percent(10), 2, dec(5, 1)),
    SkillDefinition {
        max_stacks: 5,
        ..def(SkillId::VenomFang, "Venom Fang", Percent(25), 1, dec(5, 2))
    },
    def(SkillId::GaleForce, "Gale Force", Fraction(dec(15, 2)), 2, dec(125, 2)),
    def(SkillId::HolyStrike, "Holy Strike", Percent(15), 3, dec(5, 1)),
    def(SkillId::ShadowStrike, "Shadow Strike", Fraction(dec(20, 2)), 2, dec(1, 0)),
    def(SkillId::VoidRend, "Void Rend", Percent(8), 4, dec(1, 0)),
    SkillDefinition {
        max_stacks: 5,
        ..def(SkillId::FesteringWound, "Festering Wound", Percent(20), 2, dec(4, 2))
    },
    def(SkillId::VampiricBite, "Vampiric Bite", Fraction(dec(30, 2)), 2, dec(25, 2)),
    SkillDefinition {
        max_stacks: 5,
        ..def(SkillId::Overcharge, "Overcharge", Percent(100), 0, dec(5, 2))
    },
    def(SkillId::BarkSkin, "Bark Skin", Percent(20), 2, dec(7, 1)),
    def(SkillId::ThornArmor, "Thorn Armor", Fraction(dec(25, 2)), 1, dec(2, 1)),
    def(SkillId::EvasiveGust, "Evasive Gust", Percent(10), 3, dec(0, 0)),
    def(SkillId::DivineAegis, "Divine Aegis", Fraction(dec(15, 2)), 4, dec(5, 1)),
    SkillDefinition {
        charges: Some(1),
        ..def(SkillId::PhoenixRebirth, "Phoenix Rebirth", Fraction(dec(50, 2)), 0, dec(1, 0))
    },
    def(SkillId::SpikedHide, "Spiked Hide", Percent(100), 0, dec(15, 2)),
    def(SkillId::Regrowth, "Regrowth", Percent(30), 3, dec(10, 2)),
    def(SkillId::HealingRain, "Healing Rain", Fraction(dec(20, 2)), 4, dec(5, 2)),
    def(SkillId::TidalBarrier, "Tidal Barrier", Percent(25), 3, dec(15, 2)),
    def(SkillId::BattleFury, "Battle Fury", Fraction(dec(20, 2)), 4, dec(12, 1)),
    def(SkillId::IronWill, "Iron Will", Percent(20), 4, dec(50, 0)),
];

/// Mutable per-battle state of a bound skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillState {
    pub proc_chance: ProcChance,
    pub cooldown: u32,
    pub cooldown_remaining: u32,
    pub stacks: u32,
    pub max_stacks: u32,
    pub magnitude: Decimal,
    pub charges: Option<u32>,
}

impl SkillState {
    pub fn from_definition(def: &SkillDefinition) -> Self {
        Self {
            proc_chance: def.chance,
            cooldown: def.cooldown,
            cooldown_remaining: 0,
            stacks: 0,
            max_stacks: def.max_stacks,
            magnitude: def.magnitude,
            charges: def.charges,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }
}

/// What [`apply_skill_effects`] did with each supplied name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillBinding {
    pub bound: Vec<SkillId>,
    pub non_combat: Vec<String>,
    pub unknown: Vec<String>,
}

pub fn is_non_combat(name: &str) -> bool {
    let name = name.trim();
    NON_COMBAT_SKILLS
        .iter()
        .any(|entry| entry.eq_ignore_ascii_case(name))
}

/// Seeds `combatant`'s skill state from catalog names.
///
/// Non-combat names are skipped silently. Unknown names are reported to
/// `sink` and skipped; binding never fails. Configured proc chance overrides
/// replace the authored chance.
pub fn apply_skill_effects<S: AsRef<str>>(
    combatant: &mut Combatant,
    names: &[S],
    config: &BattleConfig,
    sink: &mut dyn DiagnosticSink,
) -> SkillBinding {
    let mut binding = SkillBinding::default();

    for name in names.iter().map(AsRef::as_ref) {
        if is_non_combat(name) {
            binding.non_combat.push(name.to_string());
            continue;
        }

        let Some(id) = SkillId::from_name(name) else {
            sink.warn(format!(
                "{}: unknown skill '{name}' skipped (table v{SKILL_TABLE_VERSION})",
                combatant.name
            ));
            binding.unknown.push(name.to_string());
            continue;
        };

        let mut state = SkillState::from_definition(id.definition());
        if let Some(chance) = config.proc_chance_override(id.slug()) {
            state.proc_chance = ProcChance::Fraction(chance);
        }
        combatant.skills.insert(id, state);
        binding.bound.push(id);
    }

    binding
}
