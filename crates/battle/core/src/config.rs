//! Battle configuration: toggleable rules and tunable parameters.
//!
//! Every field has a documented default. Loading never fails because of a
//! missing or unrecognized key: serde fills gaps from [`BattleConfig::default`]
//! and [`BattleConfig::from_toggles`] reports unknown keys instead of
//! rejecting them.

use std::collections::BTreeMap;
use std::time::Duration;

use rust_decimal::Decimal;

/// Rules and tuning for a single encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Pets may fight alongside their owner. When disabled, pets are benched
    /// before the battle starts.
    pub allow_pets: bool,

    /// Apply `Combatant::class_bonus` multipliers to raw damage.
    pub class_bonus_enabled: bool,

    /// Apply the elemental advantage modifier to raw damage.
    pub elemental_effects_enabled: bool,

    /// Return a share of mitigated damage to the attacker.
    pub damage_reflection_enabled: bool,

    /// Allow the once-per-battle `Combatant::cheat_death` roll.
    pub cheat_death_enabled: bool,

    /// Keep fighting with pets after the player falls. When disabled the
    /// challengers lose as soon as their player is down.
    pub continue_after_player_death: bool,

    /// Player-side attacks always land.
    pub guaranteed_player_hits: bool,

    /// Per-skill proc chance overrides keyed by skill slug, as a probability
    /// in `[0, 1]`.
    pub proc_chance_overrides: BTreeMap<String, Decimal>,

    /// Probability that a scripted opponent misses.
    pub monster_miss_chance: Decimal,

    /// Base hit probability for player-side combatants before luck.
    pub base_hit_chance: Decimal,

    /// Hit probability added per point of luck.
    pub luck_hit_bonus: Decimal,

    /// Upper bound of the flat random variance added to base damage.
    pub damage_variance: u32,

    /// Post-armor damage never drops below this unless a bypass flag is set.
    pub minimum_damage: Decimal,

    /// Relative weight of the player when opponents pick a target.
    pub player_target_weight: u32,

    /// Relative weight of each pet when opponents pick a target.
    pub pet_target_weight: u32,

    /// Wall-clock budget for the whole encounter.
    pub timeout_secs: u64,
}

impl BattleConfig {
    // ===== compile-time limits =====
    pub const MAX_STATUS_EFFECTS: usize = 16;
    pub const MAX_TEAM_SIZE: usize = 12;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MONSTER_MISS_CHANCE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
    pub const DEFAULT_BASE_HIT_CHANCE: Decimal = Decimal::from_parts(90, 0, 0, false, 2);
    pub const DEFAULT_LUCK_HIT_BONUS: Decimal = Decimal::from_parts(5, 0, 0, false, 3);
    pub const DEFAULT_DAMAGE_VARIANCE: u32 = 100;
    pub const DEFAULT_MINIMUM_DAMAGE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
    pub const DEFAULT_PLAYER_TARGET_WEIGHT: u32 = 3;
    pub const DEFAULT_PET_TARGET_WEIGHT: u32 = 1;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

    pub fn new() -> Self {
        Self {
            allow_pets: true,
            class_bonus_enabled: true,
            elemental_effects_enabled: true,
            damage_reflection_enabled: true,
            cheat_death_enabled: true,
            continue_after_player_death: false,
            guaranteed_player_hits: false,
            proc_chance_overrides: BTreeMap::new(),
            monster_miss_chance: Self::DEFAULT_MONSTER_MISS_CHANCE,
            base_hit_chance: Self::DEFAULT_BASE_HIT_CHANCE,
            luck_hit_bonus: Self::DEFAULT_LUCK_HIT_BONUS,
            damage_variance: Self::DEFAULT_DAMAGE_VARIANCE,
            minimum_damage: Self::DEFAULT_MINIMUM_DAMAGE,
            player_target_weight: Self::DEFAULT_PLAYER_TARGET_WEIGHT,
            pet_target_weight: Self::DEFAULT_PET_TARGET_WEIGHT,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Encounter timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Proc chance override for a skill slug, if one is configured.
    pub fn proc_chance_override(&self, slug: &str) -> Option<Decimal> {
        self.proc_chance_overrides.get(slug).copied()
    }

    pub fn with_proc_chance_override(mut self, slug: impl Into<String>, chance: Decimal) -> Self {
        self.proc_chance_overrides.insert(slug.into(), chance);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_guaranteed_player_hits(mut self, enabled: bool) -> Self {
        self.guaranteed_player_hits = enabled;
        self
    }

    /// Builds a config from loosely-typed `(key, value)` toggles.
    ///
    /// Unknown keys and values of the wrong shape are skipped and returned so
    /// the caller can log them; the corresponding fields keep their defaults.
    /// Proc chance overrides use the key form `proc_chance.<skill_slug>`.
    pub fn from_toggles<'a, I>(toggles: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (&'a str, ToggleValue)>,
    {
        let mut config = Self::new();
        let mut ignored = Vec::new();

        for (key, value) in toggles {
            if !config.apply_toggle(key, value) {
                ignored.push(key.to_string());
            }
        }

        (config, ignored)
    }

    /// Applies one toggle. Returns `false` when the key or value shape is not
    /// recognized; the config is left untouched in that case.
    pub fn apply_toggle(&mut self, key: &str, value: ToggleValue) -> bool {
        if let Some(slug) = key.strip_prefix("proc_chance.") {
            return match value.as_number() {
                Some(chance) if !slug.is_empty() => {
                    self.proc_chance_overrides.insert(slug.to_string(), chance);
                    true
                }
                _ => false,
            };
        }

        match (key, value) {
            ("allow_pets", ToggleValue::Flag(v)) => self.allow_pets = v,
            ("class_bonus_enabled", ToggleValue::Flag(v)) => self.class_bonus_enabled = v,
            ("elemental_effects_enabled", ToggleValue::Flag(v)) => {
                self.elemental_effects_enabled = v
            }
            ("damage_reflection_enabled", ToggleValue::Flag(v)) => {
                self.damage_reflection_enabled = v
            }
            ("cheat_death_enabled", ToggleValue::Flag(v)) => self.cheat_death_enabled = v,
            ("continue_after_player_death", ToggleValue::Flag(v)) => {
                self.continue_after_player_death = v
            }
            ("guaranteed_player_hits", ToggleValue::Flag(v)) => self.guaranteed_player_hits = v,
            ("monster_miss_chance", ToggleValue::Number(v)) => self.monster_miss_chance = v,
            ("base_hit_chance", ToggleValue::Number(v)) => self.base_hit_chance = v,
            ("luck_hit_bonus", ToggleValue::Number(v)) => self.luck_hit_bonus = v,
            ("minimum_damage", ToggleValue::Number(v)) => self.minimum_damage = v,
            ("damage_variance", value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(v) => self.damage_variance = v,
                None => return false,
            },
            ("player_target_weight", value) => {
                match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    Some(v) => self.player_target_weight = v,
                    None => return false,
                }
            }
            ("pet_target_weight", value) => {
                match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                    Some(v) => self.pet_target_weight = v,
                    None => return false,
                }
            }
            ("timeout_secs", value) => match value.as_u64() {
                Some(v) => self.timeout_secs = v,
                None => return false,
            },
            _ => return false,
        }

        true
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A loosely-typed toggle value supplied by an external caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleValue {
    Flag(bool),
    Number(Decimal),
}

impl ToggleValue {
    fn as_number(self) -> Option<Decimal> {
        match self {
            Self::Number(v) => Some(v),
            Self::Flag(_) => None,
        }
    }

    fn as_u64(self) -> Option<u64> {
        use rust_decimal::prelude::ToPrimitive;

        match self {
            Self::Number(v) if v.fract().is_zero() && !v.is_sign_negative() => v.to_u64(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_toggles_fall_back_to_defaults() {
        let (config, ignored) = BattleConfig::from_toggles([
            ("allow_pets", ToggleValue::Flag(false)),
            ("summon_dragons", ToggleValue::Flag(true)),
            ("timeout_secs", ToggleValue::Flag(true)),
            ("damage_variance", ToggleValue::Number(Decimal::new(25, 0))),
        ]);

        assert!(!config.allow_pets);
        assert_eq!(config.damage_variance, 25);
        assert_eq!(config.timeout_secs, BattleConfig::DEFAULT_TIMEOUT_SECS);
        assert_eq!(ignored, vec!["summon_dragons", "timeout_secs"]);
    }

    #[test]
    fn proc_chance_overrides_are_keyed_by_slug() {
        let (config, ignored) = BattleConfig::from_toggles([
            ("proc_chance.flame_burst", ToggleValue::Number(Decimal::ONE)),
            ("proc_chance.", ToggleValue::Number(Decimal::ONE)),
        ]);

        assert_eq!(config.proc_chance_override("flame_burst"), Some(Decimal::ONE));
        assert_eq!(ignored, vec!["proc_chance."]);
    }

    #[test]
    fn fractional_counts_are_rejected() {
        let mut config = BattleConfig::default();
        assert!(!config.apply_toggle("damage_variance", ToggleValue::Number(Decimal::new(15, 1))));
        assert_eq!(config.damage_variance, BattleConfig::DEFAULT_DAMAGE_VARIANCE);
    }
}
