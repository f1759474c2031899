//! Hit rolls.

use rust_decimal::Decimal;

use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::rng::BattleRng;

/// Probability that `attacker` lands a hit, in `[0, 1]`.
///
/// ```text
/// player side: base_hit_chance + luck * luck_hit_bonus   (1 if guaranteed)
/// monsters:    1 - monster_miss_chance
/// ```
pub fn hit_chance(attacker: &Combatant, config: &BattleConfig) -> Decimal {
    let chance = if attacker.is_player_side() {
        if config.guaranteed_player_hits {
            return Decimal::ONE;
        }
        config.base_hit_chance + attacker.luck.max(Decimal::ZERO) * config.luck_hit_bonus
    } else {
        Decimal::ONE - config.monster_miss_chance
    };
    chance.clamp(Decimal::ZERO, Decimal::ONE)
}

/// Rolls a hit. Guaranteed hits consume no randomness.
pub fn roll_hit(attacker: &Combatant, config: &BattleConfig, rng: &mut BattleRng) -> bool {
    let chance = hit_chance(attacker, config);
    chance >= Decimal::ONE || rng.chance(chance)
}
