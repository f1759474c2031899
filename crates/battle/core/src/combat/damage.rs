//! Armor mitigation and shield absorption.

use rust_decimal::Decimal;

use crate::combatant::{ActionFlags, TransientState};

/// Applies armor to `raw` damage.
///
/// Precedence:
///
/// ```text
/// bypass-all / true / ignore-armor   total = raw
/// partial true damage p              total = max(raw - p - armor, floor) + p
/// otherwise                          total = max(raw - armor, floor)
/// ```
///
/// Returns `(total, shield_bypass)`, where `shield_bypass <= total` is the
/// part of the hit that skips the shield.
pub fn mitigate(
    raw: Decimal,
    armor: Decimal,
    transient: &TransientState,
    floor: Decimal,
) -> (Decimal, Decimal) {
    if raw <= Decimal::ZERO {
        return (Decimal::ZERO, Decimal::ZERO);
    }
    let armor = armor.max(Decimal::ZERO);
    let flags = transient.flags;

    let total = if flags.intersects(ActionFlags::ARMOR_PIERCING) {
        raw
    } else if transient.partial_true_damage > Decimal::ZERO {
        let partial = transient.partial_true_damage.min(raw);
        (raw - partial - armor).max(floor) + partial
    } else {
        (raw - armor).max(floor)
    };

    let bypass = if flags.contains(ActionFlags::BYPASS_ALL_DEFENSES) {
        total
    } else {
        transient.pending_bypass_shield.max(Decimal::ZERO).min(total)
    };

    (total, bypass)
}

/// Splits `total` between `shield` and health. Only `total - bypass` may be
/// absorbed. Returns `(absorbed, hp_damage)` and drains the shield.
pub fn absorb_with_shield(
    total: Decimal,
    bypass: Decimal,
    shield: &mut Decimal,
) -> (Decimal, Decimal) {
    let shieldable = (total - bypass).max(Decimal::ZERO);
    let absorbed = shieldable.min(*shield).max(Decimal::ZERO);
    *shield -= absorbed;
    (absorbed, total - absorbed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn with_flags(flags: ActionFlags) -> TransientState {
        TransientState {
            flags,
            ..TransientState::default()
        }
    }

    #[test]
    fn armor_never_pushes_below_floor() {
        let clear = TransientState::default();
        for raw in [1, 5, 50, 99, 100, 150, 10_000] {
            let (total, _) = mitigate(d(raw), d(100), &clear, d(10));
            assert!(total >= d(10), "raw {raw} gave {total}");
        }
        assert_eq!(mitigate(d(150), d(100), &clear, d(10)).0, d(50));
    }

    #[test]
    fn piercing_flags_ignore_armor_and_floor() {
        for flag in [
            ActionFlags::IGNORE_ARMOR,
            ActionFlags::TRUE_DAMAGE,
            ActionFlags::BYPASS_ALL_DEFENSES,
        ] {
            let (total, _) = mitigate(d(5), d(100), &with_flags(flag), d(10));
            assert_eq!(total, d(5));
        }
    }

    #[test]
    fn bypass_all_skips_the_shield_entirely() {
        let (total, bypass) = mitigate(
            d(400),
            d(100),
            &with_flags(ActionFlags::BYPASS_ALL_DEFENSES),
            d(10),
        );
        let mut shield = d(1_000);
        let (absorbed, hp) = absorb_with_shield(total, bypass, &mut shield);
        assert_eq!((absorbed, hp), (d(0), d(400)));
        assert_eq!(shield, d(1_000));
    }

    #[test]
    fn partial_true_damage_splits_the_hit() {
        let transient = TransientState {
            partial_true_damage: d(500),
            pending_bypass_shield: d(500),
            ..TransientState::default()
        };
        let (total, bypass) = mitigate(d(1_000), d(200), &transient, d(10));
        assert_eq!((total, bypass), (d(800), d(500)));

        let mut shield = d(300);
        let (absorbed, hp) = absorb_with_shield(total, bypass, &mut shield);
        assert_eq!((absorbed, hp, shield), (d(300), d(500), d(0)));
    }

    #[test]
    fn non_positive_raw_deals_nothing() {
        let clear = TransientState::default();
        assert_eq!(mitigate(d(0), d(0), &clear, d(10)), (d(0), d(0)));
        assert_eq!(mitigate(d(-3), d(0), &clear, d(10)), (d(0), d(0)));
    }
}
