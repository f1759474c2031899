//! Elemental affinities and the advantage graph.

use rust_decimal::Decimal;

use crate::diagnostics::DiagnosticSink;
use crate::rng::BattleRng;

/// A combatant's damage-type affiliation.
///
/// Advantage is a directed graph: each element counters at most one other.
///
/// ```text
/// Light -> Corrupted -> Dark -> Light
/// Nature -> Electric -> Water -> Fire -> Nature
/// Wind -> Electric
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    Light,
    Dark,
    Corrupted,
    Nature,
    Electric,
    Water,
    Fire,
    Wind,
    #[default]
    Unknown,
}

impl Element {
    /// Lower bound of the advantage swing.
    pub const MIN_MODIFIER: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
    /// Upper bound of the advantage swing.
    pub const MAX_MODIFIER: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

    /// The element this one has advantage over, if any.
    pub const fn counter(self) -> Option<Element> {
        match self {
            Self::Light => Some(Self::Corrupted),
            Self::Corrupted => Some(Self::Dark),
            Self::Dark => Some(Self::Light),
            Self::Nature => Some(Self::Electric),
            Self::Electric => Some(Self::Water),
            Self::Water => Some(Self::Fire),
            Self::Fire => Some(Self::Nature),
            Self::Wind => Some(Self::Electric),
            Self::Unknown => None,
        }
    }

    pub fn counters(self, other: Element) -> bool {
        self.counter() == Some(other)
    }
}

/// Relative damage modifier for `attacker` hitting `defender`.
///
/// Advantage yields a uniform value in `[0.10, 0.30]` at two decimal places,
/// disadvantage its negation, anything else zero. The result is applied as
/// `raw * (1 + modifier)`. Neutral pairings consume no randomness; pairings
/// involving [`Element::Unknown`] are reported to `sink`.
pub fn elemental_modifier(
    attacker: Element,
    defender: Element,
    rng: &mut BattleRng,
    sink: &mut dyn DiagnosticSink,
) -> Decimal {
    let modifier = if attacker.counters(defender) {
        rng.uniform_decimal(Element::MIN_MODIFIER, Element::MAX_MODIFIER, 2)
    } else if defender.counters(attacker) {
        -rng.uniform_decimal(Element::MIN_MODIFIER, Element::MAX_MODIFIER, 2)
    } else {
        if attacker == Element::Unknown || defender == Element::Unknown {
            sink.debug(format!("no elemental affinity for {attacker} -> {defender}"));
        }
        return Decimal::ZERO;
    };

    sink.debug(format!("elemental modifier {attacker} -> {defender}: {modifier}"));
    modifier
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::diagnostics::{NullSink, VecSink};

    fn modifier(a: Element, b: Element, seed: u64) -> Decimal {
        elemental_modifier(a, b, &mut BattleRng::new(seed), &mut NullSink)
    }

    #[test]
    fn advantage_is_antisymmetric() {
        for (seed, a) in Element::iter().enumerate() {
            for b in Element::iter() {
                let forward = modifier(a, b, seed as u64);
                let backward = modifier(b, a, seed as u64);
                assert_eq!(forward > Decimal::ZERO, backward < Decimal::ZERO, "{a} vs {b}");
                assert!(forward.abs() <= Element::MAX_MODIFIER);
                if !forward.is_zero() {
                    assert!(forward.abs() >= Element::MIN_MODIFIER);
                }
            }
        }
    }

    #[test]
    fn same_element_and_unknown_are_neutral() {
        for e in Element::iter() {
            assert!(modifier(e, e, 3).is_zero());
            assert!(modifier(e, Element::Unknown, 3).is_zero());
            assert!(modifier(Element::Unknown, e, 3).is_zero());
        }
    }

    #[test]
    fn wind_and_nature_both_counter_electric() {
        assert!(Element::Wind.counters(Element::Electric));
        assert!(Element::Nature.counters(Element::Electric));
        assert!(!Element::Electric.counters(Element::Wind));
        assert!(modifier(Element::Electric, Element::Wind, 5) < Decimal::ZERO);
    }

    #[test]
    fn swings_are_reported_to_the_sink() {
        let mut sink = VecSink::new();
        let mut rng = BattleRng::fixed();
        let value = elemental_modifier(Element::Fire, Element::Nature, &mut rng, &mut sink);
        assert_eq!(value, Element::MIN_MODIFIER);
        assert_eq!(sink.entries.len(), 1);
    }

    #[test]
    fn unmapped_elements_are_reported_but_neutral() {
        let mut sink = VecSink::new();
        let mut rng = BattleRng::fixed();

        let value = elemental_modifier(Element::Unknown, Element::Fire, &mut rng, &mut sink);
        assert!(value.is_zero());
        assert_eq!(sink.entries.len(), 1);
        assert!(sink.entries[0].1.contains("no elemental affinity"));

        elemental_modifier(Element::Fire, Element::Fire, &mut rng, &mut sink);
        assert_eq!(sink.entries.len(), 1);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Corrupted".parse::<Element>(), Ok(Element::Corrupted));
        assert_eq!(Element::Wind.as_ref(), "wind");
    }
}
