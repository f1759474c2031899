use bitflags::bitflags;
use rust_decimal::Decimal;

bitflags! {
    /// Per-action modifiers raised by skills during a single resolution step.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionFlags: u8 {
        /// Skip armor for this hit.
        const IGNORE_ARMOR        = 1 << 0;
        /// The whole hit is true damage: no armor, no floor.
        const TRUE_DAMAGE         = 1 << 1;
        /// Skip armor and shield entirely.
        const BYPASS_ALL_DEFENSES = 1 << 2;
        /// The defender survives this hit at 1 HP or more.
        const CANNOT_DIE          = 1 << 3;
    }
}

impl ActionFlags {
    /// Flags under which armor is not applied at all.
    pub const ARMOR_PIERCING: Self = Self::IGNORE_ARMOR
        .union(Self::TRUE_DAMAGE)
        .union(Self::BYPASS_ALL_DEFENSES);
}

/// State that lives for exactly one attack resolution.
///
/// Written by skill handlers, read by mitigation, and cleared before the
/// next resolution step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransientState {
    pub flags: ActionFlags,
    /// Portion of the hit that skips armor.
    pub partial_true_damage: Decimal,
    /// Portion of the hit that skips the shield.
    pub pending_bypass_shield: Decimal,
    pub lifesteal_ratio: Decimal,
    pub reflect_ratio: Decimal,
}

impl TransientState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}
