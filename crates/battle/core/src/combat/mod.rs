//! Combat resolution.
//!
//! Pure functions that turn one attack into a damage breakdown and apply it
//! to the two combatants involved. The battle state machine decides who
//! attacks whom; this module decides what happens when they do.
//!
//! - `resolve_attack`: hit roll, raw damage, then `apply_hit`
//! - `apply_hit`: skills, effect hooks, armor, shield, death prevention,
//!   lifesteal and reflection
//! - `mitigate` / `absorb_with_shield`: the damage pipeline's arithmetic

pub mod damage;
pub mod hit;
pub mod result;

pub use damage::{absorb_with_shield, mitigate};
pub use hit::{hit_chance, roll_hit};
pub use result::{
    AttackOutcome, AttackReport, DamageBreakdown, ResolveContext, apply_hit, resolve_attack,
};
