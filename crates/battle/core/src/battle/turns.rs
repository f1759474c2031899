//! Turn order, actor turns and opponent succession.

use super::{Battle, OpponentTransition, Side};
use crate::combat::{ResolveContext, resolve_attack};
use crate::combatant::{Combatant, CombatantId, Team};
use crate::config::BattleConfig;
use crate::diagnostics::DiagnosticSink;
use crate::rng::BattleRng;
use crate::skills::SkillResolver;

/// Position of one combatant in the turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TurnSlot {
    pub side: Side,
    pub index: usize,
}

impl Battle {
    /// The combatant who acts on the next tick, or `None` when the next tick
    /// is an opponent transition or nobody can act.
    pub fn peek_next_actor(&self) -> Option<CombatantId> {
        if self.transition == OpponentTransition::Armed {
            return None;
        }
        let slot = self.turn_order[self.next_position()?];
        self.member(slot).map(|member| member.id)
    }

    /// Rebuilds the turn order from living challengers and the active
    /// opponent, shuffled with the battle RNG.
    pub(super) fn reshuffle(&mut self) {
        let mut order: Vec<TurnSlot> = self
            .challengers
            .members
            .iter()
            .enumerate()
            .filter(|(_, member)| member.is_alive())
            .map(|(index, _)| TurnSlot {
                side: Side::Challengers,
                index,
            })
            .collect();
        if let Some(index) = self.active_opponent
            && self
                .opponents
                .members
                .get(index)
                .is_some_and(Combatant::is_alive)
        {
            order.push(TurnSlot {
                side: Side::Opponents,
                index,
            });
        }
        self.rng.shuffle(&mut order);
        self.turn_order = order;
        self.cursor = 0;
    }

    /// Claims the next living slot and moves the cursor past it.
    pub(super) fn advance(&mut self) -> Option<TurnSlot> {
        let position = self.next_position()?;
        self.cursor = (position + 1) % self.turn_order.len();
        Some(self.turn_order[position])
    }

    /// Runs one actor's turn. Returns `false` when the actor had no living
    /// target to attack.
    pub(super) fn actor_turn(
        &mut self,
        slot: TurnSlot,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> bool {
        let Self {
            challengers,
            opponents,
            config,
            rng,
            registry,
            log,
            active_opponent,
            ..
        } = self;
        let (own, other) = match slot.side {
            Side::Challengers => (challengers, opponents),
            Side::Opponents => (opponents, challengers),
        };
        let Some(actor) = own.members.get_mut(slot.index) else {
            return true;
        };

        log.extend(actor.start_turn(rng));
        if !actor.is_alive() {
            log.push(format!("{} succumbs before acting.", actor.name));
            return true;
        }
        log.extend(SkillResolver::new(rng, registry).per_turn(actor));

        if actor.can_act() {
            let target = match slot.side {
                Side::Challengers => (*active_opponent)
                    .filter(|&index| other.members.get(index).is_some_and(Combatant::is_alive)),
                Side::Opponents => choose_target(other, config, rng),
            };
            let Some(defender) = target.and_then(|index| other.members.get_mut(index)) else {
                return false;
            };
            let mut ctx = ResolveContext {
                rng: &mut *rng,
                registry: &*registry,
                config: &*config,
                diagnostics,
            };
            let report = resolve_attack(actor, defender, &mut ctx);
            log.extend(report.messages);
        } else {
            log.push(format!("{} is unable to act.", actor.name));
        }

        if actor.is_alive() {
            log.extend(actor.end_turn(rng));
        }
        true
    }

    /// Arms the succession when the active opponent has fallen and another
    /// is still standing.
    pub(super) fn arm_transition(&mut self) {
        if self.transition == OpponentTransition::Armed {
            return;
        }
        let Some(fallen) = self
            .active_opponent()
            .filter(|opponent| !opponent.is_alive())
            .map(|opponent| opponent.name.clone())
        else {
            return;
        };
        if self.opponents.living().next().is_some() {
            self.transition = OpponentTransition::Armed;
            self.log
                .push(format!("{fallen} has fallen! Another foe approaches..."));
        }
    }

    /// Brings the next living opponent forward. Runs as a tick of its own.
    pub(super) fn perform_transition(&mut self) {
        self.transition = OpponentTransition::Idle;
        let Some(index) = self.opponents.members.iter().position(Combatant::is_alive) else {
            return;
        };
        self.active_opponent = Some(index);
        let line = format!("{} steps forward.", self.opponents.members[index].name);
        self.log.push(line);
        self.reshuffle();
    }

    fn next_position(&self) -> Option<usize> {
        let len = self.turn_order.len();
        (0..len)
            .map(|offset| (self.cursor + offset) % len)
            .find(|&position| {
                self.member(self.turn_order[position])
                    .is_some_and(Combatant::is_alive)
            })
    }

    fn member(&self, slot: TurnSlot) -> Option<&Combatant> {
        self.team(slot.side).members.get(slot.index)
    }
}

/// Weighted pick among living challengers: players draw fire more often
/// than pets. Falls back to a uniform pick when every weight is zero.
fn choose_target(team: &Team, config: &BattleConfig, rng: &mut BattleRng) -> Option<usize> {
    let candidates: Vec<(usize, u32)> = team
        .members
        .iter()
        .enumerate()
        .filter(|(_, member)| member.is_alive())
        .map(|(index, member)| {
            let weight = if member.is_player() {
                config.player_target_weight
            } else {
                config.pet_target_weight
            };
            (index, weight)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let weights: Vec<u32> = candidates.iter().map(|(_, weight)| *weight).collect();
    let pick = match rng.weighted_index(&weights) {
        Some(pick) => pick,
        None => rng.range(0, candidates.len() as u32 - 1) as usize,
    };
    candidates.get(pick).map(|(index, _)| *index)
}
