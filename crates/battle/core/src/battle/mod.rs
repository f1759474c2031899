//! Battle state machine.
//!
//! ```text
//! NotStarted --start()--> InProgress --step()*--> Finished(BattleResult)
//!                            |
//!                            +-- OpponentTransition::{Idle, Armed}
//! ```
//!
//! Each [`Battle::step`] is one tick: either an armed opponent transition or
//! one actor's turn. Elapsed time is sampled when the tick starts, and the
//! tick is evaluated afterwards in strict order: victory/defeat first, then
//! timeout, then the health tie-break. A kill on the last tick therefore
//! always beats a simultaneous timeout.
//!
//! Checkpoints are saved through [`CheckpointStore`] when the battle starts
//! and on every terminal transition.

mod log;
mod outcome;
mod snapshot;
mod turns;

use std::time::Instant;

use crate::combatant::{Combatant, CombatantId, DefeatPolicy, Team};
use crate::config::BattleConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::BattleError;
use crate::rng::BattleRng;
use crate::skills::{SkillBinding, apply_skill_effects};
use crate::status::EffectRegistry;

pub use log::{BattleLog, LogEntry};
pub use outcome::{AbortReason, BattlePhase, BattleResult, OpponentTransition, Outcome, Side};
pub use snapshot::{BattleSnapshot, CheckpointError, CheckpointStore, CombatantSnapshot, NoopStore};

use turns::TurnSlot;

/// Collaborators a battle calls out to while it runs.
pub struct BattleEnv<'a> {
    pub store: &'a mut dyn CheckpointStore,
    pub diagnostics: &'a mut dyn DiagnosticSink,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        store: &'a mut dyn CheckpointStore,
        diagnostics: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self { store, diagnostics }
    }
}

#[derive(Debug)]
pub struct Battle {
    challengers: Team,
    opponents: Team,
    config: BattleConfig,
    rng: BattleRng,
    registry: EffectRegistry,
    turn_order: Vec<TurnSlot>,
    cursor: usize,
    active_opponent: Option<usize>,
    transition: OpponentTransition,
    log: BattleLog,
    phase: BattlePhase,
    started_at: Option<Instant>,
    ticks: u64,
}

impl Battle {
    /// Sets up an encounter. Pets are benched when the config disallows
    /// them, and the challengers' defeat policy follows
    /// `continue_after_player_death`.
    pub fn new(
        mut challengers: Team,
        mut opponents: Team,
        config: BattleConfig,
        seed: u64,
    ) -> Self {
        if !config.allow_pets {
            challengers.members.retain(|member| !member.is_pet());
            opponents.members.retain(|member| !member.is_pet());
        }
        challengers.policy = if config.continue_after_player_death {
            DefeatPolicy::AllDown
        } else {
            DefeatPolicy::PlayerDown
        };
        let active_opponent = opponents.members.iter().position(Combatant::is_alive);

        Self {
            challengers,
            opponents,
            config,
            rng: BattleRng::new(seed),
            registry: EffectRegistry::with_builtins(),
            turn_order: Vec::new(),
            cursor: 0,
            active_opponent,
            transition: OpponentTransition::Idle,
            log: BattleLog::new(),
            phase: BattlePhase::NotStarted,
            started_at: None,
            ticks: 0,
        }
    }

    pub fn with_rng(mut self, rng: BattleRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = registry;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn challengers(&self) -> &Team {
        &self.challengers
    }

    pub fn opponents(&self) -> &Team {
        &self.opponents
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Challengers => &self.challengers,
            Side::Opponents => &self.opponents,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn phase(&self) -> &BattlePhase {
        &self.phase
    }

    pub fn result(&self) -> Option<&BattleResult> {
        match &self.phase {
            BattlePhase::Finished(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, BattlePhase::Finished(_))
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn transition(&self) -> OpponentTransition {
        self.transition
    }

    pub fn active_opponent(&self) -> Option<&Combatant> {
        self.active_opponent
            .and_then(|index| self.opponents.members.get(index))
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.challengers.get(id).or_else(|| self.opponents.get(id))
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            seed: self.rng.seed(),
            rng_draws: self.rng.draws(),
            ticks: self.ticks,
            phase: self.phase.as_str().to_string(),
            result: self.result().cloned(),
            active_opponent: self.active_opponent().map(|opponent| opponent.id),
            transition: self.transition,
            log_len: self.log.len() as u64,
            challengers: BattleSnapshot::team(&self.challengers),
            opponents: BattleSnapshot::team(&self.opponents),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Seeds a combatant's skills from catalog names. Only allowed before the
    /// battle starts.
    pub fn bind_skills<S: AsRef<str>>(
        &mut self,
        id: CombatantId,
        names: &[S],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<SkillBinding, BattleError> {
        if self.phase != BattlePhase::NotStarted {
            return Err(BattleError::AlreadyStarted);
        }
        let config = &self.config;
        let combatant = self
            .challengers
            .get_mut(id)
            .or_else(|| self.opponents.get_mut(id))
            .ok_or(BattleError::CombatantNotFound(id))?;
        Ok(apply_skill_effects(combatant, names, config, sink))
    }

    /// Starts the clock and saves the opening checkpoint. If that save
    /// fails the battle ends immediately as
    /// `Aborted(CheckpointFailed)`.
    pub fn start(&mut self, now: Instant, env: &mut BattleEnv<'_>) -> Result<(), BattleError> {
        if self.phase != BattlePhase::NotStarted {
            return Err(BattleError::AlreadyStarted);
        }
        self.phase = BattlePhase::InProgress;
        self.started_at = Some(now);
        self.log.push(format!(
            "{} challenge {}!",
            self.challengers.name, self.opponents.name
        ));
        if let Some(opponent) = self.active_opponent() {
            let line = format!("{} steps forward.", opponent.name);
            self.log.push(line);
        }
        self.reshuffle();

        if let Err(err) = env.store.save(&self.snapshot()) {
            env.diagnostics
                .warn(format!("opening checkpoint failed: {err}"));
            let result = BattleResult::undecided(
                Outcome::Aborted(AbortReason::CheckpointFailed),
                self.ticks,
            );
            self.finish(result, env);
        }
        Ok(())
    }

    /// Runs one tick. Returns the result once the battle is over; stepping a
    /// finished battle keeps returning the same result.
    pub fn step(
        &mut self,
        now: Instant,
        env: &mut BattleEnv<'_>,
    ) -> Result<Option<BattleResult>, BattleError> {
        let started_at = match &self.phase {
            BattlePhase::NotStarted => return Err(BattleError::NotStarted),
            BattlePhase::Finished(result) => return Ok(Some(result.clone())),
            BattlePhase::InProgress => self.started_at.unwrap_or(now),
        };
        let elapsed = now.saturating_duration_since(started_at);
        self.ticks += 1;

        if self.transition == OpponentTransition::Armed {
            self.perform_transition();
        } else {
            let living_before = self.living_count();
            let acted = match self.advance() {
                Some(slot) => self.actor_turn(slot, &mut *env.diagnostics),
                None => false,
            };
            if !acted && self.decisive().is_none() {
                let result = BattleResult::undecided(
                    Outcome::Aborted(AbortReason::NoLivingTarget),
                    self.ticks,
                );
                return Ok(Some(self.finish(result, env)));
            }
            if self.living_count() != living_before {
                self.reshuffle();
            }
            self.arm_transition();
        }

        let Some(result) = self.evaluate(elapsed) else {
            return Ok(None);
        };
        Ok(Some(self.finish(result, env)))
    }

    /// Ends the battle without a decision. Aborting a finished battle
    /// returns its existing result.
    pub fn abort(&mut self, reason: AbortReason, env: &mut BattleEnv<'_>) -> BattleResult {
        if let BattlePhase::Finished(result) = &self.phase {
            return result.clone();
        }
        let result = BattleResult::undecided(Outcome::Aborted(reason), self.ticks);
        self.finish(result, env)
    }

    /// Victory or defeat, if either side is down. Opponents are checked
    /// first, so a mutual knockout counts as a victory.
    fn decisive(&self) -> Option<BattleResult> {
        if self.opponents.is_defeated() {
            Some(BattleResult::decided(Outcome::Victory, Side::Challengers, self.ticks))
        } else if self.challengers.is_defeated() {
            Some(BattleResult::decided(Outcome::Defeat, Side::Opponents, self.ticks))
        } else {
            None
        }
    }

    fn evaluate(&self, elapsed: std::time::Duration) -> Option<BattleResult> {
        if let Some(result) = self.decisive() {
            return Some(result);
        }
        if elapsed >= self.config.timeout() {
            return Some(BattleResult::by_health(
                self.challengers.hp_fraction(),
                self.opponents.hp_fraction(),
                self.ticks,
            ));
        }
        None
    }

    fn finish(&mut self, result: BattleResult, env: &mut BattleEnv<'_>) -> BattleResult {
        self.phase = BattlePhase::Finished(result.clone());
        self.log.push(match result.winner {
            Some(side) => format!("Battle over: {} ({} win).", result.outcome, side),
            None => format!("Battle over: {}.", result.outcome),
        });
        if let Err(err) = env.store.save(&self.snapshot()) {
            env.diagnostics
                .warn(format!("terminal checkpoint failed: {err}"));
        }
        result
    }

    fn living_count(&self) -> usize {
        self.challengers.living().count() + self.opponents.living().count()
    }
}
