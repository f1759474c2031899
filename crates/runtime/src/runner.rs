//! Encounter orchestration.
//!
//! Each encounter runs in its own tokio task and owns its [`Battle`]
//! outright; encounters share nothing but the checkpoint repository and the
//! presenter, both of which synchronize internally.
//!
//! Per tick the task presents fresh log entries, checks for cancellation,
//! steps the battle, and sleeps for the pacing delay.

use std::sync::Arc;
use std::time::Instant;

use battle_content::EncounterSpec;
use battle_core::{AbortReason, Battle, BattleEnv, BattleResult, LogEntry};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::RuntimeConfig;
use crate::diagnostics::TracingSink;
use crate::error::{Result, RuntimeError};
use crate::presenter::{ChannelPresenter, EncounterEvent, NullPresenter, Presenter};
use crate::repository::{CheckpointRepository, InMemoryCheckpointRepository, RepositoryStore};

/// What a finished encounter leaves behind.
#[derive(Debug, Clone)]
pub struct EncounterReport {
    pub encounter_id: String,
    pub result: BattleResult,
    pub log: Vec<LogEntry>,
    /// Checkpoints successfully written.
    pub checkpoints: u64,
}

/// Launches encounters.
pub struct EncounterRunner {
    config: RuntimeConfig,
    repository: Arc<dyn CheckpointRepository>,
    presenter: Arc<dyn Presenter>,
}

impl EncounterRunner {
    pub fn new(
        config: RuntimeConfig,
        repository: Arc<dyn CheckpointRepository>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            config,
            repository,
            presenter,
        }
    }

    /// Runner with an in-memory repository and no presenter.
    pub fn headless(config: RuntimeConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryCheckpointRepository::new()),
            Arc::new(NullPresenter),
        )
    }

    /// Runner with an in-memory repository that narrates over a channel of
    /// `config.event_buffer_size` events.
    pub fn narrated(config: RuntimeConfig) -> (Self, mpsc::Receiver<EncounterEvent>) {
        let (presenter, rx) = ChannelPresenter::channel(config.event_buffer_size);
        let runner = Self::new(
            config,
            Arc::new(InMemoryCheckpointRepository::new()),
            Arc::new(presenter),
        );
        (runner, rx)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn CheckpointRepository> {
        &self.repository
    }

    /// Builds a battle from an encounter spec using the runtime's rules.
    pub fn prepare(&self, encounter_id: &str, spec: &EncounterSpec) -> Result<Battle> {
        let mut sink = TracingSink::new(encounter_id);
        spec.build(self.config.battle.clone(), &mut sink)
            .map_err(|e| RuntimeError::Content(e.to_string()))
    }

    /// Starts `battle` in its own task.
    pub fn spawn(&self, encounter_id: impl Into<String>, battle: Battle) -> EncounterHandle {
        let encounter_id = encounter_id.into();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let task = EncounterTask {
            encounter_id: encounter_id.clone(),
            battle,
            repository: Arc::clone(&self.repository),
            presenter: Arc::clone(&self.presenter),
            pacing: self.config.pacing,
            cancel: cancel_rx,
        };
        let span = tracing::info_span!("encounter", id = %encounter_id);
        let join = tokio::spawn(task.run().instrument(span));

        EncounterHandle {
            encounter_id,
            join,
            cancel: cancel_tx,
        }
    }

    /// Runs `battle` to completion.
    pub async fn run(
        &self,
        encounter_id: impl Into<String>,
        battle: Battle,
    ) -> Result<EncounterReport> {
        self.spawn(encounter_id, battle).join().await
    }
}

/// Handle to a running encounter.
pub struct EncounterHandle {
    encounter_id: String,
    join: JoinHandle<Result<EncounterReport>>,
    cancel: watch::Sender<bool>,
}

impl EncounterHandle {
    pub fn encounter_id(&self) -> &str {
        &self.encounter_id
    }

    /// Asks the encounter to stop. Honored at the start of its next tick.
    pub fn cancel(&self) {
        // The task may already be gone; nothing to cancel then.
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn join(self) -> Result<EncounterReport> {
        self.join.await.map_err(RuntimeError::WorkerJoin)?
    }
}

struct EncounterTask {
    encounter_id: String,
    battle: Battle,
    repository: Arc<dyn CheckpointRepository>,
    presenter: Arc<dyn Presenter>,
    pacing: std::time::Duration,
    cancel: watch::Receiver<bool>,
}

impl EncounterTask {
    async fn run(mut self) -> Result<EncounterReport> {
        let mut store = RepositoryStore::new(Arc::clone(&self.repository), &self.encounter_id);
        let mut sink = TracingSink::new(&self.encounter_id);

        tracing::info!(
            challengers = %self.battle.challengers().name,
            opponents = %self.battle.opponents().name,
            "encounter started"
        );
        {
            let mut env = BattleEnv::new(&mut store, &mut sink);
            self.battle.start(now(), &mut env)?;
        }

        let mut presented = 0u64;
        let result = loop {
            let fresh = self.battle.log().since(presented).to_vec();
            presented = self.battle.log().len() as u64;

            if let Err(err) = self.presenter.present(&self.encounter_id, &fresh).await {
                tracing::warn!(error = %err, "presenter unavailable, aborting encounter");
                let mut env = BattleEnv::new(&mut store, &mut sink);
                break self.battle.abort(AbortReason::PresenterUnavailable, &mut env);
            }
            if let Some(result) = self.battle.result() {
                break result.clone();
            }

            let cancelled = *self.cancel.borrow();
            if cancelled {
                tracing::info!("encounter cancelled");
                let mut env = BattleEnv::new(&mut store, &mut sink);
                break self.battle.abort(AbortReason::Cancelled, &mut env);
            }

            let finished = {
                let mut env = BattleEnv::new(&mut store, &mut sink);
                self.battle.step(now(), &mut env)?.is_some()
            };
            tracing::debug!(tick = self.battle.ticks(), "tick resolved");

            if !finished && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        };

        if let Err(err) = self.presenter.conclude(&self.encounter_id, &result).await {
            tracing::warn!(error = %err, "failed to present result");
        }
        tracing::info!(
            outcome = %result.outcome,
            ticks = result.ticks,
            checkpoints = store.saved(),
            "encounter finished"
        );

        Ok(EncounterReport {
            encounter_id: self.encounter_id,
            log: self.battle.log().entries().to_vec(),
            checkpoints: store.saved(),
            result,
        })
    }
}

/// Wall-clock sample for tick timing, taken from tokio's clock so paused
/// test time is honored.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
