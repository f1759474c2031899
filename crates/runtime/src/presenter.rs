//! Display channel collaborator.
//!
//! Runtime users plug in [`Presenter`] implementations so encounters can be
//! narrated to a chat channel, a terminal, or a test fixture. A presenter
//! that fails ends the encounter as
//! `Aborted(PresenterUnavailable)`.
use async_trait::async_trait;
use battle_core::{BattleResult, LogEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PresentError {
    #[error("presentation channel closed")]
    ChannelClosed,

    #[error("presenter failed: {0}")]
    Failed(String),
}

/// Receives an encounter's narration as it happens.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Shows newly appended log entries. Called once per tick, possibly
    /// with an empty slice.
    async fn present(&self, encounter: &str, entries: &[LogEntry]) -> Result<(), PresentError>;

    /// Shows the final result. Failures here are logged and ignored.
    async fn conclude(&self, encounter: &str, result: &BattleResult) -> Result<(), PresentError>;
}

/// Presenter that discards everything.
pub struct NullPresenter;

#[async_trait]
impl Presenter for NullPresenter {
    async fn present(&self, _encounter: &str, _entries: &[LogEntry]) -> Result<(), PresentError> {
        Ok(())
    }

    async fn conclude(&self, _encounter: &str, _result: &BattleResult) -> Result<(), PresentError> {
        Ok(())
    }
}

/// What a [`ChannelPresenter`] forwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterEvent {
    Narration { encounter: String, entry: LogEntry },
    Concluded { encounter: String, result: BattleResult },
}

/// Forwards narration over an mpsc channel. Dropping the receiver makes the
/// presenter unavailable.
pub struct ChannelPresenter {
    tx: mpsc::Sender<EncounterEvent>,
}

impl ChannelPresenter {
    pub fn new(tx: mpsc::Sender<EncounterEvent>) -> Self {
        Self { tx }
    }

    /// Creates a presenter and the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EncounterEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Presenter for ChannelPresenter {
    async fn present(&self, encounter: &str, entries: &[LogEntry]) -> Result<(), PresentError> {
        if self.tx.is_closed() {
            return Err(PresentError::ChannelClosed);
        }
        for entry in entries {
            self.tx
                .send(EncounterEvent::Narration {
                    encounter: encounter.to_string(),
                    entry: entry.clone(),
                })
                .await
                .map_err(|_| PresentError::ChannelClosed)?;
        }
        Ok(())
    }

    async fn conclude(&self, encounter: &str, result: &BattleResult) -> Result<(), PresentError> {
        self.tx
            .send(EncounterEvent::Concluded {
                encounter: encounter.to_string(),
                result: result.clone(),
            })
            .await
            .map_err(|_| PresentError::ChannelClosed)
    }
}
