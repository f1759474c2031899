//! Unified error types surfaced by the runtime API.

use battle_core::BattleError;
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to build encounter: {0}")]
    Content(String),

    #[error("encounter task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}
