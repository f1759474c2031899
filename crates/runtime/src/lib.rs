//! Async orchestration for battle encounters.
//!
//! `battle-core` resolves a fight synchronously and performs no I/O. This
//! crate runs encounters on tokio, one task per encounter, and wires the
//! core's collaborators to real infrastructure:
//! - [`runner`] hosts [`EncounterRunner`] and its per-encounter handle
//! - [`presenter`] defines the display channel an encounter narrates to
//! - [`repository`] persists battle checkpoints (memory or JSON files)
//! - [`diagnostics`] forwards core diagnostics to `tracing`
//!
//! Pacing delays only affect presentation. A battle's result depends on its
//! seed and the wall-clock samples taken at tick start, never on how long a
//! presenter takes.
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod presenter;
pub mod repository;
pub mod runner;

pub use config::RuntimeConfig;
pub use diagnostics::TracingSink;
pub use error::{Result, RuntimeError};
pub use presenter::{ChannelPresenter, EncounterEvent, NullPresenter, PresentError, Presenter};
pub use repository::{
    CheckpointRecord, CheckpointRepository, FileCheckpointRepository,
    InMemoryCheckpointRepository, RepositoryError, RepositoryStore,
};
pub use runner::{EncounterHandle, EncounterReport, EncounterRunner};
