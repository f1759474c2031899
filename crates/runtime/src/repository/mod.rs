//! Repository layer for battle checkpoints.
//!
//! The core hands a [`battle_core::BattleSnapshot`] to its
//! [`battle_core::CheckpointStore`] on start and on every terminal
//! transition. [`RepositoryStore`] adapts that call onto a
//! [`CheckpointRepository`], which decides where records live.

mod error;
mod file;
mod memory;
mod store;
mod traits;

pub use error::RepositoryError;
pub use file::FileCheckpointRepository;
pub use memory::InMemoryCheckpointRepository;
pub use store::RepositoryStore;
pub use traits::{CheckpointRecord, CheckpointRepository};
