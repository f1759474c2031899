//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod audit_skills;
mod checkpoints;
mod clean;
mod simulate;

pub use audit_skills::AuditSkills;
pub use checkpoints::Checkpoints;
pub use clean::Clean;
pub use simulate::Simulate;
