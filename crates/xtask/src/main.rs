//! Development tasks for the battle engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{AuditSkills, Checkpoints, Clean, Simulate};

/// Development tasks for the battle engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the battle engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Check the skill catalog against the engine's skill table
    AuditSkills(AuditSkills),

    /// Run an encounter headlessly and print its log
    Simulate(Simulate),

    /// List and inspect saved battle checkpoints
    Checkpoints(Checkpoints),

    /// Delete saved battle checkpoints
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for BATTLE_CHECKPOINT_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::AuditSkills(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
        Command::Checkpoints(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
