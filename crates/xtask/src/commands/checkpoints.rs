//! Inspect saved battle checkpoints
//!
//! Without an encounter id, lists the encounters that have checkpoints.
//! With one, prints its latest checkpoint (or its full history).

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_core::CombatantSnapshot;
use clap::Parser;
use console::style;
use runtime::{CheckpointRecord, CheckpointRepository, FileCheckpointRepository};

use crate::dirs;

/// List and inspect saved battle checkpoints
#[derive(Parser)]
pub struct Checkpoints {
    /// Encounter to inspect. Lists all encounters when omitted
    #[arg(value_name = "ENCOUNTER")]
    encounter: Option<String>,

    /// Show every checkpoint instead of only the latest
    #[arg(long)]
    history: bool,

    /// Custom checkpoint directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Outcome, phase and per-combatant health
    Summary,
    /// Full JSON output
    Json,
}

impl Checkpoints {
    pub fn execute(self) -> Result<()> {
        let dir = self.dir.clone().unwrap_or_else(dirs::checkpoint_dir);
        if !dir.exists() {
            println!(
                "{} {}",
                style("No checkpoints yet:").dim(),
                style(dir.display()).dim()
            );
            return Ok(());
        }

        let repository = FileCheckpointRepository::new(&dir)
            .with_context(|| format!("Failed to open checkpoint directory: {}", dir.display()))?;

        let Some(encounter) = &self.encounter else {
            return list_encounters(&repository);
        };

        let records = if self.history {
            repository.history(encounter)?
        } else {
            repository.latest(encounter)?.into_iter().collect()
        };
        if records.is_empty() {
            anyhow::bail!("No checkpoints found for encounter: {}", encounter);
        }

        match self.format {
            OutputFormat::Summary => records.iter().for_each(print_summary),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        }

        Ok(())
    }
}

fn list_encounters(repository: &FileCheckpointRepository) -> Result<()> {
    let encounters = repository.list_encounters()?;
    println!(
        "{} {}",
        style("Checkpoint directory:").bold().cyan(),
        repository.base_dir().display()
    );

    if encounters.is_empty() {
        println!("{}", style("No encounters saved").dim());
        return Ok(());
    }

    for encounter in encounters {
        let status = match repository.latest(&encounter)? {
            Some(record) if record.is_terminal() => record
                .snapshot
                .result
                .map(|result| style(result.outcome.to_string()).green().to_string())
                .unwrap_or_default(),
            Some(record) => style(format!("in progress ({} ticks)", record.snapshot.ticks))
                .yellow()
                .to_string(),
            None => style("empty").dim().to_string(),
        };
        println!("  {} {} {}", style("→").cyan(), style(&encounter).bold(), status);
    }

    Ok(())
}

fn print_summary(record: &CheckpointRecord) {
    let snapshot = &record.snapshot;

    println!(
        "{} {} #{} at {}",
        style("=== Checkpoint").bold().green(),
        style(&record.encounter_id).bold(),
        record.sequence,
        record.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Phase: {}", snapshot.phase);
    println!("  Ticks: {}", snapshot.ticks);
    println!("  Seed: {} ({} draws)", snapshot.seed, snapshot.rng_draws);
    println!("  Log entries: {}", snapshot.log_len);
    if let Some(result) = &snapshot.result {
        let winner = result
            .winner
            .map_or_else(|| "nobody".to_string(), |side| side.to_string());
        println!("  Result: {} ({} win)", result.outcome, winner);
    }
    println!();

    println!("{}", style("Challengers:").bold().yellow());
    snapshot
        .challengers
        .iter()
        .for_each(|member| print_member(member, false));
    println!("{}", style("Opponents:").bold().yellow());
    snapshot
        .opponents
        .iter()
        .for_each(|member| print_member(member, snapshot.active_opponent == Some(member.id)));
    println!();
}

fn print_member(member: &CombatantSnapshot, active: bool) {
    let marker = if active { "*" } else { " " };
    let health = format!("{}/{}", member.hp.round_dp(1), member.max_hp.round_dp(1));
    let health = if member.hp.is_zero() {
        style(health).red()
    } else {
        style(health).green()
    };

    print!("  {marker} {} [{}] HP {}", member.name, member.kind, health);
    if !member.shield.is_zero() {
        print!(" +{} shield", member.shield.round_dp(1));
    }
    if !member.effects.is_empty() {
        print!(" {}", style(member.effects.join(", ")).magenta());
    }
    println!();

    let cooling: Vec<_> = member
        .skills
        .iter()
        .filter(|(_, remaining)| *remaining > 0)
        .map(|(skill, remaining)| format!("{} ({remaining})", skill.name()))
        .collect();
    if !cooling.is_empty() {
        println!("      cooling down: {}", style(cooling.join(", ")).dim());
    }
}
