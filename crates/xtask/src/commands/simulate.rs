//! Headless encounter simulation
//!
//! Loads an encounter roster and battle rules, runs the fight on the runtime,
//! and prints the narration as it happens.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use battle_content::{ConfigLoader, EncounterLoader};
use battle_core::{BattleResult, LogEntry, Outcome};
use clap::Parser;
use console::style;
use runtime::{
    CheckpointRepository, EncounterRunner, FileCheckpointRepository, InMemoryCheckpointRepository,
    NullPresenter, PresentError, Presenter, RuntimeConfig,
};

use crate::dirs;

/// Run an encounter headlessly and print its log
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Encounter file (RON). Defaults to the shipped sample encounter
    #[arg(short, long, value_name = "FILE")]
    encounter: Option<PathBuf>,

    /// Battle rules file (TOML). Defaults to the shipped rules
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the encounter's seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Delay between ticks in milliseconds (presentation only)
    #[arg(long, default_value_t = 0)]
    pacing_ms: u64,

    /// Encounter id used for checkpoints (defaults to sim-<seed>)
    #[arg(long)]
    id: Option<String>,

    /// Write checkpoints to the checkpoint directory instead of memory
    #[arg(long)]
    persist: bool,

    /// Print the result and log as JSON instead of narrating
    #[arg(long)]
    json: bool,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        init_tracing();

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start tokio runtime")?
            .block_on(self.run())
    }

    async fn run(self) -> Result<()> {
        let mut spec = match &self.encounter {
            Some(path) => EncounterLoader::load(path)?,
            None => EncounterLoader::sample()?,
        };
        if let Some(seed) = self.seed {
            spec.seed = seed;
        }
        let battle_config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => ConfigLoader::embedded()?,
        };
        let encounter_id = self.id.clone().unwrap_or_else(|| format!("sim-{}", spec.seed));

        let config = RuntimeConfig::default()
            .with_battle(battle_config)
            .with_pacing(Duration::from_millis(self.pacing_ms));

        let repository: Arc<dyn CheckpointRepository> = if self.persist {
            let dir = dirs::checkpoint_dir();
            tracing::info!("Writing checkpoints to {}", dir.display());
            Arc::new(FileCheckpointRepository::new(&dir)?)
        } else {
            Arc::new(InMemoryCheckpointRepository::new())
        };
        let presenter: Arc<dyn Presenter> = if self.json {
            Arc::new(NullPresenter)
        } else {
            Arc::new(ConsolePresenter)
        };

        let runner = EncounterRunner::new(config, repository, presenter);
        let battle = runner.prepare(&encounter_id, &spec)?;
        let report = runner.run(encounter_id.as_str(), battle).await?;

        if self.json {
            let json = serde_json::json!({
                "encounter": report.encounter_id,
                "seed": spec.seed,
                "result": report.result,
                "log": report.log,
                "checkpoints": report.checkpoints,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }

        Ok(())
    }
}

/// Prints narration to stdout.
struct ConsolePresenter;

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn present(&self, _encounter: &str, entries: &[LogEntry]) -> Result<(), PresentError> {
        for entry in entries {
            println!("{} {}", style(format!("{:>4}", entry.index)).dim(), entry.message);
        }
        Ok(())
    }

    async fn conclude(&self, encounter: &str, result: &BattleResult) -> Result<(), PresentError> {
        let headline = format!("{encounter}: {} after {} ticks", result.outcome, result.ticks);
        let styled = match result.outcome {
            Outcome::Victory => style(headline).green().bold(),
            Outcome::Defeat => style(headline).red().bold(),
            Outcome::Aborted(_) => style(headline).yellow().bold(),
            Outcome::Timeout | Outcome::Draw => style(headline).cyan().bold(),
        };
        println!();
        println!("{styled}");
        Ok(())
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // A second init (e.g. from a test harness) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
