//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use battle_core::BattleConfig;

/// Runtime configuration shared across encounter tasks.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Rules handed to every encounter built by the runtime.
    pub battle: BattleConfig,
    /// Delay between presented ticks. Presentation only.
    pub pacing: Duration,
    /// Capacity of each encounter's event channel.
    pub event_buffer_size: usize,
    /// Where file checkpoints go. `None` uses the platform data directory.
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            pacing: Duration::from_millis(1500),
            event_buffer_size: 100,
            checkpoint_dir: None,
        }
    }
}

impl RuntimeConfig {
    pub fn with_battle(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size.max(1);
        self
    }

    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = Some(dir.into());
        self
    }

    /// Checkpoint directory, falling back to the platform data directory.
    ///
    /// - Linux: `~/.local/share/battle/checkpoints`
    /// - macOS: `~/Library/Application Support/battle/checkpoints`
    /// - Fallback: `./save_data/checkpoints`
    pub fn resolved_checkpoint_dir(&self) -> PathBuf {
        if let Some(dir) = &self.checkpoint_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "battle")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./save_data"))
            .join("checkpoints")
    }
}
