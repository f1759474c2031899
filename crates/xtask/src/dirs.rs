//! Platform-specific directory utilities

use std::path::PathBuf;

use runtime::RuntimeConfig;

/// Get the checkpoint directory for file-backed encounters
///
/// `BATTLE_CHECKPOINT_DIR` wins when set; otherwise platform conventions:
/// - macOS: `~/Library/Application Support/battle/checkpoints`
/// - Linux: `~/.local/share/battle/checkpoints` (or `$XDG_DATA_HOME/...`)
/// - Windows: `%APPDATA%\battle\checkpoints`
/// - Fallback: `./save_data/checkpoints`
pub fn checkpoint_dir() -> PathBuf {
    match std::env::var_os("BATTLE_CHECKPOINT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => RuntimeConfig::default().resolved_checkpoint_dir(),
    }
}
