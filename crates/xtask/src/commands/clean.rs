//! Clean saved checkpoints command
//!
//! Removes file-backed checkpoints, either for one encounter or all of them.
//!
//! Safety: Always prompts for confirmation before deletion.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use runtime::{CheckpointRepository, FileCheckpointRepository};

use crate::dirs;

/// Delete saved battle checkpoints
#[derive(Parser, Debug)]
pub struct Clean {
    /// Only delete checkpoints of this encounter
    #[arg(long)]
    pub encounter: Option<String>,

    /// Custom checkpoint directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        let dir = self.dir.clone().unwrap_or_else(dirs::checkpoint_dir);
        if !dir.exists() {
            println!(
                "{}",
                style("Nothing to clean - checkpoint directory doesn't exist yet").dim()
            );
            return Ok(());
        }

        let repository = FileCheckpointRepository::new(&dir)?;
        let targets = match &self.encounter {
            Some(encounter) => {
                if repository.history(encounter)?.is_empty() {
                    eprintln!(
                        "{} Encounter not found: {}",
                        style("✗").red().bold(),
                        style(encounter).cyan()
                    );
                    anyhow::bail!("No checkpoints for encounter {}", encounter);
                }
                vec![encounter.clone()]
            }
            None => repository.list_encounters()?,
        };

        if targets.is_empty() {
            println!("{}", style("Nothing to clean - no checkpoints saved").dim());
            return Ok(());
        }

        println!("{}", style("🧹 Clean Battle Checkpoints").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for encounter in &targets {
            println!("  {} {}", style("→").cyan(), style(encounter).bold());
        }
        println!("    {}", style(dir.display()).dim());
        println!();

        if !self.yes && !self.confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for encounter in targets {
            print!("Deleting {}... ", encounter);
            io::stdout().flush()?;

            repository
                .delete(&encounter)
                .with_context(|| format!("Failed to delete checkpoints: {}", encounter))?;

            println!("{}", style("✓").green());
        }

        println!();
        println!("{}", style("✓ Cleanup complete!").green().bold());

        Ok(())
    }

    /// Prompt user for confirmation
    fn confirm(&self) -> Result<bool> {
        print!("{} ", style("Proceed? [y/N]").yellow().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }
}
