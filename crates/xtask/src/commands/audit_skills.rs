//! Skill catalog completeness audit
//!
//! Checks that every catalog name resolves to a combat skill (or is a known
//! non-combat exception), that every skill runs in at least one trigger
//! context, and that every skill is advertised by the catalog.

use std::path::PathBuf;

use anyhow::Result;
use battle_content::CatalogLoader;
use battle_core::{SKILL_TABLE_VERSION, SkillId};
use clap::Parser;
use console::style;

/// Check the skill catalog against the engine's skill table
#[derive(Parser, Debug)]
pub struct AuditSkills {
    /// Catalog file to audit (defaults to the shipped catalog)
    #[arg(short, long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Print every skill with its triggers
    #[arg(short, long)]
    verbose: bool,
}

impl AuditSkills {
    pub fn execute(self) -> Result<()> {
        let catalog = match &self.catalog {
            Some(path) => CatalogLoader::load(path)?,
            None => CatalogLoader::embedded()?,
        };

        println!(
            "{} catalog v{} ({} names), skill table v{}",
            style("🔎 Auditing").cyan().bold(),
            catalog.version,
            catalog.len(),
            SKILL_TABLE_VERSION
        );

        if self.verbose {
            for group in &catalog.groups {
                println!("\n{}", style(group.element).bold());
                for name in &group.skills {
                    let triggers = SkillId::from_name(name)
                        .map(|id| {
                            id.triggers()
                                .iter()
                                .map(ToString::to_string)
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_else(|| "non-combat".to_string());
                    println!("  {} {} {}", style("→").cyan(), name, style(triggers).dim());
                }
            }
            println!();
        }

        let report = catalog.audit();
        for name in &report.unresolved {
            println!(
                "{} catalog name does not resolve: {}",
                style("✗").red().bold(),
                style(name).yellow()
            );
        }
        for (id, trigger) in &report.unreachable {
            let context = trigger.map_or_else(|| "any trigger".to_string(), |t| t.to_string());
            println!(
                "{} {} never fires on {}",
                style("✗").red().bold(),
                style(id.name()).yellow(),
                context
            );
        }
        for id in &report.unadvertised {
            println!(
                "{} {} is missing from the catalog",
                style("✗").red().bold(),
                style(id.name()).yellow()
            );
        }

        if !report.is_clean() {
            anyhow::bail!("skill audit found {} problem(s)", report.problems());
        }

        println!("{}", style("✓ Skill catalog is complete").green().bold());
        Ok(())
    }
}
