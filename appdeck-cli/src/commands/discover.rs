//! `appdeck discover`: list app roots without starting anything.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use appdeck_detector::discover_apps_within;

use super::settings::SettingsArgs;

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Emit discovered roots and skipped paths as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DiscoverArgs {
    pub fn run(self, shared: &SettingsArgs) -> Result<()> {
        let (root, settings) = shared.resolve()?;
        let found = discover_apps_within(&root, &settings.entry_point, settings.max_depth)
            .with_context(|| format!("failed to scan {}", root.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&found).context("failed to serialize discovery")?
            );
            return Ok(());
        }

        if found.apps.is_empty() {
            println!(
                "No directories containing {} under {}.",
                settings.entry_point,
                root.display()
            );
        }
        for app in &found.apps {
            println!("{}", app.display());
        }
        for skipped in &found.skipped {
            eprintln!(
                "{} {}",
                "!".yellow().bold(),
                format!("Skipped {}: {}", skipped.path.display(), skipped.reason).yellow()
            );
        }
        Ok(())
    }
}
