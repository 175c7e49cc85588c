//! `appdeck run`: discover, launch what is new, save and show the registry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use appdeck_launcher::{resolver_for, Navigator, ProcessSpawner};

use super::settings::SettingsArgs;
use crate::display;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Report what would be started without spawning or saving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also write an HTML dashboard to this file.
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Directory holding a `dashboard.html.tera` override.
    #[arg(long, value_name = "DIR", requires = "html")]
    pub template_dir: Option<PathBuf>,
}

impl RunArgs {
    pub fn run(self, shared: &SettingsArgs) -> Result<()> {
        let (root, settings) = shared.resolve()?;
        let resolver = resolver_for(&settings);
        let navigator =
            Navigator::new(&root, settings, resolver, ProcessSpawner).dry_run(self.dry_run);

        let report = navigator
            .run()
            .with_context(|| format!("failed to run apps under {}", root.display()))?;

        if let Some(out) = self.html.as_deref() {
            display::write_dashboard(
                display::report_dashboard(&report),
                out,
                self.template_dir.as_deref(),
            )?;
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run report")?
            );
            return Ok(());
        }

        display::print_report(&report);
        Ok(())
    }
}
