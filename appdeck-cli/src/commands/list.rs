//! `appdeck list`: show the saved registry.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use appdeck_core::registry;
use appdeck_launcher::{resolver_for, AddressResolver};
use appdeck_renderer::DashboardContext;

use super::settings::SettingsArgs;
use crate::display;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the registry file contents as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also write an HTML dashboard to this file.
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Directory holding a `dashboard.html.tera` override.
    #[arg(long, value_name = "DIR", requires = "html")]
    pub template_dir: Option<PathBuf>,
}

impl ListArgs {
    pub fn run(self, shared: &SettingsArgs) -> Result<()> {
        let (root, settings) = shared.resolve()?;
        let path = registry::registry_path_at(&root, settings.registry_file.as_deref());
        let apps = registry::load_at(&path)
            .with_context(|| format!("failed to load registry {}", path.display()))?;

        if self.json {
            println!(
                "{}",
                registry::to_json(&apps).context("failed to serialize registry")?
            );
        } else {
            display::print_title();
            display::print_registry_table(&apps, &BTreeMap::new());
            println!("{} apps | registry {}", apps.len(), path.display());
        }

        if let Some(out) = self.html.as_deref() {
            let address = resolver_for(&settings).resolve();
            let ctx = DashboardContext::from_registry(&apps, address.ip.to_string())
                .with_address_notice(address.fallback_reason);
            display::write_dashboard(ctx, out, self.template_dir.as_deref())?;
        }
        Ok(())
    }
}
