//! Options shared by every command, applied as the top settings layer.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use appdeck_core::{PortRange, Settings, SettingsFile};

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Directory to scan for apps. Defaults to the current directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Settings file to use instead of `<root>/appdeck.yaml`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File name that marks a directory as an app.
    #[arg(long, global = true, value_name = "NAME")]
    pub entry_point: Option<String>,

    /// Program used to start each app.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub runtime: Option<String>,

    /// Extra argument passed after `--server.port`. Repeatable.
    #[arg(long = "extra-arg", global = true, value_name = "ARG", allow_hyphen_values = true)]
    pub extra_args: Vec<String>,

    /// Inclusive port range, e.g. 8501-9000.
    #[arg(long, global = true, value_name = "START-END")]
    pub port_range: Option<PortRange>,

    /// Address to advertise instead of probing for one.
    #[arg(long, global = true, value_name = "IP")]
    pub host: Option<IpAddr>,

    /// host:port used to discover the outbound interface address.
    #[arg(long, global = true, value_name = "HOST:PORT")]
    pub probe_target: Option<String>,

    /// Registry file. Relative paths resolve against the root.
    #[arg(long, global = true, value_name = "FILE")]
    pub registry_file: Option<PathBuf>,

    /// Start registered apps again when their process is gone.
    #[arg(long, global = true)]
    pub relaunch_dead: bool,

    /// Skip the bind check when picking a port.
    #[arg(long, global = true)]
    pub no_port_probe: bool,

    /// Only look this many directory levels below the root.
    #[arg(long, global = true, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl SettingsArgs {
    /// Canonical scan root plus fully layered, validated settings.
    pub fn resolve(&self) -> Result<(PathBuf, Settings)> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("root directory '{}' is not accessible", root.display()))?;

        let mut settings = Settings::layered(&root, self.config.as_deref())
            .context("failed to load settings")?;
        settings.merge(self.to_layer());
        settings.validate().context("invalid settings")?;
        tracing::debug!(root = %root.display(), ?settings, "settings resolved");
        Ok((root, settings))
    }

    fn to_layer(&self) -> SettingsFile {
        SettingsFile {
            entry_point: self.entry_point.clone(),
            runtime: self.runtime.clone(),
            extra_args: (!self.extra_args.is_empty()).then(|| self.extra_args.clone()),
            port_range: self.port_range,
            probe_ports: self.no_port_probe.then_some(false),
            host: self.host,
            probe_target: self.probe_target.clone(),
            registry_file: self.registry_file.clone(),
            relaunch_dead: self.relaunch_dead.then_some(true),
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_leave_lower_layers_alone() {
        let layer = SettingsArgs::default().to_layer();
        assert!(layer.probe_ports.is_none());
        assert!(layer.relaunch_dead.is_none());
        assert!(layer.extra_args.is_none());
    }

    #[test]
    fn switches_become_explicit_values() {
        let args = SettingsArgs {
            no_port_probe: true,
            relaunch_dead: true,
            extra_args: vec!["--server.headless".into(), "true".into()],
            ..SettingsArgs::default()
        };
        let mut settings = Settings::default();
        settings.merge(args.to_layer());
        assert!(!settings.probe_ports);
        assert!(settings.relaunch_dead);
        assert_eq!(settings.extra_args, ["--server.headless", "true"]);
    }
}
