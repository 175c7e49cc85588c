//! Layered settings.
//!
//! Precedence, lowest first:
//!
//! 1. [`Settings::default`]
//! 2. `<config_dir>/appdeck/config.yaml` (global, via `dirs::config_dir()`)
//! 3. `<root>/appdeck.yaml`, or an explicit `--config` file
//! 4. command-line flags, applied by the binary as a final [`SettingsFile`]
//!
//! Each YAML layer deserializes into a [`SettingsFile`] where every field is
//! optional; present fields overwrite the layer below.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::types::PortRange;

/// File name of the per-root settings layer.
pub const PROJECT_CONFIG_FILE: &str = "appdeck.yaml";
/// Default marker file that makes a directory an app root.
pub const DEFAULT_ENTRY_POINT: &str = "streamlit_app.py";
/// Default program used to run an app.
pub const DEFAULT_RUNTIME: &str = "streamlit";
/// Default outbound address used to find the LAN-facing interface.
pub const DEFAULT_PROBE_TARGET: &str = "8.8.8.8:80";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub entry_point: String,
    pub runtime: String,
    /// Appended after `--server.port <port>`.
    pub extra_args: Vec<String>,
    pub port_range: PortRange,
    /// Bind-test candidate ports before handing them out.
    pub probe_ports: bool,
    /// Fixed advertised address; skips the outbound probe when set.
    pub host: Option<IpAddr>,
    pub probe_target: String,
    /// Registry location; relative paths resolve against the scanned root.
    pub registry_file: Option<PathBuf>,
    /// Relaunch registered apps whose process is gone.
    pub relaunch_dead: bool,
    pub max_depth: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            extra_args: Vec::new(),
            port_range: PortRange::default(),
            probe_ports: true,
            host: None,
            probe_target: DEFAULT_PROBE_TARGET.to_string(),
            registry_file: None,
            relaunch_dead: false,
            max_depth: None,
        }
    }
}

/// One settings layer as written in YAML. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub entry_point: Option<String>,
    pub runtime: Option<String>,
    pub extra_args: Option<Vec<String>>,
    pub port_range: Option<PortRange>,
    pub probe_ports: Option<bool>,
    pub host: Option<IpAddr>,
    pub probe_target: Option<String>,
    pub registry_file: Option<PathBuf>,
    pub relaunch_dead: Option<bool>,
    pub max_depth: Option<usize>,
}

impl Settings {
    /// Overwrite every field that `layer` sets.
    pub fn merge(&mut self, layer: SettingsFile) {
        let SettingsFile {
            entry_point,
            runtime,
            extra_args,
            port_range,
            probe_ports,
            host,
            probe_target,
            registry_file,
            relaunch_dead,
            max_depth,
        } = layer;

        if let Some(v) = entry_point {
            self.entry_point = v;
        }
        if let Some(v) = runtime {
            self.runtime = v;
        }
        if let Some(v) = extra_args {
            self.extra_args = v;
        }
        if let Some(v) = port_range {
            self.port_range = v;
        }
        if let Some(v) = probe_ports {
            self.probe_ports = v;
        }
        if host.is_some() {
            self.host = host;
        }
        if let Some(v) = probe_target {
            self.probe_target = v;
        }
        if registry_file.is_some() {
            self.registry_file = registry_file;
        }
        if let Some(v) = relaunch_dead {
            self.relaunch_dead = v;
        }
        if max_depth.is_some() {
            self.max_depth = max_depth;
        }
    }

    /// Reject values no layer should be able to produce.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let entry = Path::new(&self.entry_point);
        if self.entry_point.is_empty()
            || entry.file_name().map(|n| n != entry.as_os_str()).unwrap_or(true)
        {
            return Err(SettingsError::InvalidEntryPoint(self.entry_point.clone()));
        }
        Ok(())
    }

    /// Defaults + global file + project file (or `explicit`), without CLI flags.
    ///
    /// `global` is the global config path; pass `None` to skip that layer.
    pub fn layered_at(
        global: Option<&Path>,
        root: &Path,
        explicit: Option<&Path>,
    ) -> Result<Settings, SettingsError> {
        let mut settings = Settings::default();
        if let Some(layer) = global.map(load_file_at).transpose()?.flatten() {
            settings.merge(layer);
        }

        let project = match explicit {
            // An explicitly named file must exist.
            Some(path) => Some(read_file_at(path)?),
            None => load_file_at(&root.join(PROJECT_CONFIG_FILE))?,
        };
        if let Some(layer) = project {
            settings.merge(layer);
        }
        Ok(settings)
    }

    /// `layered_at` convenience wrapper using `dirs::config_dir()`.
    pub fn layered(root: &Path, explicit: Option<&Path>) -> Result<Settings, SettingsError> {
        let global = global_config_path();
        Settings::layered_at(global.as_deref(), root, explicit)
    }
}

/// `<config_dir>/appdeck/config.yaml`, if the platform has a config dir.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("appdeck").join("config.yaml"))
}

/// Parse a settings layer; a missing file is `Ok(None)`.
pub fn load_file_at(path: &Path) -> Result<Option<SettingsFile>, SettingsError> {
    if !path.exists() {
        return Ok(None);
    }
    read_file_at(path).map(Some)
}

fn read_file_at(path: &Path) -> Result<SettingsFile, SettingsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(SettingsFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
