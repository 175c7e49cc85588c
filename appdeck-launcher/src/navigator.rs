//! One discovery → launch → persist pass.
//!
//! ```text
//! resolve address ─► lock + load registry ─► discover apps
//!        for each app: registered? ─► AlreadyRunning
//!                      otherwise    ─► allocate port ─► spawn ─► record
//! save registry ─► unlock ─► RunReport
//! ```
//!
//! A registry that fails to parse aborts the pass before anything is
//! spawned. Per-app failures are reported and leave the app unregistered, so
//! the next run tries it again.

use std::path::{Path, PathBuf};

use appdeck_core::{registry, AppEntry, AppRoot, Registry, Settings};
use appdeck_detector::{discover_apps_within, SkippedPath};
use serde::Serialize;

use crate::error::NavigatorError;
use crate::liveness::is_process_alive;
use crate::network::{AddressResolver, ResolvedAddress};
use crate::ports::PortAllocator;
use crate::spawn::{LaunchSpec, Spawner};

/// What happened to one discovered app during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AppStatus {
    /// Already in the registry; left untouched.
    AlreadyRunning,
    /// Newly started and recorded.
    Launched { port: u16, process_id: u32 },
    /// Registered process was gone; started again and the entry replaced.
    Relaunched {
        port: u16,
        process_id: u32,
        previous_process_id: u32,
    },
    /// Dry run: would have been started.
    WouldLaunch,
    /// Could not be started; not recorded.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppOutcome {
    pub root: AppRoot,
    #[serde(flatten)]
    pub status: AppStatus,
}

/// Everything the presentation layer needs after a pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub address: ResolvedAddress,
    pub registry_path: PathBuf,
    pub dry_run: bool,
    /// One per discovered app, in discovery order.
    pub outcomes: Vec<AppOutcome>,
    pub skipped: Vec<SkippedPath>,
    /// Full registry after the pass, including apps not found this time.
    pub registry: Registry,
}

impl RunReport {
    pub fn count(&self, pred: impl Fn(&AppStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Drives a single pass over `root` with injected address and spawn seams.
pub struct Navigator<A, S> {
    root: PathBuf,
    settings: Settings,
    resolver: A,
    spawner: S,
    liveness: fn(u32) -> bool,
    dry_run: bool,
}

impl<A: AddressResolver, S: Spawner> Navigator<A, S> {
    pub fn new(root: impl Into<PathBuf>, settings: Settings, resolver: A, spawner: S) -> Self {
        Self {
            root: root.into(),
            settings,
            resolver,
            spawner,
            liveness: is_process_alive,
            dry_run: false,
        }
    }

    /// Discover and report without spawning, locking or saving.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replace the process liveness probe used with `relaunch_dead`.
    pub fn with_liveness(mut self, probe: fn(u32) -> bool) -> Self {
        self.liveness = probe;
        self
    }

    pub fn registry_path(&self) -> PathBuf {
        registry::registry_path_at(&self.root, self.settings.registry_file.as_deref())
    }

    pub fn run(&self) -> Result<RunReport, NavigatorError> {
        let address = self.resolver.resolve();
        let registry_path = self.registry_path();

        let _lock = if self.dry_run {
            None
        } else {
            Some(registry::lock_at(&registry_path)?)
        };
        let mut reg = registry::load_at(&registry_path)?;
        tracing::debug!(path = %registry_path.display(), entries = reg.len(), "loaded registry");

        let discovery = discover_apps_within(
            &self.root,
            &self.settings.entry_point,
            self.settings.max_depth,
        )?;

        let allocator = PortAllocator::new(self.settings.port_range, self.settings.probe_ports);
        let outcomes: Vec<AppOutcome> = discovery
            .apps
            .iter()
            .zip(discovery.roots())
            .map(|(dir, root)| {
                let status = self.visit(&root, dir, &address, &allocator, &mut reg);
                AppOutcome { root, status }
            })
            .collect();

        if !self.dry_run {
            registry::save_at(&registry_path, &reg)?;
            tracing::info!(path = %registry_path.display(), entries = reg.len(), "saved registry");
        }

        Ok(RunReport {
            address,
            registry_path,
            dry_run: self.dry_run,
            outcomes,
            skipped: discovery.skipped,
            registry: reg,
        })
    }

    fn visit(
        &self,
        root: &AppRoot,
        dir: &Path,
        address: &ResolvedAddress,
        allocator: &PortAllocator,
        reg: &mut Registry,
    ) -> AppStatus {
        let previous = match reg.get(root) {
            Some(entry) if !self.settings.relaunch_dead || (self.liveness)(entry.process_id) => {
                tracing::debug!(app = %root, "already running");
                return AppStatus::AlreadyRunning;
            }
            Some(entry) => {
                tracing::info!(app = %root, pid = entry.process_id, "registered process is gone");
                Some(entry.process_id)
            }
            None => None,
        };

        if self.dry_run {
            return AppStatus::WouldLaunch;
        }

        let port = match allocator.allocate(&reg.claimed_ports()) {
            Ok(port) => port,
            Err(err) => {
                tracing::warn!(app = %root, error = %err, "no port available");
                return AppStatus::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let spec = LaunchSpec::new(dir, port, &self.settings);
        let process_id = match self.spawner.spawn(&spec) {
            Ok(pid) => pid,
            Err(err) => {
                tracing::warn!(app = %root, error = %err, "launch failed");
                return AppStatus::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let entry = AppEntry::new(address.ip, port, process_id);
        match previous {
            Some(previous_process_id) => {
                reg.replace(root.clone(), entry);
                AppStatus::Relaunched {
                    port,
                    process_id,
                    previous_process_id,
                }
            }
            None => {
                reg.insert_new(root.clone(), entry);
                AppStatus::Launched { port, process_id }
            }
        }
    }
}
