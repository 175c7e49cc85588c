//! Child process launch.
//!
//! The child's working directory is passed to the spawn call; the launcher's
//! own working directory is never touched, so launches do not depend on each
//! other's side effects.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use appdeck_core::Settings;

use crate::error::LaunchError;

/// Everything needed to start one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub root: PathBuf,
    pub port: u16,
    pub program: String,
    pub entry_point: String,
    pub extra_args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(root: &Path, port: u16, settings: &Settings) -> Self {
        Self {
            root: root.to_path_buf(),
            port,
            program: settings.runtime.clone(),
            entry_point: settings.entry_point.clone(),
            extra_args: settings.extra_args.clone(),
        }
    }

    /// `run <entry_point> --server.port <port> [extra_args...]`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            self.entry_point.clone(),
            "--server.port".to_string(),
            self.port.to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// All three standard streams go to the null device, so a long-lived
    /// child never holds the launcher's stdout open.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args())
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Starts an app and returns its process id without waiting on it.
pub trait Spawner {
    fn spawn(&self, spec: &LaunchSpec) -> Result<u32, LaunchError>;
}

impl<T: Spawner + ?Sized> Spawner for &T {
    fn spawn(&self, spec: &LaunchSpec) -> Result<u32, LaunchError> {
        (**self).spawn(spec)
    }
}

/// Spawns real OS processes. Children are left running and never reaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    // Children must outlive this run.
    #[allow(clippy::zombie_processes)]
    fn spawn(&self, spec: &LaunchSpec) -> Result<u32, LaunchError> {
        let child = spec.command().spawn().map_err(|e| LaunchError::Spawn {
            program: spec.program.clone(),
            root: spec.root.clone(),
            source: e,
        })?;
        let pid = child.id();
        tracing::info!(
            pid,
            port = spec.port,
            root = %spec.root.display(),
            "started {}",
            spec.program
        );
        Ok(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(root: &Path, program: &str) -> LaunchSpec {
        LaunchSpec {
            root: root.to_path_buf(),
            port: 8642,
            program: program.to_string(),
            entry_point: "streamlit_app.py".to_string(),
            extra_args: vec![],
        }
    }

    #[test]
    fn args_fix_the_listen_port() {
        let s = spec(Path::new("/apps/a"), "streamlit");
        assert_eq!(s.args(), ["run", "streamlit_app.py", "--server.port", "8642"]);
    }

    #[test]
    fn extra_args_follow_the_port_flag() {
        let mut s = spec(Path::new("/apps/a"), "streamlit");
        s.extra_args = vec!["--server.headless".into(), "true".into()];
        assert_eq!(s.args()[4..], ["--server.headless", "true"]);
    }

    #[test]
    fn command_runs_in_app_root() {
        let s = spec(Path::new("/apps/a"), "streamlit");
        let cmd = s.command();
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/apps/a")));
        assert_eq!(cmd.get_program(), "streamlit");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let err = ProcessSpawner
            .spawn(&spec(dir.path(), "appdeck-test-no-such-runtime"))
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }), "got: {err}");
        assert!(err.to_string().contains("appdeck-test-no-such-runtime"));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_returns_child_pid_and_leaves_cwd_alone() {
        let dir = TempDir::new().unwrap();
        let before = std::env::current_dir().unwrap();
        let pid = ProcessSpawner.spawn(&spec(dir.path(), "true")).unwrap();
        assert!(pid > 0);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
