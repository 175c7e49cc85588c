//! Domain types for the appdeck registry.
//!
//! The registry is persisted as a flat JSON object keyed by application root,
//! so every type here serializes to exactly the on-disk shape.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Application root path, used as the stable registry key across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppRoot(pub String);

impl fmt::Display for AppRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AppRoot {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppRoot {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Non-UTF-8 bytes become U+FFFD, so two such directories that differ only
/// in those bytes share one registry key.
impl From<&Path> for AppRoot {
    fn from(p: &Path) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

impl AppRoot {
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Port range
// ---------------------------------------------------------------------------

/// Inclusive range of ports apps may be assigned, written `start-end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub const DEFAULT_START: u16 = 8501;
    pub const DEFAULT_END: u16 = 9000;

    /// Build a validated range. `start` must be non-zero and not above `end`.
    pub fn new(start: u16, end: u16) -> Result<Self, SettingsError> {
        if start == 0 {
            return Err(SettingsError::InvalidPortRange {
                value: format!("{start}-{end}"),
                reason: "port 0 is reserved".to_string(),
            });
        }
        if start > end {
            return Err(SettingsError::InvalidPortRange {
                value: format!("{start}-{end}"),
                reason: "start is above end".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    /// Number of ports in the range.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: Self::DEFAULT_START,
            end: Self::DEFAULT_END,
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for PortRange {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SettingsError::InvalidPortRange {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| invalid("expected <start>-<end>"))?;
        let start = start
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid("start is not a port number"))?;
        let end = end
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid("end is not a port number"))?;
        PortRange::new(start, end)
    }
}

impl TryFrom<String> for PortRange {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PortRange> for String {
    fn from(r: PortRange) -> Self {
        r.to_string()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Where a launched app can be reached and which process serves it.
///
/// Unknown keys are rejected on load; a save rewrites every entry, so an
/// extra field added by hand would otherwise vanish without notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppEntry {
    pub url: String,
    pub port: u16,
    /// OS pid of the child at launch time; never re-validated on load.
    pub process_id: u32,
}

impl AppEntry {
    /// Entry for an app listening on `port` at `address`.
    pub fn new(address: IpAddr, port: u16, process_id: u32) -> Self {
        Self {
            url: format!("http://{}", SocketAddr::new(address, port)),
            port,
            process_id,
        }
    }
}

/// Persisted mapping from application root to its launch record.
///
/// Serializes as a bare JSON object; keys are kept sorted so saves are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    apps: BTreeMap<AppRoot, AppEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn contains(&self, root: &AppRoot) -> bool {
        self.apps.contains_key(root)
    }

    pub fn get(&self, root: &AppRoot) -> Option<&AppEntry> {
        self.apps.get(root)
    }

    /// Record a newly launched app. Returns `false` and leaves the registry
    /// untouched if `root` is already registered.
    pub fn insert_new(&mut self, root: AppRoot, entry: AppEntry) -> bool {
        if self.apps.contains_key(&root) {
            return false;
        }
        self.apps.insert(root, entry);
        true
    }

    /// Overwrite the entry for `root`, returning the previous one.
    ///
    /// Only used when a dead process is relaunched.
    pub fn replace(&mut self, root: AppRoot, entry: AppEntry) -> Option<AppEntry> {
        self.apps.insert(root, entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AppRoot, &AppEntry)> {
        self.apps.iter()
    }

    /// Ports already assigned to some registered app.
    pub fn claimed_ports(&self) -> BTreeSet<u16> {
        self.apps.values().map(|e| e.port).collect()
    }
}

impl FromIterator<(AppRoot, AppEntry)> for Registry {
    fn from_iter<I: IntoIterator<Item = (AppRoot, AppEntry)>>(iter: I) -> Self {
        Self {
            apps: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
