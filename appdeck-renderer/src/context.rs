//! Dashboard context: serializable rendering payload built from a [`Registry`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use appdeck_core::{AppRoot, Registry};

use crate::error::RenderError;

pub const DEFAULT_TITLE: &str = "Local App Navigator";

/// Flat rendering payload for `dashboard.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardContext {
    pub title: String,
    /// Address apps are advertised on.
    pub address: String,
    /// Why the address fell back to loopback, if it did.
    pub address_notice: Option<String>,
    pub notices: Vec<NoticeCtx>,
    /// One row per registry entry, sorted by root.
    pub apps: Vec<AppCtx>,
    pub generated_at: String,
}

/// A line of status text shown above the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeCtx {
    pub text: String,
    pub warn: bool,
}

/// One registered app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCtx {
    pub root: String,
    /// Last path component of `root`, for display.
    pub name: String,
    pub url: String,
    pub port: u16,
    pub process_id: u32,
    /// Outcome of the latest run, empty when the app was not visited.
    pub status: String,
}

impl DashboardContext {
    /// Build a context listing every entry in `registry`.
    pub fn from_registry(registry: &Registry, address: impl Into<String>) -> Self {
        Self::from_registry_at(registry, address, Utc::now())
    }

    /// `from_registry` with an explicit timestamp.
    pub fn from_registry_at(
        registry: &Registry,
        address: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let apps = registry
            .iter()
            .map(|(root, entry)| AppCtx {
                root: root.0.clone(),
                name: display_name(root),
                url: entry.url.clone(),
                port: entry.port,
                process_id: entry.process_id,
                status: String::new(),
            })
            .collect();

        DashboardContext {
            title: DEFAULT_TITLE.to_string(),
            address: address.into(),
            address_notice: None,
            notices: Vec::new(),
            apps,
            generated_at: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_address_notice(mut self, reason: Option<String>) -> Self {
        self.address_notice = reason;
        self
    }

    pub fn push_notice(&mut self, text: impl Into<String>, warn: bool) {
        self.notices.push(NoticeCtx {
            text: text.into(),
            warn,
        });
    }

    /// Attach per-app status labels; roots not in the registry are ignored.
    pub fn with_statuses(mut self, statuses: &BTreeMap<AppRoot, String>) -> Self {
        for app in &mut self.apps {
            if let Some(label) = statuses.get(&AppRoot::from(app.root.as_str())) {
                app.status = label.clone();
            }
        }
        self
    }

    /// Convert to a `tera::Context` for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

fn display_name(root: &AppRoot) -> String {
    root.as_path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.0.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appdeck_core::AppEntry;
    use chrono::TimeZone;

    fn registry() -> Registry {
        let ip = "192.168.1.50".parse().unwrap();
        [
            (AppRoot::from("/work/appB"), AppEntry::new(ip, 8602, 2)),
            (AppRoot::from("/work/appA"), AppEntry::new(ip, 8601, 1)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn apps_sorted_with_short_names() {
        let ctx = DashboardContext::from_registry(&registry(), "192.168.1.50");
        let names: Vec<_> = ctx.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["appA", "appB"]);
        assert_eq!(ctx.apps[0].url, "http://192.168.1.50:8601");
    }

    #[test]
    fn statuses_attach_by_root() {
        let statuses: BTreeMap<AppRoot, String> =
            [(AppRoot::from("/work/appB"), "already running".to_string())]
                .into_iter()
                .collect();
        let ctx = DashboardContext::from_registry(&registry(), "x").with_statuses(&statuses);
        assert_eq!(ctx.apps[0].status, "");
        assert_eq!(ctx.apps[1].status, "already running");
    }

    #[test]
    fn generated_at_uses_given_time() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let ctx = DashboardContext::from_registry_at(&Registry::new(), "x", now);
        assert_eq!(ctx.generated_at, "2024-05-01 12:30:00 UTC");
    }
}
