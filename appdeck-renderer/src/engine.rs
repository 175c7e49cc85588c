//! Tera rendering engine for the dashboard page.
//!
//! The embedded `dashboard.html` template can be overridden by dropping a
//! `dashboard.html.tera` file into a user template directory.

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::DashboardContext;
use crate::error::RenderError;

/// Registered name of the dashboard template. The `.html` suffix turns on
/// Tera's autoescaping.
pub const DASHBOARD_TEMPLATE: &str = "dashboard.html";

const DASHBOARD_TPL: &str = include_str!("templates/dashboard.html.tera");
const OVERRIDE_FILE: &str = "dashboard.html.tera";

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut source = DASHBOARD_TPL.to_string();
    if let Some(dir) = user_template_dir {
        let path = dir.join(OVERRIDE_FILE);
        if path.is_file() {
            source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_template(DASHBOARD_TEMPLATE, &source)?;
    Ok(tera)
}

/// Renders the dashboard page.
///
/// Create once with [`DashboardRenderer::new`] and reuse.
pub struct DashboardRenderer {
    tera: Tera,
}

impl DashboardRenderer {
    /// Embedded template only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_templates(None)
    }

    /// Embedded template, overridden by `dashboard.html.tera` in
    /// `user_template_dir` when present.
    pub fn with_templates(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(DashboardRenderer {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// Render to a string with LF line endings.
    pub fn render(&self, ctx: &DashboardContext) -> Result<String, RenderError> {
        let out = self.tera.render(DASHBOARD_TEMPLATE, &ctx.to_tera_context()?)?;
        Ok(out.replace("\r\n", "\n"))
    }

    /// Render and write to `path` via a `.tmp` sibling and rename.
    pub fn render_to(&self, ctx: &DashboardContext, path: &Path) -> Result<(), RenderError> {
        let html = self.render(ctx)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        std::fs::write(&tmp, html).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appdeck_core::{AppEntry, AppRoot, Registry};
    use tempfile::TempDir;

    fn registry() -> Registry {
        [(
            AppRoot::from("/work/sales-report"),
            AppEntry::new("10.0.0.5".parse().unwrap(), 8555, 77),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn renderer_new_succeeds() {
        DashboardRenderer::new().expect("embedded template must parse");
    }

    #[test]
    fn page_links_every_app() {
        let ctx = DashboardContext::from_registry(&registry(), "10.0.0.5");
        let html = DashboardRenderer::new().unwrap().render(&ctx).unwrap();
        // Autoescaping encodes '/' too; browsers decode it inside href.
        assert!(html.contains("<a href=\"http:&#x2F;&#x2F;10.0.0.5:8555\">"));
        assert!(html.contains("sales-report"));
        assert!(html.contains("Local App Navigator"));
    }

    #[test]
    fn empty_registry_says_so() {
        let ctx = DashboardContext::from_registry(&Registry::new(), "127.0.0.1");
        let html = DashboardRenderer::new().unwrap().render(&ctx).unwrap();
        assert!(html.contains("No apps registered yet."));
    }

    #[test]
    fn notices_are_escaped() {
        let mut ctx = DashboardContext::from_registry(&registry(), "10.0.0.5");
        ctx.push_notice("<script>alert(1)</script>", true);
        let html = DashboardRenderer::new().unwrap().render(&ctx).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn user_override_replaces_embedded_template() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(OVERRIDE_FILE),
            "{% for app in apps %}{{ app.name }}={{ app.port }}\n{% endfor %}",
        )
        .unwrap();
        let renderer = DashboardRenderer::with_templates(Some(dir.path())).unwrap();
        let ctx = DashboardContext::from_registry(&registry(), "10.0.0.5");
        assert_eq!(renderer.render(&ctx).unwrap(), "sales-report=8555\n");
    }

    #[test]
    fn broken_override_is_a_tera_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(OVERRIDE_FILE), "{% for %}").unwrap();
        let err = DashboardRenderer::with_templates(Some(dir.path())).err().unwrap();
        assert!(matches!(err, RenderError::Tera(_)));
    }
}
