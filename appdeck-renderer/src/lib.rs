//! # appdeck-renderer
//!
//! Tera-based rendering of the app registry as a static HTML dashboard.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use appdeck_core::Registry;
//! use appdeck_renderer::{DashboardContext, DashboardRenderer};
//!
//! fn write_page(registry: &Registry) {
//!     let ctx = DashboardContext::from_registry(registry, "192.168.1.50");
//!     if let Ok(renderer) = DashboardRenderer::new() {
//!         let _ = renderer.render_to(&ctx, std::path::Path::new("apps.html"));
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{AppCtx, DashboardContext, NoticeCtx};
pub use engine::DashboardRenderer;
pub use error::RenderError;
