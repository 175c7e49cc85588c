//! appdeck core library: domain types, registry persistence, settings, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes, [`AppEntry`], [`Registry`], [`PortRange`]
//! - [`error`]: [`RegistryError`], [`SettingsError`]
//! - [`registry`]: load / save / lock of the persisted app registry
//! - [`settings`]: layered YAML + CLI configuration

pub mod error;
pub mod registry;
pub mod settings;
pub mod types;

pub use error::{RegistryError, SettingsError};
pub use settings::{Settings, SettingsFile};
pub use types::{AppEntry, AppRoot, PortRange, Registry};
