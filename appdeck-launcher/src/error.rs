use std::path::PathBuf;

use appdeck_core::PortRange;
use thiserror::Error;

/// Per-app launch failures. Recovered by the navigator: the app is reported
/// and left unregistered.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start '{program}' in {root}: {source}")]
    Spawn {
        program: String,
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no free port left in {range}")]
    PortsExhausted { range: PortRange },
}

/// Fatal errors that abort a navigator run.
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("registry error: {0}")]
    Registry(#[from] appdeck_core::RegistryError),

    #[error("discovery error: {0}")]
    Detect(#[from] appdeck_detector::DetectError),
}
