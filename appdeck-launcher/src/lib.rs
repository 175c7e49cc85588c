//! Launch side of appdeck: network identity, port assignment, process spawn
//! and the [`Navigator`] pass that ties them to the registry.

mod error;
pub mod liveness;
pub mod navigator;
pub mod network;
pub mod ports;
pub mod spawn;

pub use error::{LaunchError, NavigatorError};
pub use liveness::is_process_alive;
pub use navigator::{AppOutcome, AppStatus, Navigator, RunReport};
pub use network::{AddressResolver, FixedResolver, ProbeResolver, ResolvedAddress, LOOPBACK};
pub use ports::PortAllocator;
pub use spawn::{LaunchSpec, ProcessSpawner, Spawner};

use appdeck_core::Settings;

/// The resolver a set of settings asks for: the fixed `host`, else a probe.
pub fn resolver_for(settings: &Settings) -> Box<dyn AddressResolver> {
    match settings.host {
        Some(ip) => Box::new(FixedResolver(ip)),
        None => Box::new(ProbeResolver::new(settings.probe_target.clone())),
    }
}

impl<T: AddressResolver + ?Sized> AddressResolver for Box<T> {
    fn resolve(&self) -> ResolvedAddress {
        (**self).resolve()
    }
}
