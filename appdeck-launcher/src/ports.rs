//! Random port assignment inside a [`PortRange`].

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, TcpListener};

use appdeck_core::PortRange;
use rand::Rng;

use crate::error::LaunchError;

/// Picks ports uniformly at random from the unclaimed part of a range.
#[derive(Debug, Clone, Copy)]
pub struct PortAllocator {
    range: PortRange,
    probe: bool,
}

impl PortAllocator {
    /// With `probe` set, a candidate must also be bindable right now.
    pub fn new(range: PortRange, probe: bool) -> Self {
        Self { range, probe }
    }

    pub fn allocate(&self, claimed: &BTreeSet<u16>) -> Result<u16, LaunchError> {
        self.allocate_with(&mut rand::thread_rng(), claimed)
    }

    /// Draw without replacement until a usable port turns up.
    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        claimed: &BTreeSet<u16>,
    ) -> Result<u16, LaunchError> {
        let mut candidates: Vec<u16> = self
            .range
            .iter()
            .filter(|p| !claimed.contains(p))
            .collect();
        while !candidates.is_empty() {
            let port = candidates.swap_remove(rng.gen_range(0..candidates.len()));
            if !self.probe || is_port_free(port) {
                return Ok(port);
            }
            tracing::debug!(port, "port busy, drawing another");
        }
        Err(LaunchError::PortsExhausted { range: self.range })
    }
}

/// True if nothing is listening on `port` on any IPv4 interface.
pub fn is_port_free(port: u16) -> bool {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_ok()
}
