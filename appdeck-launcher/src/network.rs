//! Local network identity.
//!
//! The advertised address is the one the OS would pick for outbound traffic:
//! connecting a UDP socket selects a route without sending anything, and the
//! socket's local address is then the LAN-facing interface.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use serde::Serialize;

pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Address apps are advertised on, plus why the probe fell back, if it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAddress {
    pub ip: IpAddr,
    pub fallback_reason: Option<String>,
}

impl ResolvedAddress {
    pub fn found(ip: IpAddr) -> Self {
        Self {
            ip,
            fallback_reason: None,
        }
    }

    pub fn loopback(reason: impl Into<String>) -> Self {
        Self {
            ip: LOOPBACK,
            fallback_reason: Some(reason.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Source of the address written into registry URLs.
pub trait AddressResolver {
    fn resolve(&self) -> ResolvedAddress;
}

/// Always returns the configured address.
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub IpAddr);

impl AddressResolver for FixedResolver {
    fn resolve(&self) -> ResolvedAddress {
        ResolvedAddress::found(self.0)
    }
}

/// Outbound-route probe against `target` (`host:port`). One attempt.
#[derive(Debug, Clone)]
pub struct ProbeResolver {
    target: String,
}

impl ProbeResolver {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl AddressResolver for ProbeResolver {
    fn resolve(&self) -> ResolvedAddress {
        match probe(&self.target) {
            Ok(ip) => {
                tracing::debug!(%ip, target = %self.target, "resolved local address");
                ResolvedAddress::found(ip)
            }
            Err(reason) => {
                tracing::warn!(
                    target = %self.target,
                    error = %reason,
                    "local address probe failed, using loopback"
                );
                ResolvedAddress::loopback(reason)
            }
        }
    }
}

fn probe(target: &str) -> Result<IpAddr, String> {
    let remote: SocketAddr = target
        .to_socket_addrs()
        .map_err(|e| format!("cannot resolve probe target '{target}': {e}"))?
        .next()
        .ok_or_else(|| format!("probe target '{target}' has no address"))?;

    let bind: SocketAddr = match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind).map_err(|e| format!("cannot open probe socket: {e}"))?;
    socket
        .connect(remote)
        .map_err(|e| format!("no route to {remote}: {e}"))?;
    let local = socket
        .local_addr()
        .map_err(|e| format!("cannot read probe socket address: {e}"))?;

    if local.ip().is_unspecified() {
        return Err(format!("no interface routes to {remote}"));
    }
    Ok(local.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_resolver_never_falls_back() {
        let ip: IpAddr = "192.168.1.50".parse().unwrap();
        let r = FixedResolver(ip).resolve();
        assert_eq!(r.ip, ip);
        assert!(!r.is_fallback());
    }

    #[test]
    fn unresolvable_target_falls_back_to_loopback() {
        let r = ProbeResolver::new("not a socket address").resolve();
        assert_eq!(r.ip, LOOPBACK);
        assert!(r.fallback_reason.unwrap().contains("not a socket address"));
    }

    #[test]
    fn loopback_target_resolves_to_loopback_without_fallback() {
        let r = ProbeResolver::new("127.0.0.1:9").resolve();
        assert_eq!(r.ip, LOOPBACK);
        assert!(!r.is_fallback());
    }
}
