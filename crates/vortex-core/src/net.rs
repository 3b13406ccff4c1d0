//! Primary address discovery.
//!
//! Finds the local address the OS routing table would use to reach the
//! outside world. A UDP socket is "connected" to a public address so the
//! kernel picks an outbound interface; nothing is ever sent.
//!
//! This is a heuristic: the result is the address of the outbound
//! interface, which is not necessarily reachable from the public internet.

use crate::error::{Error, Result};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use tracing::debug;

/// Default probe target, an always-routable public resolver.
pub const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:80";

/// Return the primary local address using [`DEFAULT_PROBE_ADDR`].
pub fn primary_address() -> Result<IpAddr> {
    probe_address(DEFAULT_PROBE_ADDR)
}

/// Return the local address the OS selects to reach `target`.
///
/// `target` must be a literal socket address (`ip:port`); no name
/// resolution happens here.
pub fn probe_address(target: &str) -> Result<IpAddr> {
    let target: SocketAddr = target.parse().map_err(|e| {
        Error::NoRoute(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid probe address '{}': {}", target, e),
        ))
    })?;

    let bind_addr = match target {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };

    // The socket is dropped on every return path below.
    let socket = UdpSocket::bind(bind_addr).map_err(Error::NoRoute)?;
    socket.connect(target).map_err(Error::NoRoute)?;
    let local = socket.local_addr().map_err(Error::NoRoute)?.ip();

    if local.is_unspecified() {
        return Err(Error::NoRoute(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no interface selected for {}", target),
        )));
    }

    debug!(probe = %target, address = %local, "Discovered primary address");
    Ok(local)
}
