use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use tracing::trace;

use crate::error::ResolveError;

/// Anything that can hand out a snapshot of the local interfaces.
pub trait InterfaceSource {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, ResolveError>;
}

/// Interfaces as reported by the operating system at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, ResolveError> {
        Ok(datalink::interfaces())
    }
}

/// Enumerates the interfaces of `source` and picks the one that can reach `ip`.
///
/// An enumeration failure is reported as [`ResolveError::NoUsableInterface`].
pub fn select_interface_for(
    ip: Ipv4Addr,
    source: &impl InterfaceSource,
) -> Result<NetworkInterface, ResolveError> {
    let interfaces = source
        .interfaces()
        .map_err(|err| ResolveError::NoUsableInterface {
            ip,
            reason: format!("interface enumeration failed: {err}"),
        })?;
    trace!("{} interface(s) enumerated while looking for {ip}", interfaces.len());
    select_interface(ip, &interfaces)
}

/// Returns the first interface, in enumeration order, that is up and has an
/// IPv4 network containing `ip`.
pub fn select_interface(
    ip: Ipv4Addr,
    interfaces: &[NetworkInterface],
) -> Result<NetworkInterface, ResolveError> {
    interfaces
        .iter()
        .filter(|iface| iface.is_up())
        .find(|iface| find_network_for(iface, ip).is_some())
        .cloned()
        .ok_or_else(|| ResolveError::NoUsableInterface {
            ip,
            reason: format!(
                "none of {} interface(s) is up on a subnet containing it",
                interfaces.len()
            ),
        })
}

/// The IPv4 network of `iface` that contains `ip`, if any.
///
/// Its `ip()` is the local address to use as ARP sender.
pub fn find_network_for(iface: &NetworkInterface, ip: Ipv4Addr) -> Option<Ipv4Network> {
    iface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.contains(ip) => Some(*v4),
        _ => None,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
