//! The native probing **abstraction**.
//!
//! A [`Prober`] performs exactly one ARP request/reply exchange. The concrete
//! implementation is chosen at build time:
//!
//! - **Unix**: [`RawSocketProber`] writes an ARP request on a raw Ethernet
//!   channel and waits for the reply. Requires root (or `CAP_NET_RAW`).
//! - **Windows**: [`SendArpProber`] calls `SendARP` from `iphlpapi.dll`.

use std::net::Ipv4Addr;

use arping_common::error::ProbeError;
use pnet::util::MacAddr;

#[cfg(unix)]
mod raw;
#[cfg(windows)]
mod iphlpapi;

#[cfg(unix)]
pub use raw::RawSocketProber;
#[cfg(windows)]
pub use iphlpapi::SendArpProber;

#[cfg(unix)]
pub type PlatformProber = RawSocketProber;
#[cfg(windows)]
pub type PlatformProber = SendArpProber;

/// One synchronous ARP exchange for a destination address.
pub trait Prober: Send + Sync {
    fn probe_once(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError>;
}

impl<P: Prober + ?Sized> Prober for Box<P> {
    fn probe_once(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError> {
        (**self).probe_once(ip)
    }
}
