use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use arping_common::error::ProbeError;
use arping_common::network::interface::{self, InterfaceSource, SystemInterfaces};
use pnet::datalink::{self, Channel, NetworkInterface};
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;
use tracing::trace;

use super::Prober;

const ETH_HDR_LEN: usize = 14;
const ARP_LEN: usize = 28;
const MIN_ETH_FRAME_NO_FCS: usize = 60;
const READ_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Sends a single broadcast ARP request over a raw Ethernet channel and waits
/// for the target's reply.
#[derive(Debug, Clone)]
pub struct RawSocketProber<S = SystemInterfaces> {
    interfaces: S,
    reply_timeout: Duration,
}

impl RawSocketProber {
    pub fn new(reply_timeout: Duration) -> Self {
        Self::with_interfaces(SystemInterfaces, reply_timeout)
    }
}

impl<S: InterfaceSource> RawSocketProber<S> {
    pub fn with_interfaces(interfaces: S, reply_timeout: Duration) -> Self {
        Self {
            interfaces,
            reply_timeout,
        }
    }
}

impl<S: InterfaceSource + Send + Sync> Prober for RawSocketProber<S> {
    fn probe_once(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError> {
        let intf = interface::select_interface_for(ip, &self.interfaces)
            .map_err(|_| ProbeError::NoInterface(ip))?;
        let (src_mac, src_addr) = sender_identity(&intf, ip)?;

        let cfg = datalink::Config {
            read_timeout: Some(READ_POLL_INTERVAL),
            ..Default::default()
        };
        let (mut tx, mut rx) = match datalink::channel(&intf, cfg)? {
            Channel::Ethernet(tx, rx) => (tx, rx),
            _ => {
                return Err(ProbeError::Unsupported(format!(
                    "{} does not provide an Ethernet channel",
                    intf.name
                )));
            }
        };

        let request = create_request(src_mac, src_addr, ip)?;
        match tx.send_to(&request, None) {
            Some(Ok(())) => {}
            Some(Err(err)) => return Err(err.into()),
            None => {
                return Err(ProbeError::Unsupported(format!(
                    "{} refused the ARP request",
                    intf.name
                )));
            }
        }
        trace!("ARP request for {ip} sent on {} from {src_addr}", intf.name);

        let deadline = Instant::now() + self.reply_timeout;
        while Instant::now() < deadline {
            match rx.next() {
                Ok(frame) => {
                    if let Some(mac) = get_reply_sender(frame, ip) {
                        return Ok(mac);
                    }
                }
                Err(err) if is_poll_timeout(&err) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(ProbeError::NoReply(ip))
    }
}

fn is_poll_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn sender_identity(
    intf: &NetworkInterface,
    ip: Ipv4Addr,
) -> Result<(MacAddr, Ipv4Addr), ProbeError> {
    let mac = intf.mac.ok_or_else(|| {
        ProbeError::Unsupported(format!("{} has no hardware address", intf.name))
    })?;
    let net = interface::find_network_for(intf, ip).ok_or(ProbeError::NoInterface(ip))?;
    Ok((mac, net.ip()))
}

/// Builds a broadcast Ethernet frame carrying an ARP who-has for `dst_addr`.
fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
) -> Result<Vec<u8>, ProbeError> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    {
        let mut eth = MutableEthernetPacket::new(&mut buffer)
            .ok_or_else(|| ProbeError::Unsupported("Ethernet buffer too small".into()))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }
    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or_else(|| ProbeError::Unsupported("ARP buffer too small".into()))?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(ArpOperations::Request);
    arp_packet.set_sender_hw_addr(src_mac);
    arp_packet.set_target_hw_addr(MacAddr::zero());
    arp_packet.set_sender_proto_addr(src_addr);
    arp_packet.set_target_proto_addr(dst_addr);
    Ok(Vec::from(buffer))
}

/// Hardware address of `target` if `frame` is its ARP reply.
fn get_reply_sender(frame: &[u8], target: Ipv4Addr) -> Option<MacAddr> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply || arp.get_sender_proto_addr() != target {
        return None;
    }
    Some(arp.get_sender_hw_addr())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
