use std::net::Ipv4Addr;

use arping_common::network::interface::{self, SystemInterfaces};

use crate::terminal::{network_fmt, print};

pub fn iface(target: Ipv4Addr) -> anyhow::Result<()> {
    let intf = interface::select_interface_for(target, &SystemInterfaces)?;
    print::print_status(format!("{target} is reachable through {}", intf.name));
    network_fmt::print_interface(&intf, 0);
    Ok(())
}
