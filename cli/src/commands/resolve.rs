use std::net::Ipv4Addr;
use std::time::Instant;

use arping_common::config::Config;
use arping_core::resolver::Resolver;
use colored::*;
use tracing::warn;

use crate::terminal::{colors, print};

pub async fn resolve(target: Ipv4Addr, cfg: Config) -> anyhow::Result<()> {
    warn_if_unprivileged();

    let start_time: Instant = Instant::now();
    let resolver = Resolver::system(cfg);
    match resolver.resolve(target).await {
        Ok(mac) => {
            print::fat_separator();
            print::print_status(format!(
                "{} is at {} ({:.2}s)",
                target.to_string().color(colors::IPV4_ADDR),
                mac.to_string().color(colors::MAC_ADDR).bold(),
                start_time.elapsed().as_secs_f64()
            ));
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn warn_if_unprivileged() {
    if cfg!(unix) && !is_root::is_root() {
        warn!("not running as root, raw ARP probes will likely be refused");
    }
}
