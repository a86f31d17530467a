use std::net::Ipv4Addr;

use arping_common::config::Config;
use arping_core::resolver::Resolver;
use colored::*;
use tracing::error;

use crate::commands::resolve::warn_if_unprivileged;
use crate::terminal::{colors, print};

pub async fn probe(target: Ipv4Addr, cfg: Config) -> anyhow::Result<()> {
    warn_if_unprivileged();

    let resolver = Resolver::system(cfg);
    match resolver.probe_once(target).await {
        Ok(mac) => {
            print::print_status(format!(
                "reply from {} [{}]",
                target.to_string().color(colors::IPV4_ADDR),
                mac.to_string().color(colors::MAC_ADDR).bold()
            ));
            Ok(())
        }
        Err(err) => {
            error!("no reply from {target}, use `resolve` to retry and fall back");
            Err(err.into())
        }
    }
}
