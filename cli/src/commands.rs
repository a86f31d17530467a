pub mod iface;
pub mod probe;
pub mod resolve;

use std::net::Ipv4Addr;

use arping_common::config::{self, Config};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arping")]
#[command(about = "Resolve the hardware address of a host on the local network.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a MAC address, falling back to the external arping tool
    #[command(alias = "r")]
    Resolve {
        target: Ipv4Addr,
        #[command(flatten)]
        opts: ResolveOpts,
    },
    /// Send a single native ARP probe, without retries or fallback
    #[command(alias = "p")]
    Probe {
        target: Ipv4Addr,
        #[command(flatten)]
        opts: ResolveOpts,
    },
    /// Show which local interface would be used to reach a target
    #[command(alias = "i")]
    Iface { target: Ipv4Addr },
}

#[derive(Args)]
pub struct ResolveOpts {
    /// Native probe attempts before falling back
    #[arg(short, long, default_value_t = config::DEFAULT_RETRY_TIMES)]
    pub retries: u32,

    /// Deadline for the external tool, in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_TOOL_TIMEOUT.as_millis() as u64)]
    pub tool_timeout: u64,

    /// Wait for a native ARP reply, in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_REPLY_TIMEOUT.as_millis() as u64)]
    pub reply_timeout: u64,

    /// External ARP tool used on the fallback path
    #[arg(long, default_value = config::DEFAULT_TOOL)]
    pub tool: String,

    /// Go straight to the fallback when raw probing is not permitted
    #[arg(long)]
    pub fail_fast: bool,
}

impl From<&ResolveOpts> for Config {
    fn from(opts: &ResolveOpts) -> Self {
        Config {
            retries: opts.retries,
            tool_timeout: std::time::Duration::from_millis(opts.tool_timeout),
            reply_timeout: std::time::Duration::from_millis(opts.reply_timeout),
            tool: opts.tool.clone(),
            skip_retries_on_permission_denied: opts.fail_fast,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
