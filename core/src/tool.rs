//! Fallback resolution through an external ARP utility.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

use arping_common::config::DEFAULT_TOOL;
use arping_common::error::ResolveError;
use arping_common::network::mac;
use async_trait::async_trait;
use pnet::datalink::NetworkInterface;
use pnet::util::MacAddr;
use tokio::process::Command;
use tracing::debug;

/// Resolves a hardware address by other means once native probing gave up.
#[async_trait]
pub trait FallbackProber: Send + Sync {
    /// Must return within roughly `timeout`, whatever the probe itself does.
    async fn probe(
        &self,
        ip: Ipv4Addr,
        intf: &NetworkInterface,
        timeout: Duration,
    ) -> Result<MacAddr, ResolveError>;
}

/// Runs `arping -f -I <interface> <ip>` and scans its output for a MAC address.
#[derive(Debug, Clone)]
pub struct ArpingTool {
    program: String,
    prefix_args: Vec<String>,
}

impl Default for ArpingTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl ArpingTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Arguments placed before the probe arguments, e.g. `busybox arping`.
    pub fn with_prefix_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn args(&self, ip: Ipv4Addr, intf: &NetworkInterface) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        args.extend([
            "-f".to_string(),
            "-I".to_string(),
            intf.name.clone(),
            ip.to_string(),
        ]);
        args
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }
}

#[async_trait]
impl FallbackProber for ArpingTool {
    async fn probe(
        &self,
        ip: Ipv4Addr,
        intf: &NetworkInterface,
        timeout: Duration,
    ) -> Result<MacAddr, ResolveError> {
        let args = self.args(ip, intf);
        let command = self.command_line(&args);
        debug!("running `{command}` with a {timeout:?} deadline");

        // Dropping the output future on timeout also kills the child.
        let run = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ResolveError::ExternalToolUnavailable {
                    ip,
                    command,
                    source,
                });
            }
            Err(_elapsed) => {
                return Err(ResolveError::ExternalToolTimeout {
                    ip,
                    command,
                    timeout,
                });
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        mac::find_hardware_addr(&text)
            .ok_or(ResolveError::ExternalToolParseFailure { ip, command })
    }
}
