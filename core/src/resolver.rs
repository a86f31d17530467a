//! The resolution **strategy**: native retries first, external tool last.
//!
//! Native attempts are retried immediately, without backoff, and their
//! individual failures are never reported. Only when all of them failed does
//! the resolver pick the interface whose subnet holds the target and hand it
//! to the [`FallbackProber`] under a fixed deadline.

use std::net::Ipv4Addr;
use std::sync::Arc;

use arping_common::config::Config;
use arping_common::error::{ProbeError, ResolveError};
use arping_common::network::interface::{self, InterfaceSource, SystemInterfaces};
use pnet::util::MacAddr;
use tracing::{debug, trace, warn};

use crate::prober::{PlatformProber, Prober};
use crate::tool::{ArpingTool, FallbackProber};

/// Outcome of the native tier.
enum NativeOutcome {
    Resolved(MacAddr),
    Exhausted { attempts: u32 },
}

pub struct Resolver<P, F = ArpingTool, S = SystemInterfaces> {
    prober: Arc<P>,
    fallback: F,
    interfaces: S,
    cfg: Config,
}

impl Resolver<PlatformProber> {
    /// The resolver for this platform: raw ARP or `SendARP` natively, the
    /// configured ARP tool as fallback, and the OS interface list.
    pub fn system(cfg: Config) -> Self {
        #[cfg(unix)]
        let prober = PlatformProber::new(cfg.reply_timeout);
        #[cfg(windows)]
        let prober = PlatformProber::new();

        let fallback = ArpingTool::new(cfg.tool.clone());
        Self::new(prober, fallback, SystemInterfaces, cfg)
    }
}

impl<P, F, S> Resolver<P, F, S>
where
    P: Prober + 'static,
    F: FallbackProber,
    S: InterfaceSource,
{
    pub fn new(prober: P, fallback: F, interfaces: S, cfg: Config) -> Self {
        Self {
            prober: Arc::new(prober),
            fallback,
            interfaces,
            cfg,
        }
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Resolves the hardware address of `ip`.
    pub async fn resolve(&self, ip: Ipv4Addr) -> Result<MacAddr, ResolveError> {
        let attempts = match self.probe_natively(ip).await {
            NativeOutcome::Resolved(mac) => return Ok(mac),
            NativeOutcome::Exhausted { attempts } => attempts,
        };
        debug!("native probing of {ip} exhausted after {attempts} attempt(s), falling back");

        let intf = interface::select_interface_for(ip, &self.interfaces)?;
        debug!("{ip} is reachable through {}", intf.name);

        match self.fallback.probe(ip, &intf, self.cfg.tool_timeout).await {
            Ok(mac) => Ok(mac),
            Err(source) => {
                warn!("fallback for {ip} failed: {source}");
                Err(ResolveError::ResolutionExhausted {
                    ip,
                    attempts: attempts + 1,
                    source: Box::new(source),
                })
            }
        }
    }

    /// A single native attempt, with its failure surfaced.
    pub async fn probe_once(&self, ip: Ipv4Addr) -> Result<MacAddr, ResolveError> {
        let prober = Arc::clone(&self.prober);
        let result = tokio::task::spawn_blocking(move || prober.probe_once(ip))
            .await
            .unwrap_or_else(|err| {
                Err(ProbeError::Unsupported(format!("probe task failed: {err}")))
            });
        result.map_err(|source| ResolveError::ProbeFailed { ip, source })
    }

    async fn probe_natively(&self, ip: Ipv4Addr) -> NativeOutcome {
        let retries = self.cfg.retries;
        if retries == 0 {
            return NativeOutcome::Exhausted { attempts: 0 };
        }

        let prober = Arc::clone(&self.prober);
        let fail_fast = self.cfg.skip_retries_on_permission_denied;
        let task =
            tokio::task::spawn_blocking(move || retry_probe(&*prober, ip, retries, fail_fast));

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("native probe task for {ip} failed: {err}");
                NativeOutcome::Exhausted { attempts: retries }
            }
        }
    }
}

fn retry_probe<P: Prober + ?Sized>(
    prober: &P,
    ip: Ipv4Addr,
    retries: u32,
    fail_fast: bool,
) -> NativeOutcome {
    let mut attempts = 0;
    while attempts < retries {
        attempts += 1;
        match prober.probe_once(ip) {
            Ok(mac) => return NativeOutcome::Resolved(mac),
            Err(err) => {
                trace!("attempt {attempts}/{retries} for {ip} failed: {err}");
                if fail_fast && err.is_permission_denied() {
                    break;
                }
            }
        }
    }
    NativeOutcome::Exhausted { attempts }
}
