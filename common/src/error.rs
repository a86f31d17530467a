use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single native ARP exchange.
///
/// The resolver treats every variant as retryable, unless it has been told to
/// give up early on [`ProbeError::PermissionDenied`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("insufficient privileges for a raw ARP probe: {0}")]
    PermissionDenied(String),
    #[error("no up interface has a subnet containing {0}")]
    NoInterface(Ipv4Addr),
    #[error("no ARP reply from {0} before the deadline")]
    NoReply(Ipv4Addr),
    #[error("native ARP probing is unavailable: {0}")]
    Unsupported(String),
    #[error("ARP probe I/O error: {0}")]
    Io(io::Error),
}

impl ProbeError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ProbeError::PermissionDenied(_))
    }
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied(err.to_string()),
            _ => ProbeError::Io(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("ARP probe for {ip} failed")]
    ProbeFailed {
        ip: Ipv4Addr,
        #[source]
        source: ProbeError,
    },
    #[error("no usable interface found for {ip}: {reason}")]
    NoUsableInterface { ip: Ipv4Addr, reason: String },
    #[error("`{command}` for {ip} timed out after {timeout:?}")]
    ExternalToolTimeout {
        ip: Ipv4Addr,
        command: String,
        timeout: Duration,
    },
    #[error("`{command}` for {ip} produced no recognizable hardware address")]
    ExternalToolParseFailure { ip: Ipv4Addr, command: String },
    #[error("could not run `{command}` for {ip}")]
    ExternalToolUnavailable {
        ip: Ipv4Addr,
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("get ARP hardware address of {ip} failed after {attempts} attempts")]
    ResolutionExhausted {
        ip: Ipv4Addr,
        attempts: u32,
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    /// The innermost failure, looking through [`ResolveError::ResolutionExhausted`].
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::ResolutionExhausted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root_cause(), ResolveError::ExternalToolTimeout { .. })
    }
}
