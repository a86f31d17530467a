use std::time::Duration;

/// How many native probes are attempted before switching to the external tool.
pub const DEFAULT_RETRY_TIMES: u32 = 10;

/// Upper bound on a single run of the external ARP tool.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(3);

/// How long one native probe waits for the matching ARP reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// Name of the external ARP utility, resolved through `PATH`.
pub const DEFAULT_TOOL: &str = "arping";

/// Six pairs of hex digits separated by `:` or `-`.
pub const MAC_PATTERN: &str = "([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})";

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of native probe attempts before falling back.
    ///
    /// Zero skips the native tier entirely.
    pub retries: u32,
    /// Deadline for the external tool, measured from spawn.
    pub tool_timeout: Duration,
    /// Per-attempt wait for an ARP reply on the native path.
    pub reply_timeout: Duration,
    /// Program invoked on the fallback path.
    pub tool: String,
    /// Stop retrying natively as soon as an attempt is refused for lack of
    /// privileges, since every further attempt would fail the same way.
    pub skip_retries_on_permission_denied: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRY_TIMES,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            tool: DEFAULT_TOOL.to_string(),
            skip_retries_on_permission_denied: false,
        }
    }
}
