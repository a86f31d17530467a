use std::str::FromStr;
use std::sync::OnceLock;

use pnet::util::MacAddr;
use regex::Regex;

use crate::config::MAC_PATTERN;

static MAC_REGEX: OnceLock<Regex> = OnceLock::new();

/// Retrieves or compiles the hardware address pattern.
fn get_mac_regex() -> &'static Regex {
    MAC_REGEX.get_or_init(|| Regex::new(MAC_PATTERN).expect("MAC_PATTERN is a valid regex"))
}

/// Scans free-form tool output and returns the first hardware address in it.
///
/// Octets may be separated by `:` or `-`, e.g. `aa:bb:cc:dd:ee:ff` or
/// `AA-BB-CC-DD-EE-FF`.
pub fn find_hardware_addr(output: &str) -> Option<MacAddr> {
    let found = get_mac_regex().find(output)?;
    parse_hardware_addr(found.as_str())
}

/// Parses six hex octets separated by `:` or `-`.
///
/// Every separator must match the first one, so `00:11-22:33:44:55` is rejected.
pub fn parse_hardware_addr(text: &str) -> Option<MacAddr> {
    let sep = text.chars().find(|c| matches!(c, ':' | '-'))?;
    let other = if sep == ':' { '-' } else { ':' };
    if text.contains(other) {
        return None;
    }
    MacAddr::from_str(&text.replace('-', ":")).ok()
}
