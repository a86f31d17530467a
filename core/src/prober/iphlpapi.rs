use std::ffi::c_void;
use std::io;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

use arping_common::error::ProbeError;
use pnet::util::MacAddr;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{s, w};

use super::Prober;

type SendArpFn = unsafe extern "system" fn(u32, u32, *mut c_void, *mut u32) -> u32;

static SEND_ARP: OnceLock<Result<SendArpFn, String>> = OnceLock::new();

/// Resolves `SendARP` from `iphlpapi.dll` once per process.
///
/// A failed load is cached too, so every probe reports the same reason.
fn get_send_arp() -> Result<SendArpFn, ProbeError> {
    SEND_ARP
        .get_or_init(|| {
            // SAFETY: both names are valid, NUL-terminated literals.
            unsafe {
                let module = LoadLibraryW(w!("iphlpapi.dll"))
                    .map_err(|err| format!("loading iphlpapi.dll: {err}"))?;
                let proc = GetProcAddress(module, s!("SendARP"))
                    .ok_or_else(|| "iphlpapi.dll does not export SendARP".to_string())?;
                Ok(std::mem::transmute::<unsafe extern "system" fn() -> isize, SendArpFn>(proc))
            }
        })
        .clone()
        .map_err(ProbeError::Unsupported)
}

/// Asks the Windows IP helper to ARP for the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendArpProber;

impl SendArpProber {
    pub fn new() -> Self {
        Self
    }
}

impl Prober for SendArpProber {
    fn probe_once(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError> {
        let send_arp = get_send_arp()?;
        // IPAddr is the address in network byte order.
        let dst = u32::from_ne_bytes(ip.octets());
        let mut mac = [0xffu8; 6];
        let mut len = mac.len() as u32;
        // SAFETY: `mac` is a writable 6-byte buffer and `len` holds its size.
        let ret = unsafe { send_arp(dst, 0, mac.as_mut_ptr().cast(), &mut len) };
        if ret != 0 {
            return Err(io::Error::from_raw_os_error(ret as i32).into());
        }
        if len as usize != mac.len() {
            return Err(ProbeError::NoReply(ip));
        }
        let [a, b, c, d, e, f] = mac;
        Ok(MacAddr::new(a, b, c, d, e, f))
    }
}
