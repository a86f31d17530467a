//! Hardware address resolution for hosts on the local segment.
//!
//! The [`resolver::Resolver`] drives a bounded number of native ARP probes and,
//! once those are exhausted, falls back to an external ARP tool run on the
//! interface whose subnet contains the target.

pub mod prober;
pub mod resolver;
pub mod tool;
