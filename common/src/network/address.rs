//! # IPv4 Address Model
//!
//! Addresses as the inventory reports them. Parsing is strict: exactly four
//! decimal octets in `0..=255`, nothing else. `0.0.0.0` is the upstream
//! placeholder for "no address observed" and is exposed as [`SENTINEL`].

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Upstream placeholder meaning "absent/unknown".
pub const SENTINEL: Address = Address(Ipv4Addr::UNSPECIFIED);

/// A well-formed IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(Ipv4Addr);

impl Address {
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(Ipv4Addr::new(a, b, c, d))
    }

    pub fn is_sentinel(&self) -> bool {
        self.0.is_unspecified()
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }

    pub fn to_bits(self) -> u32 {
        u32::from(self.0)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parses a dotted quad such as `192.168.1.5`.
    ///
    /// Rejects anything `std` would also reject, plus leading `+` signs and
    /// octets longer than three digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| Error::MalformedInput {
            kind: "address",
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(malformed(format!("expected 4 octets, found {}", parts.len())));
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed(format!("invalid octet '{part}'")));
            }
            *slot = part
                .parse::<u8>()
                .map_err(|_| malformed(format!("octet '{part}' is out of range")))?;
        }

        Ok(Self(Ipv4Addr::from(octets)))
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
