//! # CIDR Model
//!
//! A network address plus prefix length, e.g. `192.168.1.0/24`.
//!
//! The network address is kept exactly as given (`10.18.4.7/16` stays
//! `10.18.4.7/16` when rendered) since it ends up in group names; containment
//! always compares the masked bits.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::network::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    network: Address,
    prefix: u8,
}

impl Cidr {
    pub fn new(network: Address, prefix: u8) -> Result<Self, Error> {
        if prefix > 32 {
            return Err(Error::MalformedInput {
                kind: "cidr",
                input: format!("{network}/{prefix}"),
                reason: format!("prefix {prefix} > 32"),
            });
        }
        Ok(Self { network, prefix })
    }

    /// Table constructor for ranges known to be valid at compile time.
    pub(crate) const fn from_octets(a: u8, b: u8, c: u8, d: u8, prefix: u8) -> Self {
        Self {
            network: Address::new(a, b, c, d),
            prefix,
        }
    }

    pub fn network(&self) -> Address {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Leftmost `prefix` bits set.
    pub fn mask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - self.prefix)
        }
    }

    /// `(addr & mask) == (network & mask)`.
    pub fn contains(&self, addr: &Address) -> bool {
        let mask = self.mask();
        (addr.to_bits() & mask) == (self.network.to_bits() & mask)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = Error;

    /// Parses CIDR notation like "192.168.1.0/24".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = |reason: String| Error::MalformedInput {
            kind: "cidr",
            input: s.to_string(),
            reason,
        };

        let Some((ip_str, prefix_str)) = s.split_once('/') else {
            return Err(malformed("missing '/prefix'".to_string()));
        };

        let network = ip_str
            .parse::<Address>()
            .map_err(|e| malformed(format!("invalid network address: {e}")))?;

        if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(format!("invalid prefix '{prefix_str}'")));
        }
        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|_| malformed(format!("invalid prefix '{prefix_str}'")))?;

        Self::new(network, prefix).map_err(|_| malformed(format!("prefix {prefix} > 32")))
    }
}

/// Parses a comma-separated list such as "10.0.0.0/8, 192.168.0.0/16".
pub fn parse_list(s: &str) -> Result<Vec<Cidr>, Error> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Cidr::from_str)
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
