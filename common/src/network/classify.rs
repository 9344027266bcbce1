//! # Address Classifier
//!
//! Pure, total functions over well-formed addresses. Malformed input never
//! reaches this module: it is rejected when parsed into an [`Address`].

use crate::network::address::Address;
use crate::network::cidr::Cidr;

/// Ranges treated as "internal": loopback plus the three RFC 1918 blocks.
pub static PRIVATE_RANGES: [Cidr; 4] = [
    Cidr::from_octets(127, 0, 0, 0, 8),
    Cidr::from_octets(10, 0, 0, 0, 8),
    Cidr::from_octets(172, 16, 0, 0, 12),
    Cidr::from_octets(192, 168, 0, 0, 16),
];

/// Default scan scope for agent-only hosts when no ranges are supplied.
pub static RFC1918_RANGES: [Cidr; 3] = [
    Cidr::from_octets(10, 0, 0, 0, 8),
    Cidr::from_octets(172, 16, 0, 0, 12),
    Cidr::from_octets(192, 168, 0, 0, 16),
];

pub fn is_private(addr: &Address) -> bool {
    PRIVATE_RANGES.iter().any(|range| range.contains(addr))
}

pub fn in_cidr(addr: &Address, cidr: &Cidr) -> bool {
    cidr.contains(addr)
}

pub fn in_any(addr: &Address, cidrs: &[Cidr]) -> bool {
    cidrs.iter().any(|cidr| cidr.contains(addr))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
