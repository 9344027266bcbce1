//! # Network Model
//!
//! * [`address::Address`]: a validated IPv4 dotted quad.
//! * [`cidr::Cidr`]: a network address plus prefix length.
//! * [`classify`]: private-range and CIDR containment tests.

pub mod address;
pub mod cidr;
pub mod classify;

pub use address::{Address, SENTINEL};
pub use cidr::Cidr;
