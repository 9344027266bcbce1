//! # Inventory API wire layer
//!
//! Request builders and response decoders for the inventory REST API.
//! Nothing in here performs I/O: builders return paths, query pairs and
//! JSON bodies, decoders turn response bodies into domain records.

pub mod agents;
pub mod error;
pub mod filters;
pub mod scans;
pub mod target_groups;
pub mod workbench;

mod ids;

pub use error::DecodeError;

/// Query string pairs, encoded by the transport.
pub type QueryPairs = Vec<(String, String)>;
