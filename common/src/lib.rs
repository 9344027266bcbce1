//! # tgsync common
//!
//! Domain model shared by every crate in the workspace. Pure Rust, no I/O.
//!
//! * **[`network`]**: IPv4 addresses, CIDR blocks and the address classifier.
//! * **[`criterion`]**: The grouping criteria that drive candidate resolution.
//! * **[`inventory`]**: Records exchanged with the external inventory store.
//! * **[`scan`]**: Scan prerequisites and definitions.
//! * **[`config`]**: Explicit pipeline configuration.
//! * **[`error`]**: Error kinds surfaced by the pipeline.

pub mod config;
pub mod criterion;
pub mod error;
pub mod inventory;
pub mod network;
pub mod scan;

pub use error::{Error, Result, StoreError};
