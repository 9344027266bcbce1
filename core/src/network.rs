//! HTTP adapter for the inventory ports.

pub mod tenable;
pub mod transport;

pub use tenable::TenableStore;
pub use transport::{ApiClient, ApiSettings};
