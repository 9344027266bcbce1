//! # tgsync core
//!
//! Application services built on the domain model in `tgsync_common`.
//!
//! * **[`store`]**: Ports to the inventory and the scan API.
//! * **[`resolver`]**: Turns a criterion into raw address candidates.
//! * **[`builder`]**: Filters candidates into a group member list.
//! * **[`reconciler`]**: Creates or updates the named group.
//! * **[`executor`]**: Bulk deletion of inventory items on a worker pool.
//! * **[`scan`]**: Launches a scan against a reconciled group.
//! * **[`pipeline`]**: Wires the stages together.
//! * **[`network`]**: The HTTP adapter.
//! * **[`memory`]**: An in-process adapter.

pub mod builder;
pub mod executor;
pub mod memory;
pub mod network;
pub mod pipeline;
pub mod reconciler;
pub mod resolver;
pub mod scan;
pub mod store;

pub use pipeline::{CriterionKind, Pipeline, PurgeOutcome, PurgePlan, SyncOutcome, SyncReport};
