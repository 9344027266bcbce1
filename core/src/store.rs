//! The **ports** through which the pipeline reaches the outside world.
//!
//! Every stage depends on these traits only. The concrete HTTP adapter lives
//! in [`crate::network`]; tests substitute an in-memory store.
//!
//! Each method is a single round trip. Implementations must not retry:
//! retry policy belongs to the caller, and the only cancellation policy is
//! whatever timeout the implementation's transport applies.

use async_trait::async_trait;
use tgsync_common::StoreError;
use tgsync_common::inventory::{
    AgentGroup, AgentGroupId, AgentRecord, AssetId, AssetPage, AssetQuery, AssetTag, GroupId,
    MemberList, NamedGroup,
};
use tgsync_common::scan::{Folder, ScanId, ScanSpec, ScanTemplate, ScannerRef};

/// The external asset/vulnerability inventory.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Assets observed within the query's lookback window that match its filter.
    async fn query_assets(&self, query: &AssetQuery) -> Result<AssetPage, StoreError>;

    /// Agents bound to an agent group.
    async fn query_agents(&self, group: &AgentGroupId) -> Result<Vec<AgentRecord>, StoreError>;

    /// Agent groups defined on the agent manager.
    async fn query_agent_groups(&self) -> Result<Vec<AgentGroup>, StoreError>;

    /// Every tag category/value pair defined in the inventory.
    async fn query_tag_values(&self) -> Result<Vec<AssetTag>, StoreError>;

    async fn query_named_groups(&self) -> Result<Vec<NamedGroup>, StoreError>;

    async fn create_named_group(
        &self,
        name: &str,
        members: &MemberList,
    ) -> Result<NamedGroup, StoreError>;

    /// Replaces the members of group `id` wholesale.
    async fn update_named_group(
        &self,
        id: &GroupId,
        name: &str,
        members: &MemberList,
    ) -> Result<NamedGroup, StoreError>;

    async fn delete_inventory_item(&self, id: &AssetId) -> Result<(), StoreError>;
}

/// Lookups and creation needed to launch a scan against a named group.
#[async_trait]
pub trait ScanLauncher: Send + Sync {
    async fn list_scanners(&self) -> Result<Vec<ScannerRef>, StoreError>;

    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError>;

    async fn list_templates(&self) -> Result<Vec<ScanTemplate>, StoreError>;

    /// Creates the scan and launches it immediately.
    async fn create_scan(&self, spec: &ScanSpec) -> Result<ScanId, StoreError>;
}
