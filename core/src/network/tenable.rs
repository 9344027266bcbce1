//! # Tenable Store
//!
//! [`InventoryStore`] and [`ScanLauncher`] over the Tenable.io REST API.
//! Request shapes and response decoding live in `tgsync_protocols`; this
//! adapter only sequences round trips.

use async_trait::async_trait;
use reqwest::Method;
use tgsync_common::StoreError;
use tgsync_common::inventory::{
    AgentGroup, AgentGroupId, AgentRecord, AssetId, AssetPage, AssetQuery, AssetTag, GroupId,
    MemberList, NamedGroup,
};
use tgsync_common::scan::{Folder, ScanId, ScanSpec, ScanTemplate, ScannerRef};
use tgsync_protocols::{agents, filters, scans, target_groups, workbench};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::transport::{ApiClient, ApiSettings};
use crate::store::{InventoryStore, ScanLauncher};

pub struct TenableStore {
    api: ApiClient,
    agent_manager: String,
    capacity_ceiling: usize,
    manager_id: OnceCell<Option<String>>,
}

impl TenableStore {
    pub fn new(settings: &ApiSettings, capacity_ceiling: usize) -> anyhow::Result<Self> {
        Ok(Self {
            api: ApiClient::new(settings)?,
            agent_manager: settings.agent_manager.clone(),
            capacity_ceiling,
            manager_id: OnceCell::new(),
        })
    }

    /// Id of the first scanner whose name contains the agent manager name.
    async fn manager_id(&self) -> Result<Option<&str>, StoreError> {
        let id = self
            .manager_id
            .get_or_try_init(|| async {
                let body = self.api.get(agents::SCANNERS_PATH, &Vec::new()).await?;
                let found = agents::decode_scanners(&body)?
                    .into_iter()
                    .find(|scanner| scanner.name.contains(&self.agent_manager))
                    .map(|scanner| scanner.id);

                match &found {
                    Some(id) => debug!("agent manager '{}' is scanner {id}", self.agent_manager),
                    None => warn!("No scanner name contains '{}'", self.agent_manager),
                }
                Ok::<_, StoreError>(found)
            })
            .await?;
        Ok(id.as_deref())
    }
}

#[async_trait]
impl InventoryStore for TenableStore {
    async fn query_assets(&self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        let (path, params) = filters::asset_query(query);
        let body = self.api.get(path, &params).await?;
        Ok(workbench::decode_assets(&body)?)
    }

    async fn query_agents(&self, group: &AgentGroupId) -> Result<Vec<AgentRecord>, StoreError> {
        let Some(manager) = self.manager_id().await? else {
            return Ok(Vec::new());
        };
        let params = agents::agents_query(group, self.capacity_ceiling);
        let body = self.api.get(&agents::agents_path(manager), &params).await?;
        Ok(agents::decode_agents(&body)?)
    }

    async fn query_agent_groups(&self) -> Result<Vec<AgentGroup>, StoreError> {
        let Some(manager) = self.manager_id().await? else {
            return Ok(Vec::new());
        };
        let body = self
            .api
            .get(&agents::agent_groups_path(manager), &Vec::new())
            .await?;
        Ok(agents::decode_agent_groups(&body)?)
    }

    async fn query_tag_values(&self) -> Result<Vec<AssetTag>, StoreError> {
        let body = self.api.get(agents::TAG_VALUES_PATH, &Vec::new()).await?;
        Ok(agents::decode_tag_values(&body)?)
    }

    async fn query_named_groups(&self) -> Result<Vec<NamedGroup>, StoreError> {
        let body = self
            .api
            .get(target_groups::TARGET_GROUPS_PATH, &Vec::new())
            .await?;
        Ok(target_groups::decode_groups(&body)?)
    }

    async fn create_named_group(
        &self,
        name: &str,
        members: &MemberList,
    ) -> Result<NamedGroup, StoreError> {
        let payload = target_groups::create_payload(name, members);
        let body = self
            .api
            .send_json(Method::POST, target_groups::TARGET_GROUPS_PATH, &payload)
            .await?;
        Ok(target_groups::decode_group(&body)?)
    }

    async fn update_named_group(
        &self,
        id: &GroupId,
        name: &str,
        members: &MemberList,
    ) -> Result<NamedGroup, StoreError> {
        let payload = target_groups::create_payload(name, members);
        let body = self
            .api
            .send_json(Method::PUT, &target_groups::group_path(id), &payload)
            .await?;
        Ok(target_groups::decode_group(&body)?)
    }

    async fn delete_inventory_item(&self, id: &AssetId) -> Result<(), StoreError> {
        self.api
            .delete(&format!("{}/{id}", filters::ASSETS_PATH))
            .await
    }
}

#[async_trait]
impl ScanLauncher for TenableStore {
    async fn list_scanners(&self) -> Result<Vec<ScannerRef>, StoreError> {
        let body = self.api.get(agents::SCANNERS_PATH, &Vec::new()).await?;
        Ok(agents::decode_scanners(&body)?)
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError> {
        let body = self.api.get(scans::FOLDERS_PATH, &Vec::new()).await?;
        Ok(scans::decode_folders(&body)?)
    }

    async fn list_templates(&self) -> Result<Vec<ScanTemplate>, StoreError> {
        let body = self.api.get(scans::TEMPLATES_PATH, &Vec::new()).await?;
        Ok(scans::decode_templates(&body)?)
    }

    async fn create_scan(&self, spec: &ScanSpec) -> Result<ScanId, StoreError> {
        let payload = scans::create_payload(spec);
        let body = self
            .api
            .send_json(Method::POST, scans::SCANS_PATH, &payload)
            .await?;
        Ok(scans::decode_created_scan(&body)?)
    }
}
