//! # In-Memory Store
//!
//! A complete [`InventoryStore`] and [`ScanLauncher`] held in process memory.
//! Server-side filters are evaluated locally so the pipeline behaves as it
//! would against the real inventory. Operations can be made to fail on
//! demand and every call is recorded in order.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tgsync_common::StoreError;
use tgsync_common::criterion::Severity;
use tgsync_common::inventory::{
    AgentGroup, AgentGroupId, AgentRecord, AssetFilter, AssetId, AssetPage, AssetQuery, AssetTag,
    GroupId, InventoryItem, MemberList, NamedGroup,
};
use tgsync_common::network::{Address, Cidr};
use tgsync_common::scan::{Folder, ScanId, ScanSpec, ScanTemplate, ScannerRef};

use crate::store::{InventoryStore, ScanLauncher};

#[derive(Default)]
struct State {
    assets: Vec<InventoryItem>,
    findings: Vec<(AssetId, Severity)>,
    reported_total: Option<usize>,
    agent_groups: Vec<AgentGroup>,
    agents: Vec<(AgentGroupId, Vec<AgentRecord>)>,
    tag_values: Vec<AssetTag>,
    groups: Vec<NamedGroup>,
    next_group: usize,
    scanners: Vec<ScannerRef>,
    folders: Vec<Folder>,
    templates: Vec<ScanTemplate>,
    scans: Vec<ScanSpec>,
    failing_operations: HashSet<String>,
    failing_deletes: HashSet<AssetId>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    // ── seeding ──────────────────────────────────────────────

    pub fn with_asset(mut self, item: InventoryItem) -> Self {
        self.state_mut().assets.push(item);
        self
    }

    /// Overrides the total reported by every asset query.
    pub fn with_reported_total(mut self, total: usize) -> Self {
        self.state_mut().reported_total = Some(total);
        self
    }

    pub fn with_agent_group(mut self, group: AgentGroup, agents: Vec<AgentRecord>) -> Self {
        let state = self.state_mut();
        state.agents.push((group.id.clone(), agents));
        state.agent_groups.push(group);
        self
    }

    /// Agents of a group that is not listed by `query_agent_groups`.
    pub fn with_agents(mut self, group: AgentGroupId, agents: Vec<AgentRecord>) -> Self {
        self.state_mut().agents.push((group, agents));
        self
    }

    pub fn with_tag_value(mut self, tag: AssetTag) -> Self {
        self.state_mut().tag_values.push(tag);
        self
    }

    pub fn with_group(mut self, name: &str, members: MemberList) -> Self {
        let state = self.state_mut();
        let id = state.allocate_group_id();
        state.groups.push(NamedGroup {
            id,
            name: name.to_string(),
            members,
        });
        self
    }

    pub fn with_scanner(mut self, scanner: ScannerRef) -> Self {
        self.state_mut().scanners.push(scanner);
        self
    }

    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.state_mut().folders.push(folder);
        self
    }

    pub fn with_template(mut self, template: ScanTemplate) -> Self {
        self.state_mut().templates.push(template);
        self
    }

    // ── runtime control ──────────────────────────────────────

    /// Records an active finding of `level` on asset `id`.
    pub fn add_finding(&self, id: &str, level: Severity) {
        self.state().findings.push((AssetId::new(id), level));
    }

    /// Every later call of the named trait method fails with a 500.
    pub fn fail_operation(&self, operation: &str) {
        self.state().failing_operations.insert(operation.to_string());
    }

    /// Deleting this asset fails with a 500; other deletes are unaffected.
    pub fn fail_delete(&self, id: &str) {
        self.state().failing_deletes.insert(AssetId::new(id));
    }

    // ── inspection ───────────────────────────────────────────

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn groups(&self) -> Vec<NamedGroup> {
        self.state().groups.clone()
    }

    pub fn group(&self, name: &str) -> Option<NamedGroup> {
        self.state().groups.iter().find(|g| g.name == name).cloned()
    }

    pub fn asset_ids(&self) -> Vec<AssetId> {
        self.state().assets.iter().map(|a| a.id.clone()).collect()
    }

    pub fn scans(&self) -> Vec<ScanSpec> {
        self.state().scans.clone()
    }

    /// Number of recorded calls whose description starts with `prefix`.
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

impl State {
    fn record(&mut self, operation: &str, detail: String) -> Result<(), StoreError> {
        if detail.is_empty() {
            self.calls.push(operation.to_string());
        } else {
            self.calls.push(format!("{operation} {detail}"));
        }

        if self.failing_operations.contains(operation) {
            return Err(StoreError::Status {
                status: 500,
                body: format!("injected failure in {operation}"),
            });
        }
        Ok(())
    }

    fn allocate_group_id(&mut self) -> GroupId {
        self.next_group += 1;
        GroupId::new(format!("tg-{}", self.next_group))
    }

    fn matches(&self, item: &InventoryItem, filter: &AssetFilter) -> bool {
        match filter {
            AssetFilter::All => true,
            AssetFilter::Tag { category, value } => item.has_tag(category, value),
            AssetFilter::Severity(level) => self
                .findings
                .iter()
                .any(|(id, found)| *id == item.id && found == level),
            AssetFilter::SourcesOnly(source) => item.seen_only_by(source),
            AssetFilter::NamedGroup(id) => self
                .groups
                .iter()
                .find(|group| group.id == *id)
                .is_some_and(|group| {
                    item.ipv4
                        .iter()
                        .any(|addr| group.members.iter().any(|entry| covers(entry, *addr)))
                }),
        }
    }
}

/// True when a member entry (address or CIDR) covers `addr`.
fn covers(entry: &str, addr: Address) -> bool {
    if let Ok(cidr) = entry.parse::<Cidr>() {
        return cidr.contains(&addr);
    }
    entry.parse::<Address>().is_ok_and(|member| member == addr)
}

fn describe(filter: &AssetFilter) -> String {
    match filter {
        AssetFilter::All => "all".to_string(),
        AssetFilter::Tag { category, value } => format!("tag {category}:{value}"),
        AssetFilter::Severity(level) => format!("severity {level}"),
        AssetFilter::SourcesOnly(source) => format!("sources-only {source}"),
        AssetFilter::NamedGroup(id) => format!("group {id}"),
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn query_assets(&self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        let mut state = self.state();
        state.record(
            "query_assets",
            format!("{} within {}d", describe(&query.filter), query.lookback_days),
        )?;

        let assets: Vec<InventoryItem> = state
            .assets
            .iter()
            .filter(|item| state.matches(item, &query.filter))
            .cloned()
            .collect();

        Ok(AssetPage {
            total: state.reported_total.unwrap_or(assets.len()),
            assets,
        })
    }

    async fn query_agents(&self, group: &AgentGroupId) -> Result<Vec<AgentRecord>, StoreError> {
        let mut state = self.state();
        state.record("query_agents", group.to_string())?;

        Ok(state
            .agents
            .iter()
            .find(|(id, _)| id == group)
            .map(|(_, agents)| agents.clone())
            .unwrap_or_default())
    }

    async fn query_agent_groups(&self) -> Result<Vec<AgentGroup>, StoreError> {
        let mut state = self.state();
        state.record("query_agent_groups", String::new())?;
        Ok(state.agent_groups.clone())
    }

    async fn query_tag_values(&self) -> Result<Vec<AssetTag>, StoreError> {
        let mut state = self.state();
        state.record("query_tag_values", String::new())?;
        Ok(state.tag_values.clone())
    }

    async fn query_named_groups(&self) -> Result<Vec<NamedGroup>, StoreError> {
        let mut state = self.state();
        state.record("query_named_groups", String::new())?;
        Ok(state.groups.clone())
    }

    async fn create_named_group(
        &self,
        name: &str,
        members: &MemberList,
    ) -> Result<NamedGroup, StoreError> {
        let mut state = self.state();
        state.record("create_named_group", name.to_string())?;

        let group = NamedGroup {
            id: state.allocate_group_id(),
            name: name.to_string(),
            members: members.clone(),
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn update_named_group(
        &self,
        id: &GroupId,
        name: &str,
        members: &MemberList,
    ) -> Result<NamedGroup, StoreError> {
        let mut state = self.state();
        state.record("update_named_group", name.to_string())?;

        let Some(group) = state.groups.iter_mut().find(|group| group.id == *id) else {
            return Err(StoreError::Status {
                status: 404,
                body: format!("no target group {id}"),
            });
        };
        group.name = name.to_string();
        group.members = members.clone();
        Ok(group.clone())
    }

    async fn delete_inventory_item(&self, id: &AssetId) -> Result<(), StoreError> {
        let mut state = self.state();
        state.record("delete_inventory_item", id.to_string())?;

        if state.failing_deletes.contains(id) {
            return Err(StoreError::Status {
                status: 500,
                body: format!("could not delete {id}"),
            });
        }

        let before = state.assets.len();
        state.assets.retain(|item| item.id != *id);
        if state.assets.len() == before {
            return Err(StoreError::Status {
                status: 404,
                body: format!("no asset {id}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScanLauncher for MemoryStore {
    async fn list_scanners(&self) -> Result<Vec<ScannerRef>, StoreError> {
        let mut state = self.state();
        state.record("list_scanners", String::new())?;
        Ok(state.scanners.clone())
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError> {
        let mut state = self.state();
        state.record("list_folders", String::new())?;
        Ok(state.folders.clone())
    }

    async fn list_templates(&self) -> Result<Vec<ScanTemplate>, StoreError> {
        let mut state = self.state();
        state.record("list_templates", String::new())?;
        Ok(state.templates.clone())
    }

    async fn create_scan(&self, spec: &ScanSpec) -> Result<ScanId, StoreError> {
        let mut state = self.state();
        state.record("create_scan", spec.name.clone())?;
        state.scans.push(spec.clone());
        Ok(ScanId(format!("scan-{}", state.scans.len())))
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
