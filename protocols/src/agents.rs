//! Scanners, agent groups and agents.

use serde::Deserialize;
use tgsync_common::inventory::{AgentGroup, AgentGroupId, AgentRecord, AssetTag};
use tgsync_common::network::Address;
use tgsync_common::scan::ScannerRef;
use tracing::debug;

use crate::error::DecodeError;
use crate::filters::pair;
use crate::{QueryPairs, ids};

pub const SCANNERS_PATH: &str = "/scanners";
pub const TAG_VALUES_PATH: &str = "/tags/values";

#[derive(Deserialize)]
struct ScannersBody {
    #[serde(default)]
    scanners: Vec<ScannerDto>,
}

#[derive(Deserialize)]
struct ScannerDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
    #[serde(default)]
    uuid: Option<String>,
    name: String,
}

#[derive(Deserialize)]
struct AgentGroupsBody {
    #[serde(default)]
    groups: Vec<AgentGroupDto>,
}

#[derive(Deserialize)]
struct AgentGroupDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct AgentsBody {
    #[serde(default)]
    agents: Vec<AgentDto>,
}

#[derive(Deserialize)]
struct AgentDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
    #[serde(default)]
    ip: Option<Address>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct TagValuesBody {
    #[serde(default)]
    values: Vec<TagValueDto>,
}

#[derive(Deserialize)]
struct TagValueDto {
    category_name: String,
    value: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

pub fn agent_groups_path(scanner_id: &str) -> String {
    format!("{SCANNERS_PATH}/{scanner_id}/agent-groups")
}

pub fn agents_path(scanner_id: &str) -> String {
    format!("{SCANNERS_PATH}/{scanner_id}/agents")
}

/// Query pairs listing the agents of one group, sorted by name.
///
/// Asks for one agent more than `ceiling` so an oversized group shows up
/// as over capacity instead of being silently truncated.
pub fn agents_query(group: &AgentGroupId, ceiling: usize) -> QueryPairs {
    vec![
        pair("offset", "0"),
        pair("limit", ceiling.saturating_add(1).to_string()),
        pair("sort", "name:asc"),
        pair("f", format!("groups:eq:{group}")),
        pair("ft", "and"),
    ]
}

pub fn decode_scanners(body: &[u8]) -> Result<Vec<ScannerRef>, DecodeError> {
    let parsed: ScannersBody = serde_json::from_slice(body).map_err(DecodeError::json("scanners"))?;
    Ok(parsed
        .scanners
        .into_iter()
        .map(|dto| ScannerRef {
            uuid: dto.uuid.unwrap_or_else(|| dto.id.clone()),
            id: dto.id,
            name: dto.name,
        })
        .collect())
}

pub fn decode_agent_groups(body: &[u8]) -> Result<Vec<AgentGroup>, DecodeError> {
    let parsed: AgentGroupsBody =
        serde_json::from_slice(body).map_err(DecodeError::json("agent groups"))?;
    Ok(parsed
        .groups
        .into_iter()
        .map(|dto| AgentGroup {
            id: AgentGroupId::new(dto.id),
            name: dto.name,
        })
        .collect())
}

/// Agents that never reported an address are skipped.
pub fn decode_agents(body: &[u8]) -> Result<Vec<AgentRecord>, DecodeError> {
    let parsed: AgentsBody = serde_json::from_slice(body).map_err(DecodeError::json("agents"))?;
    Ok(parsed
        .agents
        .into_iter()
        .filter_map(|dto| match dto.ip {
            Some(ip) => Some(AgentRecord {
                id: dto.id,
                ip,
                name: dto.name,
            }),
            None => {
                debug!("agent {} has no address, skipping", dto.id);
                None
            }
        })
        .collect())
}

pub fn decode_tag_values(body: &[u8]) -> Result<Vec<AssetTag>, DecodeError> {
    let parsed: TagValuesBody =
        serde_json::from_slice(body).map_err(DecodeError::json("tag values"))?;
    Ok(parsed
        .values
        .into_iter()
        .map(|dto| AssetTag {
            category: dto.category_name,
            value: dto.value,
            kind: dto.kind.unwrap_or_else(|| String::from("static")),
        })
        .collect())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
