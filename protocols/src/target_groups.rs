//! Named address groups ("target groups").

use serde::{Deserialize, Serialize};
use tgsync_common::inventory::{GroupId, MemberList, NamedGroup};

use crate::error::DecodeError;
use crate::ids;

pub const TARGET_GROUPS_PATH: &str = "/target-groups";

/// Default ACL permission level granted on created groups.
const DEFAULT_ACL_PERMISSIONS: u32 = 64;

/// Create and update body for a named group.
#[derive(Debug, Serialize)]
pub struct GroupPayload<'a> {
    name: &'a str,
    members: String,
    #[serde(rename = "type")]
    kind: &'static str,
    acls: [Acl; 1],
}

#[derive(Debug, Serialize)]
struct Acl {
    permissions: u32,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct GroupsBody {
    #[serde(default)]
    target_groups: Vec<GroupDto>,
}

#[derive(Deserialize)]
struct GroupDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
    name: String,
    #[serde(default)]
    members: Option<String>,
}

impl From<GroupDto> for NamedGroup {
    fn from(dto: GroupDto) -> Self {
        NamedGroup {
            id: GroupId::new(dto.id),
            name: dto.name,
            members: MemberList::parse(dto.members.as_deref().unwrap_or_default()),
        }
    }
}

pub fn group_path(id: &GroupId) -> String {
    format!("{TARGET_GROUPS_PATH}/{id}")
}

/// Body for both create and update; the member list is sent comma-joined.
pub fn create_payload<'a>(name: &'a str, members: &MemberList) -> GroupPayload<'a> {
    GroupPayload {
        name,
        members: members.joined(),
        kind: "system",
        acls: [Acl {
            permissions: DEFAULT_ACL_PERMISSIONS,
            kind: "default",
        }],
    }
}

pub fn decode_groups(body: &[u8]) -> Result<Vec<NamedGroup>, DecodeError> {
    let parsed: GroupsBody =
        serde_json::from_slice(body).map_err(DecodeError::json("target groups"))?;
    Ok(parsed.target_groups.into_iter().map(NamedGroup::from).collect())
}

pub fn decode_group(body: &[u8]) -> Result<NamedGroup, DecodeError> {
    let parsed: GroupDto = serde_json::from_slice(body).map_err(DecodeError::json("target group"))?;
    Ok(parsed.into())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_shape() {
        let members = MemberList::parse("10.0.0.1,10.0.0.2");
        let payload = serde_json::to_value(create_payload("Agent Group - Linux", &members)).unwrap();

        assert_eq!(payload["name"], "Agent Group - Linux");
        assert_eq!(payload["members"], "10.0.0.1,10.0.0.2");
        assert_eq!(payload["type"], "system");
        assert_eq!(payload["acls"][0]["permissions"], 64);
        assert_eq!(payload["acls"][0]["type"], "default");
    }

    #[test]
    fn test_decode_groups() {
        let body = br#"{"target_groups": [
            {"id": 11, "name": "zHosts with Low Vuln Results", "members": "10.0.0.1, 10.0.0.2"},
            {"id": 12, "name": "empty"}
        ]}"#;
        let groups = decode_groups(body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, GroupId::new("11"));
        assert_eq!(groups[0].members.len(), 2);
        assert!(groups[1].members.is_empty());
    }

    #[test]
    fn test_group_path() {
        assert_eq!(group_path(&GroupId::new("11")), "/target-groups/11");
    }
}
