//! Records needed to launch a scan against a reconciled group.

use crate::inventory::GroupId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerRef {
    pub id: String,
    /// The scan API addresses scanners by uuid, the agent API by id.
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTemplate {
    pub uuid: String,
    pub name: String,
}

/// A fully resolved scan definition, launched immediately on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSpec {
    pub name: String,
    pub template_uuid: String,
    pub scanner_uuid: String,
    pub folder_id: String,
    pub target_group: GroupId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanId(pub String);
