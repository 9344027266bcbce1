//! Folders, scan templates and scan creation.

use serde::{Deserialize, Serialize};
use tgsync_common::scan::{Folder, ScanId, ScanSpec, ScanTemplate};

use crate::error::DecodeError;
use crate::ids;

pub const FOLDERS_PATH: &str = "/folders";
pub const TEMPLATES_PATH: &str = "/editor/scan/templates";
pub const SCANS_PATH: &str = "/scans";

#[derive(Deserialize)]
struct FoldersBody {
    #[serde(default)]
    folders: Vec<FolderDto>,
}

#[derive(Deserialize)]
struct FolderDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct TemplatesBody {
    #[serde(default)]
    templates: Vec<TemplateDto>,
}

#[derive(Deserialize)]
struct TemplateDto {
    uuid: String,
    name: String,
}

#[derive(Deserialize)]
struct CreatedScanBody {
    scan: CreatedScanDto,
}

#[derive(Deserialize)]
struct CreatedScanDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
}

/// Body of a scan creation request.
#[derive(Debug, Serialize)]
pub struct ScanPayload<'a> {
    uuid: &'a str,
    settings: ScanSettingsPayload<'a>,
}

#[derive(Debug, Serialize)]
struct ScanSettingsPayload<'a> {
    name: &'a str,
    description: &'a str,
    launch_now: bool,
    enabled: bool,
    text_targets: &'a str,
    asset_lists: [&'a str; 1],
    scanner_id: &'a str,
    folder_id: serde_json::Value,
}

/// Scan definition that starts immediately and does not repeat.
pub fn create_payload(spec: &ScanSpec) -> ScanPayload<'_> {
    // numeric folder ids must stay numbers on the wire
    let folder_id = spec
        .folder_id
        .parse::<u64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::from(spec.folder_id.clone()));

    ScanPayload {
        uuid: &spec.template_uuid,
        settings: ScanSettingsPayload {
            name: &spec.name,
            description: "",
            launch_now: true,
            enabled: false,
            text_targets: "",
            asset_lists: [spec.target_group.as_str()],
            scanner_id: &spec.scanner_uuid,
            folder_id,
        },
    }
}

pub fn decode_folders(body: &[u8]) -> Result<Vec<Folder>, DecodeError> {
    let parsed: FoldersBody = serde_json::from_slice(body).map_err(DecodeError::json("folders"))?;
    Ok(parsed
        .folders
        .into_iter()
        .map(|dto| Folder {
            id: dto.id,
            name: dto.name,
        })
        .collect())
}

pub fn decode_templates(body: &[u8]) -> Result<Vec<ScanTemplate>, DecodeError> {
    let parsed: TemplatesBody =
        serde_json::from_slice(body).map_err(DecodeError::json("scan templates"))?;
    Ok(parsed
        .templates
        .into_iter()
        .map(|dto| ScanTemplate {
            uuid: dto.uuid,
            name: dto.name,
        })
        .collect())
}

pub fn decode_created_scan(body: &[u8]) -> Result<ScanId, DecodeError> {
    let parsed: CreatedScanBody =
        serde_json::from_slice(body).map_err(DecodeError::json("created scan"))?;
    Ok(ScanId(parsed.scan.id))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
