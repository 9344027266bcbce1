//! Workbench asset responses.

use serde::Deserialize;
use tgsync_common::inventory::{AssetId, AssetPage, AssetTag, InventoryItem};
use tgsync_common::network::Address;

use crate::error::DecodeError;
use crate::ids;

#[derive(Deserialize)]
struct AssetsBody {
    #[serde(default)]
    assets: Vec<AssetDto>,
    #[serde(default, alias = "total_asset_count")]
    total: Option<usize>,
}

#[derive(Deserialize)]
struct AssetDto {
    #[serde(deserialize_with = "ids::deserialize")]
    id: String,
    #[serde(default)]
    ipv4: Vec<Address>,
    #[serde(default)]
    fqdn: Vec<String>,
    #[serde(default)]
    tags: Vec<TagDto>,
    #[serde(default)]
    sources: Vec<SourceDto>,
}

#[derive(Deserialize)]
struct TagDto {
    #[serde(alias = "tag_key")]
    category: String,
    #[serde(alias = "tag_value")]
    value: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct SourceDto {
    name: String,
}

impl From<AssetDto> for InventoryItem {
    fn from(dto: AssetDto) -> Self {
        InventoryItem {
            id: AssetId::new(dto.id),
            ipv4: dto.ipv4,
            fqdn: dto.fqdn.into_iter().next(),
            tags: dto
                .tags
                .into_iter()
                .map(|tag| AssetTag {
                    category: tag.category,
                    value: tag.value,
                    kind: tag.kind.unwrap_or_else(|| String::from("static")),
                })
                .collect(),
            sources: dto.sources.into_iter().map(|source| source.name).collect(),
        }
    }
}

/// Decodes `/workbenches/assets` and `/workbenches/assets/vulnerabilities`.
///
/// A missing total falls back to the number of delivered assets. An
/// address that is not a well-formed dotted quad fails the whole body.
pub fn decode_assets(body: &[u8]) -> Result<AssetPage, DecodeError> {
    let parsed: AssetsBody = serde_json::from_slice(body).map_err(DecodeError::json("assets"))?;
    let assets: Vec<InventoryItem> = parsed.assets.into_iter().map(InventoryItem::from).collect();

    Ok(AssetPage {
        total: parsed.total.unwrap_or(assets.len()),
        assets,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
