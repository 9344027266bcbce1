//! Workbench filter queries.
//!
//! The workbench API takes its predicate as indexed query parameters:
//! `filter.0.quality`, `filter.0.filter`, `filter.0.value`, joined by
//! `filter.search_type`.

use tgsync_common::inventory::{AssetFilter, AssetQuery};

use crate::QueryPairs;

pub const ASSETS_PATH: &str = "/workbenches/assets";
pub const VULN_ASSETS_PATH: &str = "/workbenches/assets/vulnerabilities";

/// Builds the endpoint path and query pairs for an asset query.
pub fn asset_query(query: &AssetQuery) -> (&'static str, QueryPairs) {
    let mut pairs: QueryPairs = vec![pair("date_range", query.lookback_days.to_string())];

    let (path, predicate) = match &query.filter {
        AssetFilter::All => (ASSETS_PATH, None),
        AssetFilter::Tag { category, value } => (
            ASSETS_PATH,
            Some(("set-has", format!("tag.{category}"), value.clone())),
        ),
        AssetFilter::Severity(level) => (
            VULN_ASSETS_PATH,
            Some(("eq", String::from("severity"), level.to_string())),
        ),
        AssetFilter::SourcesOnly(source) => (
            ASSETS_PATH,
            Some(("set-hasonly", String::from("sources"), source.clone())),
        ),
        AssetFilter::NamedGroup(id) => (
            ASSETS_PATH,
            Some(("eq", String::from("target_group"), id.to_string())),
        ),
    };

    if let Some((quality, filter, value)) = predicate {
        pairs.push(pair("filter.0.quality", quality));
        pairs.push(pair("filter.0.filter", filter));
        pairs.push(pair("filter.0.value", value));
        pairs.push(pair("filter.search_type", "and"));
    }

    (path, pairs)
}

pub(crate) fn pair(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
