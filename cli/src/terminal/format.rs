use colored::*;
use tgsync_common::inventory::AssetId;
use tgsync_core::builder::AddressList;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// Members shown per group unless running verbose.
pub const MEMBER_PREVIEW: usize = 10;

pub fn members_to_details(list: &AddressList, limit: Option<usize>) -> Vec<Detail> {
    let shown = limit.unwrap_or(usize::MAX);
    let mut details: Vec<Detail> = list
        .entries()
        .iter()
        .take(shown)
        .map(|candidate| {
            let address = candidate.address.to_string().color(colors::IPV4_ADDR);
            let value = match &candidate.label {
                Some(label) => format!("{} {}", address, format!("({label})").color(colors::LABEL))
                    .normal(),
                None => address,
            };
            (String::from("IPv4"), value)
        })
        .collect();

    let hidden = list.len().saturating_sub(shown);
    if hidden > 0 {
        details.push((
            String::from("..."),
            format!("{hidden} more").color(colors::SEPARATOR),
        ));
    }
    details
}

pub fn action(action: &str) -> ColoredString {
    let color = match action {
        "created" => colors::CREATED,
        "updated" => colors::UPDATED,
        "failed" => colors::FAILED,
        _ => colors::SKIPPED,
    };
    action.color(color).bold()
}

pub fn asset_ids(ids: &[AssetId]) -> Vec<Detail> {
    ids.iter()
        .map(|id| (String::from("Asset"), id.as_str().color(colors::TEXT_DEFAULT)))
        .collect()
}
