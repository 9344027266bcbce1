//! # Inventory Records
//!
//! Everything exchanged with the external inventory store: asset records,
//! agents, named groups and the query descriptors used to fetch them.
//! Identifiers are opaque strings; absence is always an `Option`.

use std::fmt;

use crate::criterion::Severity;
use crate::network::{Address, Cidr};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of an inventory item (asset).
    AssetId
);
opaque_id!(
    /// Identifier of a named address group.
    GroupId
);
opaque_id!(
    /// Identifier of an agent group on the agent manager.
    AgentGroupId
);

/// A tag category/value pair as attached to inventory items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTag {
    pub category: String,
    pub value: String,
    /// "static" or "dynamic".
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: AssetId,
    pub ipv4: Vec<Address>,
    pub fqdn: Option<String>,
    pub tags: Vec<AssetTag>,
    pub sources: Vec<String>,
}

impl InventoryItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(id),
            ipv4: Vec::new(),
            fqdn: None,
            tags: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_ipv4(mut self, addr: Address) -> Self {
        self.ipv4.push(addr);
        self
    }

    pub fn with_fqdn(mut self, fqdn: impl Into<String>) -> Self {
        self.fqdn = Some(fqdn.into());
        self
    }

    pub fn with_tag(mut self, tag: AssetTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn first_ipv4(&self) -> Option<Address> {
        self.ipv4.first().copied()
    }

    pub fn has_tag(&self, category: &str, value: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.category == category && tag.value == value)
    }

    /// True when every observation source equals `source`.
    pub fn seen_only_by(&self, source: &str) -> bool {
        !self.sources.is_empty() && self.sources.iter().all(|s| s == source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRecord {
    pub id: String,
    pub ip: Address,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentGroup {
    pub id: AgentGroupId,
    pub name: String,
}

/// Ordered, flat member list of a named group.
///
/// Entries are kept verbatim and in order: duplicates survive, and an entry
/// may be a CIDR as well as a single address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberList(Vec<String>);

impl MemberList {
    pub fn new(entries: Vec<String>) -> Self {
        Self(entries)
    }

    /// Splits a comma-joined member string, dropping empty entries.
    pub fn parse(joined: &str) -> Self {
        Self(
            joined
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Cidr> for MemberList {
    fn from(cidr: Cidr) -> Self {
        Self(vec![cidr.to_string()])
    }
}

impl FromIterator<Address> for MemberList {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self(iter.into_iter().map(|addr| addr.to_string()).collect())
    }
}

/// The external resource being reconciled. `name` is its unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedGroup {
    pub id: GroupId,
    pub name: String,
    pub members: MemberList,
}

/// Server-side predicate of an asset query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetFilter {
    /// No predicate: every asset observed within the lookback window.
    All,
    Tag { category: String, value: String },
    /// Assets with at least one active finding at this severity.
    Severity(Severity),
    /// Assets whose only observation source is the named one.
    SourcesOnly(String),
    /// Assets whose addresses fall inside a named group.
    NamedGroup(GroupId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    pub lookback_days: u32,
    pub filter: AssetFilter,
}

impl AssetQuery {
    pub fn new(filter: AssetFilter, lookback_days: u32) -> Self {
        Self {
            lookback_days,
            filter,
        }
    }
}

/// One page of asset results plus the total the store reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPage {
    pub total: usize,
    pub assets: Vec<InventoryItem>,
}

impl AssetPage {
    /// The larger of the reported total and the delivered count.
    pub fn reported(&self) -> usize {
        self.total.max(self.assets.len())
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
