//! # Grouping Criteria
//!
//! A [`GroupCriterion`] decides which inventory query is issued, which
//! filters the resulting addresses pass through, and how the reconciled
//! group is named.

use std::fmt;
use std::str::FromStr;

use crate::inventory::AgentGroupId;
use crate::network::Cidr;
use crate::network::classify::RFC1918_RANGES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Levels synced by default. Info is left out to reduce noise.
    pub const REPORTED: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("invalid severity: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupCriterion {
    /// Agents bound to an agent group.
    AgentGroup {
        id: AgentGroupId,
        display_name: String,
    },
    /// Inventory items carrying a tag category/value.
    TagValue {
        category: String,
        value: String,
        kind: String,
    },
    /// Inventory items with an active finding at `level`.
    SeverityBucket { level: Severity },
    /// Inventory items never seen by an active network probe.
    ///
    /// An empty filter list means the three RFC 1918 blocks.
    AgentOnly { cidr_filters: Vec<Cidr> },
}

impl GroupCriterion {
    /// Name of the group reconciled for this criterion.
    ///
    /// `snapshot_label` is only used by [`GroupCriterion::AgentOnly`].
    pub fn group_name(&self, snapshot_label: &str) -> String {
        match self {
            GroupCriterion::AgentGroup { display_name, .. } => {
                format!("Agent Group - {display_name}")
            }
            GroupCriterion::TagValue {
                category,
                value,
                kind,
            } => format!("zTag: {category} - {value} ({kind})"),
            GroupCriterion::SeverityBucket { level } => {
                format!("zHosts with {level} Vuln Results")
            }
            GroupCriterion::AgentOnly { .. } => {
                format!("Scanned Only by Agents (as of {snapshot_label})")
            }
        }
    }

    /// Whether only private-range addresses may enter the group.
    pub fn internal_only(&self) -> bool {
        matches!(
            self,
            GroupCriterion::AgentGroup { .. } | GroupCriterion::AgentOnly { .. }
        )
    }

    /// Ranges an address must additionally fall in, if any.
    pub fn allowed_ranges(&self) -> Option<&[Cidr]> {
        match self {
            GroupCriterion::AgentOnly { cidr_filters } if cidr_filters.is_empty() => {
                Some(&RFC1918_RANGES[..])
            }
            GroupCriterion::AgentOnly { cidr_filters } => Some(cidr_filters.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for GroupCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupCriterion::AgentGroup { id, display_name } => {
                write!(f, "agent group '{display_name}' ({id})")
            }
            GroupCriterion::TagValue {
                category, value, ..
            } => write!(f, "tag {category}:{value}"),
            GroupCriterion::SeverityBucket { level } => write!(f, "severity {level}"),
            GroupCriterion::AgentOnly { .. } => {
                let ranges: Vec<String> = self
                    .allowed_ranges()
                    .unwrap_or_default()
                    .iter()
                    .map(Cidr::to_string)
                    .collect();
                write!(f, "agent-only hosts in {}", ranges.join(","))
            }
        }
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
