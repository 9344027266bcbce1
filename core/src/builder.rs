//! # Address List Builder
//!
//! Applies the criterion's filters to resolved candidates, in order:
//!
//! 1. the sentinel `0.0.0.0` is always dropped
//! 2. internal-only criteria keep private addresses only
//! 3. criteria with allowed ranges keep addresses inside at least one range
//!
//! Surviving candidates keep their resolution order. Duplicates are **not**
//! removed: an address reported by two inventory items appears twice.

use tgsync_common::criterion::GroupCriterion;
use tgsync_common::inventory::MemberList;
use tgsync_common::network::classify::{in_any, is_private};
use tgsync_common::network::{Address, Cidr};
use tracing::debug;

use crate::resolver::Candidate;

#[derive(Debug, Clone, Copy, Default)]
pub struct AddressListBuilder<'a> {
    internal_only: bool,
    allowed: Option<&'a [Cidr]>,
}

impl<'a> AddressListBuilder<'a> {
    pub fn for_criterion(criterion: &'a GroupCriterion) -> Self {
        Self {
            internal_only: criterion.internal_only(),
            allowed: criterion.allowed_ranges(),
        }
    }

    /// Only the sentinel rule applies.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn build(&self, candidates: impl IntoIterator<Item = Candidate>) -> AddressList {
        let mut entries = Vec::new();
        let mut dropped = 0;

        for candidate in candidates {
            if self.admits(&candidate.address) {
                entries.push(candidate);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            debug!("filtered out {dropped} addresses, {} kept", entries.len());
        }
        AddressList { entries, dropped }
    }

    fn admits(&self, addr: &Address) -> bool {
        if addr.is_sentinel() {
            return false;
        }
        if self.internal_only && !is_private(addr) {
            return false;
        }
        self.allowed.is_none_or(|ranges| in_any(addr, ranges))
    }
}

/// Ordered survivors of filtering, ready to become a group's member list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressList {
    entries: Vec<Candidate>,
    dropped: usize,
}

impl AddressList {
    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.iter().map(|candidate| candidate.address)
    }

    pub fn joined(&self) -> String {
        self.members().joined()
    }

    pub fn members(&self) -> MemberList {
        self.addresses().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many candidates the filters rejected.
    pub fn dropped(&self) -> usize {
        self.dropped
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

#[cfg(test)]
mod tests {
    use super::*;
    use tgsync_common::criterion::Severity;
    use tgsync_common::inventory::AgentGroupId;

    fn candidates(addrs: &[&str]) -> Vec<Candidate> {
        addrs
            .iter()
            .map(|s| Candidate::new(s.parse().unwrap()))
            .collect()
    }

    #[test]
    fn test_severity_keeps_duplicates_and_drops_sentinel() {
        let criterion = GroupCriterion::SeverityBucket {
            level: Severity::High,
        };
        let list = AddressListBuilder::for_criterion(&criterion).build(candidates(&[
            "192.168.1.5",
            "0.0.0.0",
            "192.168.1.5",
        ]));

        assert_eq!(list.joined(), "192.168.1.5,192.168.1.5");
        assert_eq!(list.dropped(), 1);
    }

    #[test]
    fn test_severity_keeps_public_addresses() {
        let criterion = GroupCriterion::SeverityBucket {
            level: Severity::Low,
        };
        let list =
            AddressListBuilder::for_criterion(&criterion).build(candidates(&["8.8.8.8", "10.0.0.1"]));
        assert_eq!(list.joined(), "8.8.8.8,10.0.0.1");
    }

    #[test]
    fn test_agent_group_is_internal_only() {
        let criterion = GroupCriterion::AgentGroup {
            id: AgentGroupId::new("3"),
            display_name: "Branch".into(),
        };
        let list = AddressListBuilder::for_criterion(&criterion).build(candidates(&[
            "8.8.8.8",
            "127.0.0.1",
            "172.20.1.1",
        ]));
        assert_eq!(list.joined(), "127.0.0.1,172.20.1.1");
    }

    #[test]
    fn test_agent_only_defaults_to_rfc1918() {
        let criterion = GroupCriterion::AgentOnly {
            cidr_filters: Vec::new(),
        };
        // loopback is private but outside RFC 1918
        let list = AddressListBuilder::for_criterion(&criterion).build(candidates(&[
            "127.0.0.1",
            "10.4.4.4",
            "172.32.0.1",
            "192.168.9.9",
        ]));
        assert_eq!(list.joined(), "10.4.4.4,192.168.9.9");
    }

    #[test]
    fn test_agent_only_narrowed_by_cidr_filters() {
        let criterion = GroupCriterion::AgentOnly {
            cidr_filters: vec!["10.1.0.0/16".parse().unwrap()],
        };
        let list = AddressListBuilder::for_criterion(&criterion)
            .build(candidates(&["10.1.200.3", "10.2.0.1", "192.168.0.1"]));
        assert_eq!(list.joined(), "10.1.200.3");
        assert_eq!(list.dropped(), 2);
    }

    #[test]
    fn test_empty_input_builds_empty_list() {
        let list = AddressListBuilder::unfiltered().build(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.joined(), "");
    }

    #[test]
    fn test_sentinel_dropped_next_to_real_address() {
        let list = AddressListBuilder::unfiltered().build(candidates(&["0.0.0.0", "10.0.0.1"]));
        assert_eq!(list.addresses().collect::<Vec<_>>(), vec!["10.0.0.1".parse().unwrap()]);
    }

    #[test]
    fn test_everything_filtered_is_empty() {
        let list = AddressListBuilder::unfiltered().build(candidates(&["0.0.0.0", "0.0.0.0"]));
        assert!(list.is_empty());
        assert_eq!(list.joined(), "");
    }

    #[test]
    fn test_labels_survive_filtering() {
        let list = AddressListBuilder::unfiltered().build(vec![Candidate::labeled(
            "10.0.0.9".parse().unwrap(),
            "db01.corp",
        )]);
        assert_eq!(list.entries()[0].label.as_deref(), Some("db01.corp"));
    }
}
