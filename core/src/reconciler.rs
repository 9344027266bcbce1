//! # Named Group Reconciler
//!
//! Makes exactly one named group with a given name hold a given member list:
//! update it in place if it exists, create it otherwise. Member lists are
//! replaced wholesale; no diff is computed.
//!
//! The lookup and the write are two separate round trips. Two runs racing on
//! the same name can both miss the lookup and both create, leaving duplicate
//! groups. The store offers no conditional write to close that window; later
//! runs pick the first match and log the duplicates.

use tgsync_common::inventory::{MemberList, NamedGroup};
use tgsync_common::{Error, Result};
use tracing::{debug, warn};

use crate::store::InventoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Created(NamedGroup),
    /// `previous` holds the members the group had before the write.
    Updated {
        group: NamedGroup,
        previous: MemberList,
    },
}

impl Reconciliation {
    pub fn group(&self) -> &NamedGroup {
        match self {
            Reconciliation::Created(group) => group,
            Reconciliation::Updated { group, .. } => group,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Reconciliation::Created(_) => "created",
            Reconciliation::Updated { .. } => "updated",
        }
    }
}

pub struct NamedGroupReconciler<'a> {
    store: &'a dyn InventoryStore,
}

impl<'a> NamedGroupReconciler<'a> {
    pub fn new(store: &'a dyn InventoryStore) -> Self {
        Self { store }
    }

    /// Exact, case-sensitive name match.
    pub async fn lookup(&self, name: &str) -> Result<Option<NamedGroup>> {
        let groups = self
            .store
            .query_named_groups()
            .await
            .map_err(|e| Error::external(format!("listing groups to find '{name}'"), e))?;

        let mut matching = groups.into_iter().filter(|group| group.name == name);
        let first = matching.next();
        let extra = matching.count();
        if extra > 0 {
            warn!("{} groups are named '{name}', using the first", extra + 1);
        }
        Ok(first)
    }

    pub async fn reconcile(&self, name: &str, members: &MemberList) -> Result<Reconciliation> {
        match self.lookup(name).await? {
            Some(existing) => {
                debug!("updating group '{name}' ({})", existing.id);
                let group = self
                    .store
                    .update_named_group(&existing.id, name, members)
                    .await
                    .map_err(|e| Error::external(format!("updating group '{name}'"), e))?;
                Ok(Reconciliation::Updated {
                    group,
                    previous: existing.members,
                })
            }
            None => {
                debug!("creating group '{name}'");
                let group = self
                    .store
                    .create_named_group(name, members)
                    .await
                    .map_err(|e| Error::external(format!("creating group '{name}'"), e))?;
                Ok(Reconciliation::Created(group))
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
