//! # Bulk Action Executor
//!
//! Finds every inventory item inside a purge scope and deletes them on a
//! bounded pool of tokio tasks. A failed delete is recorded against its
//! identifier and never aborts the others.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tgsync_common::config::PipelineConfig;
use tgsync_common::inventory::{AssetFilter, AssetId, AssetQuery, InventoryItem, NamedGroup};
use tgsync_common::network::Cidr;
use tgsync_common::network::classify::in_cidr;
use tgsync_common::{Error, Result, StoreError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::InventoryStore;

/// Called with the number of deletes completed so far.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeScope {
    /// Matched server-side through the group filter.
    Group(NamedGroup),
    /// Unfiltered query re-filtered locally.
    Cidr(Cidr),
}

impl fmt::Display for PurgeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurgeScope::Group(group) => write!(f, "group '{}'", group.name),
            PurgeScope::Cidr(cidr) => write!(f, "{cidr}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub matched: usize,
    pub succeeded: usize,
    pub failed: Vec<AssetId>,
}

pub struct BulkActionExecutor {
    store: Arc<dyn InventoryStore>,
    lookback_days: u32,
    ceiling: usize,
    workers: usize,
    on_progress: Option<ProgressFn>,
}

impl BulkActionExecutor {
    pub fn new(store: Arc<dyn InventoryStore>, cfg: &PipelineConfig) -> Self {
        Self {
            store,
            lookback_days: cfg.purge_lookback_days,
            ceiling: cfg.capacity_ceiling,
            workers: cfg.delete_workers.max(1),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Identifiers of every item inside `scope`, deduplicated in first-seen order.
    pub async fn find_matches(&self, scope: &PurgeScope) -> Result<Vec<AssetId>> {
        let filter = match scope {
            PurgeScope::Group(group) => AssetFilter::NamedGroup(group.id.clone()),
            PurgeScope::Cidr(_) => AssetFilter::All,
        };

        let page = self
            .store
            .query_assets(&AssetQuery::new(filter, self.lookback_days))
            .await
            .map_err(|e| Error::external(format!("querying assets in {scope}"), e))?;

        if page.reported() > self.ceiling {
            return Err(Error::OverCapacity {
                scope: scope.to_string(),
                reported: page.reported(),
                ceiling: self.ceiling,
            });
        }

        let ids = match scope {
            PurgeScope::Group(_) => dedup(page.assets.into_iter().map(|item| item.id)),
            PurgeScope::Cidr(cidr) => match_cidr(page.assets, cidr),
        };
        debug!("{} assets matched in {scope}", ids.len());
        Ok(ids)
    }

    /// Deletes every id, at most `workers` at a time.
    pub async fn delete_all(&self, ids: Vec<AssetId>) -> PurgeReport {
        let matched = ids.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles: Vec<(AssetId, JoinHandle<std::result::Result<(), StoreError>>)> =
            Vec::with_capacity(matched);

        for id in ids {
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let on_progress = self.on_progress.clone();
            let task_id = id.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| StoreError::Transport(e.to_string()))?;

                let result = store.delete_inventory_item(&task_id).await;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(callback) = &on_progress {
                    callback(done);
                }
                result
            });
            handles.push((id, handle));
        }

        let mut report = PurgeReport {
            matched,
            ..PurgeReport::default()
        };
        for (id, handle) in handles {
            match handle.await {
                Ok(Ok(())) => report.succeeded += 1,
                Ok(Err(e)) => {
                    warn!("Failed to delete asset {id}: {e}");
                    report.failed.push(id);
                }
                Err(e) => {
                    warn!("Delete task for asset {id} did not finish: {e}");
                    report.failed.push(id);
                }
            }
        }
        report
    }
}

/// Items with at least one IPv4 inside `cidr`.
pub fn match_cidr(items: Vec<InventoryItem>, cidr: &Cidr) -> Vec<AssetId> {
    dedup(
        items
            .into_iter()
            .filter(|item| item.ipv4.iter().any(|addr| in_cidr(addr, cidr)))
            .map(|item| item.id),
    )
}

fn dedup(ids: impl Iterator<Item = AssetId>) -> Vec<AssetId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
