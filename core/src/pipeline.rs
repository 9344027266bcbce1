//! # Pipeline
//!
//! Drives each criterion through resolve → build → reconcile, and each
//! purge request through scope → match → delete. Every criterion is its own
//! stage: one failing never stops the others.

use std::sync::Arc;

use tgsync_common::config::PipelineConfig;
use tgsync_common::criterion::{GroupCriterion, Severity};
use tgsync_common::inventory::{AssetId, MemberList, NamedGroup};
use tgsync_common::network::Cidr;
use tgsync_common::{Error, Result};
use tracing::{error, info, warn};

use crate::builder::{AddressList, AddressListBuilder};
use crate::executor::{BulkActionExecutor, ProgressFn, PurgeReport, PurgeScope};
use crate::reconciler::{NamedGroupReconciler, Reconciliation};
use crate::resolver::CandidateResolver;
use crate::store::InventoryStore;

/// Which family of criteria to enumerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriterionKind {
    AgentGroups,
    Tags,
    /// An empty list means [`Severity::REPORTED`].
    Severity(Vec<Severity>),
    /// An empty list means the RFC 1918 blocks.
    AgentOnly(Vec<Cidr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing survived filtering; the group was left untouched.
    Skipped { name: String },
    /// Dry run: what would have been written.
    Planned { name: String, list: AddressList },
    Synced {
        reconciliation: Reconciliation,
        list: AddressList,
    },
}

impl SyncOutcome {
    pub fn name(&self) -> &str {
        match self {
            SyncOutcome::Skipped { name } | SyncOutcome::Planned { name, .. } => name,
            SyncOutcome::Synced { reconciliation, .. } => &reconciliation.group().name,
        }
    }
}

/// Result of one criterion within [`Pipeline::sync_all`].
#[derive(Debug)]
pub struct SyncReport {
    pub criterion: GroupCriterion,
    pub outcome: Result<SyncOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Dry run: the matches that would have been deleted.
    Planned {
        scope: PurgeScope,
        matches: Vec<AssetId>,
    },
    Purged {
        scope: PurgeScope,
        report: PurgeReport,
    },
}

/// A resolved purge scope and the identifiers matched inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgePlan {
    pub scope: PurgeScope,
    pub matches: Vec<AssetId>,
}

pub struct Pipeline {
    store: Arc<dyn InventoryStore>,
    cfg: PipelineConfig,
}

impl Pipeline {
    pub fn new(store: Arc<dyn InventoryStore>, cfg: PipelineConfig) -> Self {
        Self { store, cfg }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub async fn discover_criteria(&self, kind: CriterionKind) -> Result<Vec<GroupCriterion>> {
        match kind {
            CriterionKind::AgentGroups => {
                let groups = self
                    .store
                    .query_agent_groups()
                    .await
                    .map_err(|e| Error::external("listing agent groups", e))?;
                if groups.is_empty() {
                    warn!("No agent groups found");
                }
                Ok(groups
                    .into_iter()
                    .map(|group| GroupCriterion::AgentGroup {
                        id: group.id,
                        display_name: group.name,
                    })
                    .collect())
            }
            CriterionKind::Tags => {
                let tags = self
                    .store
                    .query_tag_values()
                    .await
                    .map_err(|e| Error::external("listing tag values", e))?;
                if tags.is_empty() {
                    warn!("No tags found");
                }
                Ok(tags
                    .into_iter()
                    .map(|tag| GroupCriterion::TagValue {
                        category: tag.category,
                        value: tag.value,
                        kind: tag.kind,
                    })
                    .collect())
            }
            CriterionKind::Severity(levels) => {
                let levels = if levels.is_empty() {
                    Severity::REPORTED.to_vec()
                } else {
                    levels
                };
                Ok(levels
                    .into_iter()
                    .map(|level| GroupCriterion::SeverityBucket { level })
                    .collect())
            }
            CriterionKind::AgentOnly(cidr_filters) => {
                Ok(vec![GroupCriterion::AgentOnly { cidr_filters }])
            }
        }
    }

    pub async fn sync(&self, criterion: &GroupCriterion) -> Result<SyncOutcome> {
        let name = criterion.group_name(&self.cfg.snapshot_label);

        let candidates = CandidateResolver::new(&*self.store, &self.cfg)
            .resolve(criterion)
            .await?;
        let list = AddressListBuilder::for_criterion(criterion).build(candidates);

        if list.is_empty() {
            info!("Skipping '{name}': no addresses left after filtering");
            return Ok(SyncOutcome::Skipped { name });
        }

        if self.cfg.dry_run {
            return Ok(SyncOutcome::Planned { name, list });
        }

        let reconciliation = NamedGroupReconciler::new(&*self.store)
            .reconcile(&name, &list.members())
            .await?;
        Ok(SyncOutcome::Synced {
            reconciliation,
            list,
        })
    }

    /// Runs every criterion in order; failures are reported, not propagated.
    pub async fn sync_all(&self, criteria: Vec<GroupCriterion>) -> Vec<SyncReport> {
        let mut reports = Vec::with_capacity(criteria.len());
        for criterion in criteria {
            let outcome = self.sync(&criterion).await;
            if let Err(e) = &outcome {
                error!("{criterion}: {e}");
            }
            reports.push(SyncReport { criterion, outcome });
        }
        reports
    }

    pub fn executor(&self) -> BulkActionExecutor {
        BulkActionExecutor::new(Arc::clone(&self.store), &self.cfg)
    }

    /// The scope a CIDR purge runs against.
    ///
    /// With `via_group` the `To Be Deleted - {cidr}` group is reconciled
    /// first, except on a dry run, which previews with the raw CIDR.
    pub async fn purge_scope(&self, cidr: Cidr, via_group: bool) -> Result<PurgeScope> {
        if !via_group || self.cfg.dry_run {
            return Ok(PurgeScope::Cidr(cidr));
        }

        let group: NamedGroup = NamedGroupReconciler::new(&*self.store)
            .reconcile(&purge_group_name(&cidr), &MemberList::from(cidr))
            .await?
            .group()
            .clone();
        Ok(PurgeScope::Group(group))
    }

    /// Resolves the purge scope and the items inside it, deleting nothing.
    pub async fn plan_purge(&self, cidr: Cidr, via_group: bool) -> Result<PurgePlan> {
        let scope = self.purge_scope(cidr, via_group).await?;
        let matches = self.executor().find_matches(&scope).await?;
        Ok(PurgePlan { scope, matches })
    }

    /// Deletes a planned purge, or hands the plan back on a dry run.
    pub async fn execute_purge(
        &self,
        plan: PurgePlan,
        on_progress: Option<ProgressFn>,
    ) -> PurgeOutcome {
        let PurgePlan { scope, matches } = plan;
        if self.cfg.dry_run {
            return PurgeOutcome::Planned { scope, matches };
        }

        let mut executor = self.executor();
        if let Some(callback) = on_progress {
            executor = executor.with_progress(callback);
        }
        let report = executor.delete_all(matches).await;
        info!(
            "Purged {scope}: {} deleted, {} failed",
            report.succeeded,
            report.failed.len()
        );
        PurgeOutcome::Purged { scope, report }
    }

    pub async fn purge_cidr(
        &self,
        cidr: Cidr,
        via_group: bool,
        on_progress: Option<ProgressFn>,
    ) -> Result<PurgeOutcome> {
        let plan = self.plan_purge(cidr, via_group).await?;
        Ok(self.execute_purge(plan, on_progress).await)
    }
}

pub fn purge_group_name(cidr: &Cidr) -> String {
    format!("To Be Deleted - {cidr}")
}

/// Name of the scan launched against the agent-only group.
pub fn dependent_scan_name(snapshot_label: &str) -> String {
    format!("Agent Only Assets Remote Scan - {snapshot_label}")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
