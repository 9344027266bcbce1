//! # Candidate Resolver
//!
//! Turns a [`GroupCriterion`] into the raw `(address, label)` candidates the
//! inventory reports for it. Ordering follows the store; nothing is sorted,
//! filtered or deduplicated here (see [`crate::builder`]).
//!
//! A query reporting more results than the configured ceiling is refused
//! with [`Error::OverCapacity`] instead of being truncated.

use tgsync_common::config::PipelineConfig;
use tgsync_common::criterion::GroupCriterion;
use tgsync_common::inventory::{AssetFilter, AssetPage, AssetQuery, InventoryItem};
use tgsync_common::network::Address;
use tgsync_common::{Error, Result};
use tracing::debug;

use crate::store::InventoryStore;

/// A provisional address plus optional metadata (hostname, agent name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub address: Address,
    pub label: Option<String>,
}

impl Candidate {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            label: None,
        }
    }

    pub fn labeled(address: Address, label: impl Into<String>) -> Self {
        Self {
            address,
            label: Some(label.into()),
        }
    }
}

/// Candidates are yielded lazily from the records of a single query.
pub type Candidates = Box<dyn Iterator<Item = Candidate> + Send>;

pub struct CandidateResolver<'a> {
    store: &'a dyn InventoryStore,
    cfg: &'a PipelineConfig,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(store: &'a dyn InventoryStore, cfg: &'a PipelineConfig) -> Self {
        Self { store, cfg }
    }

    pub async fn resolve(&self, criterion: &GroupCriterion) -> Result<Candidates> {
        match criterion {
            GroupCriterion::AgentGroup { id, .. } => {
                let agents = self
                    .store
                    .query_agents(id)
                    .await
                    .map_err(|e| Error::external(format!("listing agents of {criterion}"), e))?;
                self.check_capacity(criterion, agents.len())?;
                debug!("{criterion}: {} agents", agents.len());

                Ok(Box::new(agents.into_iter().map(|agent| Candidate {
                    address: agent.ip,
                    label: agent.name,
                })))
            }
            GroupCriterion::TagValue {
                category, value, ..
            } => {
                let filter = AssetFilter::Tag {
                    category: category.clone(),
                    value: value.clone(),
                };
                let page = self
                    .query(criterion, filter, self.cfg.tag_lookback_days)
                    .await?;
                Ok(Box::new(page.assets.into_iter().filter_map(first_address)))
            }
            GroupCriterion::SeverityBucket { level } => {
                let page = self
                    .query(
                        criterion,
                        AssetFilter::Severity(*level),
                        self.cfg.severity_lookback_days,
                    )
                    .await?;
                Ok(Box::new(page.assets.into_iter().filter_map(first_address)))
            }
            GroupCriterion::AgentOnly { .. } => {
                let filter = AssetFilter::SourcesOnly(self.cfg.agent_source.clone());
                let page = self
                    .query(criterion, filter, self.cfg.agent_only_lookback_days)
                    .await?;
                Ok(Box::new(page.assets.into_iter().flat_map(every_address)))
            }
        }
    }

    async fn query(
        &self,
        criterion: &GroupCriterion,
        filter: AssetFilter,
        lookback_days: u32,
    ) -> Result<AssetPage> {
        let page = self
            .store
            .query_assets(&AssetQuery::new(filter, lookback_days))
            .await
            .map_err(|e| Error::external(format!("querying assets for {criterion}"), e))?;

        self.check_capacity(criterion, page.reported())?;
        debug!(
            "{criterion}: {} assets within {lookback_days} days",
            page.assets.len()
        );
        Ok(page)
    }

    fn check_capacity(&self, criterion: &GroupCriterion, reported: usize) -> Result<()> {
        if reported > self.cfg.capacity_ceiling {
            return Err(Error::OverCapacity {
                scope: criterion.to_string(),
                reported,
                ceiling: self.cfg.capacity_ceiling,
            });
        }
        Ok(())
    }
}

/// An item without any IPv4 address contributes nothing.
fn first_address(item: InventoryItem) -> Option<Candidate> {
    item.first_ipv4().map(Candidate::new)
}

fn every_address(item: InventoryItem) -> impl Iterator<Item = Candidate> {
    let InventoryItem { ipv4, fqdn, .. } = item;
    ipv4.into_iter().map(move |address| Candidate {
        address,
        label: fqdn.clone(),
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
