//! Explicit configuration handed to the pipeline. Nothing here is global,
//! so several pipelines with different targets can run side by side.

/// Query ceiling above which a resolution is refused rather than truncated.
pub const CAPACITY_CEILING: usize = 5000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of results a single query may report.
    pub capacity_ceiling: usize,
    /// Lookback window (days) for tag queries.
    pub tag_lookback_days: u32,
    /// Lookback window (days) for severity queries.
    pub severity_lookback_days: u32,
    /// Lookback window (days) for agent-only queries.
    pub agent_only_lookback_days: u32,
    /// Lookback window (days) for purge queries.
    pub purge_lookback_days: u32,
    /// Observation source name of the agent channel.
    pub agent_source: String,
    /// Suffix of the agent-only group name.
    pub snapshot_label: String,
    /// Concurrent deletes during a purge.
    pub delete_workers: usize,
    /// Resolve and build, but never write to the store.
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity_ceiling: CAPACITY_CEILING,
            tag_lookback_days: 90,
            severity_lookback_days: 30,
            agent_only_lookback_days: 90,
            purge_lookback_days: 30,
            agent_source: String::from("NESSUS_AGENT"),
            snapshot_label: String::from("latest"),
            delete_workers: 4,
            dry_run: false,
        }
    }
}

/// Where a dependent scan runs and which template it uses.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub scanner_name: String,
    pub folder_name: String,
    pub template_name: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            scanner_name: String::new(),
            folder_name: String::from("My Scans"),
            template_name: String::from("basic"),
        }
    }
}
