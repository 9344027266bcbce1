pub mod purge;
pub mod sync;

use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tgsync_common::criterion::Severity;
use tgsync_common::network::Cidr;
use tgsync_core::network::transport::{ApiSettings, DEFAULT_AGENT_MANAGER, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(name = "tgsync", version)]
#[command(about = "Keeps inventory target groups in sync with agents, tags and findings.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Inventory API root
    #[arg(long, global = true, env = "TIO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, global = true, env = "TIO_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    #[arg(long, global = true, env = "TIO_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Substring of the scanner name that manages agents
    #[arg(long, global = true, default_value = DEFAULT_AGENT_MANAGER)]
    pub agent_manager: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout: u64,

    /// Resolve and print, but never write to the inventory
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync one group per agent group of the agent manager
    #[command(alias = "ag")]
    AgentGroups,
    /// Sync one group per tag category/value
    #[command(alias = "t")]
    Tags,
    /// Sync one group per vulnerability severity
    #[command(alias = "sev")]
    Severity {
        /// Levels to sync (default: low, medium, high, critical)
        #[arg(long = "level", value_name = "LEVEL")]
        levels: Vec<Severity>,
    },
    /// Sync the group of hosts seen only by agents
    #[command(alias = "ao")]
    AgentOnly(AgentOnlyArgs),
    /// Delete every inventory item inside a CIDR
    #[command(alias = "p")]
    Purge {
        cidr: Cidr,
        /// Match through a "To Be Deleted" group instead of locally
        #[arg(long)]
        via_group: bool,
        /// Concurrent deletes
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },
}

#[derive(Args)]
pub struct AgentOnlyArgs {
    /// Keep only addresses in these ranges (default: RFC 1918)
    #[arg(long = "cidr", value_name = "CIDR", value_delimiter = ',')]
    pub cidrs: Vec<Cidr>,
    /// Group name suffix (default: current local time)
    #[arg(long)]
    pub label: Option<String>,
    /// Launch a remote scan against the group afterwards
    #[arg(long, requires = "scanner")]
    pub launch_scan: bool,
    #[arg(long)]
    pub scanner: Option<String>,
    #[arg(long, default_value = "My Scans")]
    pub folder: String,
    #[arg(long, default_value = "basic")]
    pub template: String,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn api_settings(&self) -> anyhow::Result<ApiSettings> {
        let access_key = self
            .access_key
            .clone()
            .context("No access key: pass --access-key or set TIO_ACCESS_KEY")?;
        let secret_key = self
            .secret_key
            .clone()
            .context("No secret key: pass --secret-key or set TIO_SECRET_KEY")?;

        Ok(ApiSettings {
            base_url: self.base_url.clone(),
            access_key,
            secret_key,
            timeout: Duration::from_secs(self.timeout),
            agent_manager: self.agent_manager.clone(),
        })
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
