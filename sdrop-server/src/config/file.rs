//! TOML file configuration structures.
//!
//! These structs directly map to the `config.toml` file format.

use sdrop_sdk::config::{DropInfo, ListenerConfig};
use sdrop_sdk::objects::{AccountId, RSymbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub chain: ChainConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub listener: ListenerSection,
    /// Drop parameters keyed by symbol.
    #[serde(default)]
    pub drops: BTreeMap<RSymbol, DropInfo>,
}

/// Chain access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Base URL of the node gateway.
    pub endpoint: Url,
    /// Base URL of the signer that submits transfers for `account`.
    pub signer_endpoint: Url,
    /// Account that funds the drops.
    pub account: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Directory holding the progress file.
    #[serde(default = "default_progress_path")]
    pub path: PathBuf,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            path: default_progress_path(),
        }
    }
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("./blockstore")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerSection {
    #[serde(default)]
    pub start_block: u64,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            start_block: 0,
            confirmations: default_confirmations(),
            poll_interval_secs: default_poll_interval_secs(),
            retry_limit: default_retry_limit(),
        }
    }
}

fn default_confirmations() -> u64 {
    ListenerConfig::DEFAULT_CONFIRMATIONS
}

fn default_poll_interval_secs() -> u64 {
    ListenerConfig::DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_retry_limit() -> u32 {
    ListenerConfig::DEFAULT_RETRY_LIMIT
}

impl From<&ListenerSection> for ListenerConfig {
    fn from(section: &ListenerSection) -> Self {
        Self {
            start_block: section.start_block,
            confirmations: section.confirmations,
            poll_interval: std::time::Duration::from_secs(section.poll_interval_secs),
            retry_limit: section.retry_limit,
        }
    }
}
