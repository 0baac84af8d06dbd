//! Configuration module for staking-dropd.
//!
//! Handles loading configuration from the TOML file and CLI overrides, and
//! validates it once before anything else starts.

pub mod file;

use crate::config::file::FileConfig;
use sdrop_core::config::{ConfigError as DropConfigError, DropTable, validate_listener};
use sdrop_sdk::config::ListenerConfig;
use sdrop_sdk::objects::AccountId;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(#[from] DropConfigError),

    #[error("no drops configured")]
    NoDrops,
}

/// Chain access settings.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub endpoint: Url,
    pub signer_endpoint: Url,
    pub account: AccountId,
}

/// Loaded and validated configuration.
#[derive(Debug)]
pub struct LoadedConfig {
    pub chain: ChainSettings,
    pub progress_dir: PathBuf,
    pub listener: ListenerConfig,
    pub drops: DropTable,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    start_block_override: Option<u64>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, start_block_override: Option<u64>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            start_block_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the listener parameters and the drop table
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(start_block) = self.start_block_override {
            file_config.listener.start_block = start_block;
        }

        let listener = ListenerConfig::from(&file_config.listener);
        validate_listener(&listener)?;

        if file_config.drops.is_empty() {
            return Err(ConfigError::NoDrops);
        }
        let drops = DropTable::from_infos(file_config.drops)?;

        Ok(LoadedConfig {
            chain: ChainSettings {
                endpoint: file_config.chain.endpoint,
                signer_endpoint: file_config.chain.signer_endpoint,
                account: file_config.chain.account,
            },
            progress_dir: file_config.progress.path,
            listener,
            drops,
        })
    }
}
