//! Runtime configuration from command-line flags and environment

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use explorer_dispatch::ActionFilter;

use crate::catalog::{CachePolicy, CatalogConfig, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::storage::FileStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no API key: pass --api-key or set EVENT_EXPLORER_API_KEY")]
    MissingApiKey,
    #[error("no data directory: pass --data-dir or set EVENT_EXPLORER_DATA_DIR")]
    MissingDataDir,
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Options shared by every command
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log debug output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Catalog API key
    #[arg(long, global = true, env = "EVENT_EXPLORER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Catalog base URL
    #[arg(long, global = true, env = "EVENT_EXPLORER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory for favorites and theme settings
    #[arg(long, global = true, env = "EVENT_EXPLORER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage file name inside the data directory
    #[arg(long, global = true, default_value = FileStore::DEFAULT_ID)]
    pub store_id: String,

    /// Results per page
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Seconds before a cached response is considered stale
    #[arg(long, global = true, default_value_t = 60)]
    pub cache_ttl: u64,

    /// Maximum number of cached responses
    #[arg(long, global = true, default_value_t = 64)]
    pub cache_entries: usize,

    /// Only log actions matching these comma-separated patterns (`*`, `?`)
    #[arg(long, global = true, default_value = "")]
    pub log_actions: String,

    /// Never log actions matching these patterns
    #[arg(long, global = true, default_value = "")]
    pub skip_actions: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub store_id: String,
    pub page_size: u32,
    pub cache: CachePolicy,
    pub action_filter: ActionFilter,
}

/// `<platform data dir>/event-explorer`
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("event-explorer"))
}

impl Config {
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let data_dir = args
            .data_dir
            .clone()
            .or_else(default_data_dir)
            .ok_or(ConfigError::MissingDataDir)?;

        if args.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page size",
                reason: "must be at least 1".into(),
            });
        }
        if args.store_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "store id",
                reason: "must not be empty".into(),
            });
        }

        Ok(Self {
            api_key: args
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            base_url: args.base_url.trim_end_matches('/').to_string(),
            data_dir,
            store_id: args.store_id.clone(),
            page_size: args.page_size,
            cache: CachePolicy {
                stale_after: Duration::from_secs(args.cache_ttl),
                max_entries: args.cache_entries.max(1),
            },
            action_filter: ActionFilter::parse(&args.log_actions, &args.skip_actions),
        })
    }

    /// Catalog settings; fails without an API key.
    pub fn catalog(&self) -> Result<CatalogConfig, ConfigError> {
        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(CatalogConfig::new(api_key).base_url(self.base_url.clone()))
    }
}
