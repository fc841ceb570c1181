//! Cache configuration.

use std::time::Duration;

use marketcache_market_data::FetchCoordinator;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_QUOTE_TTL_SECS};
use crate::errors::{Error, Result};
use crate::history::HistoryFreshness;

/// Settings passed to the caches at construction.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Quotes older than this are refetched. Zero disables quote caching.
    pub quote_ttl_secs: u64,
    pub history_freshness: HistoryFreshness,
    /// Concurrent history merges performed by the cache.
    pub max_concurrency: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: DEFAULT_QUOTE_TTL_SECS,
            history_freshness: HistoryFreshness::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl CacheConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::InvalidConfigValue(
                "maxConcurrency must be at least 1".to_string(),
            ));
        }
        // chrono durations are millisecond based and bounded by i64
        if self.quote_ttl_secs > i64::MAX as u64 / 1000 {
            return Err(Error::InvalidConfigValue(format!(
                "quoteTtlSecs out of range: {}",
                self.quote_ttl_secs
            )));
        }
        Ok(())
    }

    pub fn coordinator(&self) -> FetchCoordinator {
        FetchCoordinator::new(self.max_concurrency)
    }
}
