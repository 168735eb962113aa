//! Configuration for the expiring cache.

use std::time::Duration;

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for an [`ExpiringCache`](crate::ExpiringCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How often the background sweeper purges expired entries.
    pub sweep_interval: Duration,

    /// Whether [`ExpiringCache::start_sweeper`](crate::ExpiringCache::start_sweeper)
    /// spawns a task. If false, expired entries are only dropped when touched
    /// or when `purge_expired` is called.
    pub enable_sweeper: bool,

    /// Number of lock shards. Must be a power of two greater than one;
    /// anything else falls back to the map's default.
    pub shard_amount: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            enable_sweeper: true,
            shard_amount: None,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Enable or disable the background sweeper.
    pub fn with_sweeper(mut self, enabled: bool) -> Self {
        self.enable_sweeper = enabled;
        self
    }

    /// Set the number of lock shards.
    pub fn with_shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    /// Shard count to use, if the configured value is usable.
    pub(crate) fn effective_shards(&self) -> Option<usize> {
        self.shard_amount.filter(|n| *n > 1 && n.is_power_of_two())
    }
}
