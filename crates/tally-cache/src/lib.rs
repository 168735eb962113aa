//! Expiring key/value cache with single-use semantics.
//!
//! This crate provides a generic in-memory cache where every entry carries
//! its own deadline:
//! - Sharded storage so unrelated keys never contend on the same lock
//! - Atomic `take` (get-and-remove) for single-use tokens
//! - Entries past their deadline are invisible to readers immediately
//! - A background sweeper that reclaims expired entries on a fixed interval
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_cache::{CacheConfig, ExpiringCache};
//!
//! let cache: ExpiringCache<String, u32> = ExpiringCache::new(CacheConfig::default());
//! cache.set("answer".to_string(), 42, Duration::from_secs(60));
//!
//! assert_eq!(cache.take("answer"), Some(42));
//! assert_eq!(cache.take("answer"), None);
//! ```

mod cache;
mod config;
mod error;
mod sweeper;

pub use cache::{CacheStats, ExpiringCache};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use sweeper::Sweeper;
