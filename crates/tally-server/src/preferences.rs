//! Ephemeral per-user preferences.
//!
//! Entries are keyed by username and live for a fixed TTL. They are never
//! persisted; signing out evicts them early.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_cache::ExpiringCache;
use tracing::debug;

use crate::auth::CurrentUser;

/// Display theme chosen by a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTheme {
    pub dark_mode: bool,
}

/// Per-user cache of [`UserTheme`]s.
///
/// Reads and writes go through a [`CurrentUser`], so a caller can only ever
/// reach the entry of the signed-in user.
#[derive(Debug, Clone)]
pub struct PreferenceCache {
    cache: ExpiringCache<String, UserTheme>,
    ttl: Duration,
}

impl PreferenceCache {
    pub fn new(cache: ExpiringCache<String, UserTheme>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Lifetime of a stored entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The user's theme, creating the default entry on first access.
    pub fn theme(&self, user: &CurrentUser) -> UserTheme {
        self.cache
            .get_or_insert_with(user.username.clone(), self.ttl, UserTheme::default)
    }

    /// Replace the user's theme. The entry's deadline restarts.
    pub fn set_theme(&self, user: &CurrentUser, theme: UserTheme) -> UserTheme {
        self.cache.set(user.username.clone(), theme, self.ttl);
        debug!(username = %user.username, dark_mode = theme.dark_mode, "Theme updated");
        theme
    }

    /// Drop everything cached for `username`. Returns whether a live entry
    /// existed.
    pub fn evict(&self, username: &str) -> bool {
        let evicted = self.cache.remove(username);
        debug!(username, evicted, "Preferences evicted");
        evicted
    }

    /// The underlying cache.
    pub fn cache(&self) -> &ExpiringCache<String, UserTheme> {
        &self.cache
    }
}
