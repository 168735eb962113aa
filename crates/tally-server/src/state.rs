//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tally_cache::{CacheConfig, ExpiringCache, Sweeper};
use tracing::{debug, warn};

use crate::auth::{Credential, CredentialStore, LoginTokens, OneTimeToken, SessionIssuer};
use crate::config::{MIN_COOKIE_SECRET_LEN, ServerConfig};
use crate::error::{Result, ServerError};
use crate::preferences::PreferenceCache;

/// Application state shared across all handlers.
///
/// Every cache is constructed here and reached only through this state;
/// there are no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Storage behind the login tokens.
    pub token_cache: ExpiringCache<OneTimeToken, Credential>,

    /// Mint and redeem one-time login tokens.
    pub login_tokens: LoginTokens,

    /// Per-user ephemeral preferences.
    pub preferences: PreferenceCache,

    /// Issues sessions after a successful exchange.
    pub issuer: SessionIssuer,

    cookie_key: Key,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Fails if the configured cookie secret is too short.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let cookie_key = cookie_key(config.cookie_secret.as_deref())?;

        let token_cache = ExpiringCache::new(
            CacheConfig::new().with_sweep_interval(config.login_sweep_interval),
        );
        let login_tokens =
            LoginTokens::new(Arc::new(token_cache.clone()), config.login_token_ttl);

        let preferences = PreferenceCache::new(
            ExpiringCache::new(
                CacheConfig::new().with_sweep_interval(config.preference_sweep_interval),
            ),
            config.preference_ttl,
        );

        Ok(Self {
            issuer: SessionIssuer::new(config.session_lifetime),
            config: Arc::new(config),
            token_cache,
            login_tokens,
            preferences,
            cookie_key,
        })
    }

    /// Redeem tokens against `store` instead of the built-in cache.
    pub fn with_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.login_tokens = LoginTokens::new(store, self.config.login_token_ttl);
        self
    }

    /// Key that encrypts the session cookie.
    pub fn cookie_key(&self) -> &Key {
        &self.cookie_key
    }

    /// Start the background sweepers of both caches.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sweepers(&self) -> Vec<Sweeper> {
        let sweepers: Vec<Sweeper> = [
            self.token_cache.start_sweeper(),
            self.preferences.cache().start_sweeper(),
        ]
        .into_iter()
        .flatten()
        .collect();

        debug!(count = sweepers.len(), "Cache sweepers started");
        sweepers
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

fn cookie_key(secret: Option<&str>) -> Result<Key> {
    match secret {
        Some(secret) if secret.len() < MIN_COOKIE_SECRET_LEN => Err(ServerError::Config(format!(
            "cookie secret must be at least {} bytes",
            MIN_COOKIE_SECRET_LEN
        ))),
        Some(secret) => Ok(Key::derive_from(secret.as_bytes())),
        None => {
            warn!("No cookie secret configured; sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}
