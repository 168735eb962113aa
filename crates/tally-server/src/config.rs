//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Default lifetime of a minted login token (5 minutes).
pub const DEFAULT_LOGIN_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Default lifetime of an issued session (30 days).
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Default lifetime of a user's cached preferences (12 hours).
pub const DEFAULT_PREFERENCE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "tally_session";

/// Minimum length of the cookie master secret.
pub const MIN_COOKIE_SECRET_LEN: usize = 32;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable request logging.
    pub request_logging: bool,

    /// Landing page after a successful sign-in.
    pub home_path: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Login tokens
    // ─────────────────────────────────────────────────────────────────────────
    /// How long a minted one-time token stays redeemable.
    pub login_token_ttl: Duration,

    /// How often expired tokens are swept.
    pub login_sweep_interval: Duration,

    // ─────────────────────────────────────────────────────────────────────────
    // Session cookie
    // ─────────────────────────────────────────────────────────────────────────
    /// Lifetime of an issued session.
    pub session_lifetime: Duration,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,

    /// Master secret for cookie encryption. `None` generates a random key
    /// per process.
    pub cookie_secret: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Preferences
    // ─────────────────────────────────────────────────────────────────────────
    /// How long a user's preferences are kept.
    pub preference_ttl: Duration,

    /// How often expired preferences are swept.
    pub preference_sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            request_logging: true,
            home_path: "/".to_string(),
            login_token_ttl: DEFAULT_LOGIN_TOKEN_TTL,
            login_sweep_interval: Duration::from_secs(30),
            session_lifetime: DEFAULT_SESSION_LIFETIME,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookie: false,
            cookie_secret: None,
            preference_ttl: DEFAULT_PREFERENCE_TTL,
            preference_sweep_interval: Duration::from_secs(300),
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set the post sign-in landing page.
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    /// Set how long minted login tokens stay valid.
    pub fn with_login_token_ttl(mut self, ttl: Duration) -> Self {
        self.login_token_ttl = ttl;
        self
    }

    /// Set the token cache sweep interval.
    pub fn with_login_sweep_interval(mut self, interval: Duration) -> Self {
        self.login_sweep_interval = interval;
        self
    }

    /// Set the session lifetime.
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Mark the session cookie `Secure`.
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    /// Set the cookie master secret.
    pub fn with_cookie_secret(mut self, secret: impl Into<String>) -> Self {
        self.cookie_secret = Some(secret.into());
        self
    }

    /// Set how long per-user preferences are kept.
    pub fn with_preference_ttl(mut self, ttl: Duration) -> Self {
        self.preference_ttl = ttl;
        self
    }

    /// Set the preference cache sweep interval.
    pub fn with_preference_sweep_interval(mut self, interval: Duration) -> Self {
        self.preference_sweep_interval = interval;
        self
    }
}
