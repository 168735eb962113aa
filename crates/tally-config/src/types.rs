//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]        # listener, request logging, landing page
//! [login]         # one-time login token lifetime
//! [session]       # session cookie
//! [preferences]   # per-user preference cache
//! [logging]       # log file location
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Minimum length of the session cookie master secret.
pub const MIN_SECRET_LEN: usize = 32;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// HTTP server settings.
    pub server: Option<ServerSection>,

    /// One-time login token settings.
    pub login: Option<LoginSection>,

    /// Session cookie settings.
    pub session: Option<SessionSection>,

    /// Per-user preference cache settings.
    pub preferences: Option<PreferencesSection>,

    /// Log output settings.
    pub logging: Option<LoggingSection>,
}

impl TallyConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced wholesale, not merged field by field.
    pub fn merge(&mut self, other: TallyConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.login.is_some() {
            self.login = other.login;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
        if other.preferences.is_some() {
            self.preferences = other.preferences;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerSection {
        self.server.clone().unwrap_or_default()
    }

    /// Login section, or defaults.
    pub fn login(&self) -> LoginSection {
        self.login.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionSection {
        self.session.clone().unwrap_or_default()
    }

    /// Preferences section, or defaults.
    pub fn preferences(&self) -> PreferencesSection {
        self.preferences.clone().unwrap_or_default()
    }

    /// Logging section, or defaults.
    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        let server = self.server();
        if !server.home_path.starts_with('/') {
            return Err(ConfigError::invalid(
                "server.home_path",
                "must be an absolute path starting with '/'",
            ));
        }

        let login = self.login();
        if login.token_ttl_secs == 0 {
            return Err(ConfigError::invalid(
                "login.token_ttl_secs",
                "must be greater than zero",
            ));
        }
        if login.sweep_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "login.sweep_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.preferences().sweep_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "preferences.sweep_interval_secs",
                "must be greater than zero",
            ));
        }

        let session = self.session();
        if session.lifetime_days == 0 {
            return Err(ConfigError::invalid(
                "session.lifetime_days",
                "must be greater than zero",
            ));
        }
        if session.cookie_name.is_empty() {
            return Err(ConfigError::invalid("session.cookie_name", "must not be empty"));
        }
        if let Some(ref secret) = session.secret
            && secret.len() < MIN_SECRET_LEN
        {
            return Err(ConfigError::invalid(
                "session.secret",
                format!("must be at least {} bytes", MIN_SECRET_LEN),
            ));
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable request logging.
    pub request_logging: bool,
    /// Where a successful sign-in lands.
    pub home_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            request_logging: true,
            home_path: "/".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login tokens
// ─────────────────────────────────────────────────────────────────────────────

/// One-time login token configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSection {
    /// Seconds a minted token stays redeemable.
    pub token_ttl_secs: u64,
    /// Seconds between sweeps of the token cache.
    pub sweep_interval_secs: u64,
}

impl Default for LoginSection {
    fn default() -> Self {
        Self {
            token_ttl_secs: 300,
            sweep_interval_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Session cookie configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Days an issued session remains valid.
    pub lifetime_days: u32,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,
    /// Master secret the cookie encryption key is derived from.
    /// If unset, a random key is generated at startup and sessions do not
    /// survive a restart.
    pub secret: Option<String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            lifetime_days: 30,
            cookie_name: "tally_session".to_string(),
            secure_cookie: false,
            secret: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Per-user preference cache configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesSection {
    /// Seconds a user's preferences are kept after being written.
    pub ttl_secs: u64,
    /// Seconds between sweeps of the preference cache.
    pub sweep_interval_secs: u64,
}

impl Default for PreferencesSection {
    fn default() -> Self {
        Self {
            ttl_secs: 12 * 60 * 60,
            sweep_interval_secs: 300,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Directory for rolling JSON log files. Defaults to `<config dir>/logs`.
    pub directory: Option<PathBuf>,
}
