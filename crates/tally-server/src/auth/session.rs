//! Sessions issued after a successful token exchange.

use std::fmt;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::token::Credential;

/// What a session asserts about its holder.
///
/// The secret is carried forward so the tracker client can be rebuilt per
/// request; it is never checked here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub username: String,
    pub secret: String,
}

impl fmt::Debug for SessionClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClaims")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// An authenticated, time-bounded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub claims: SessionClaims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Survives browser restarts.
    pub persistent: bool,
}

impl Session {
    /// Whether the session is past its deadline at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Encode into a session cookie.
    ///
    /// Persistent sessions get a `Max-Age` matching their lifetime; the
    /// private cookie jar encrypts the value when the cookie is added.
    pub fn to_cookie(&self, name: &str, secure: bool) -> serde_json::Result<Cookie<'static>> {
        let value = serde_json::to_string(self)?;
        let mut builder = Cookie::build((name.to_string(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure);

        if self.persistent {
            let lifetime = (self.expires_at - self.issued_at).num_seconds().max(0);
            builder = builder.max_age(time::Duration::seconds(lifetime));
        }

        Ok(builder.build())
    }

    /// Decode a session from a (decrypted) cookie. Expiry is not checked.
    pub fn from_cookie(cookie: &Cookie<'_>) -> Option<Self> {
        match serde_json::from_str(cookie.value()) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "Discarding undecodable session cookie");
                None
            }
        }
    }
}

/// Turns redeemed credentials into sessions with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    lifetime: TimeDelta,
}

impl SessionIssuer {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime: TimeDelta::from_std(lifetime).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Issue a persistent session expiring one lifetime from now.
    pub fn issue(&self, credential: Credential) -> Session {
        self.issue_at(credential, Utc::now())
    }

    /// Issue a session as of `now`.
    pub fn issue_at(&self, credential: Credential, now: DateTime<Utc>) -> Session {
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Session {
            claims: SessionClaims {
                username: credential.username,
                secret: credential.secret,
            },
            issued_at: now,
            expires_at,
            persistent: true,
        }
    }
}
