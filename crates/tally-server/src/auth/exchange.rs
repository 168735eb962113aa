//! The `/login` and `/logout` exchange.
//!
//! A one-time token minted elsewhere is redeemed exactly once for a
//! persistent session cookie. Every failure ends on the same error page so
//! callers cannot tell an unknown token from a used or expired one.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::identity::current_session;
use super::token::{MalformedToken, OneTimeToken};
use crate::state::AppState;

/// Path of the token exchange.
pub const LOGIN_PATH: &str = "/login";

/// Path that ends the session.
pub const LOGOUT_PATH: &str = "/logout";

/// Where every failed exchange lands.
pub const ERROR_PATH: &str = "/error";

/// Where a signed-out user lands.
pub const ANONYMOUS_LANDING: &str = "/";

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Query string of the exchange.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub key: Option<String>,
}

/// Why a login exchange was refused.
///
/// All variants render identically; the distinction only reaches the logs.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("no login token supplied")]
    MissingToken,

    #[error(transparent)]
    MalformedToken(#[from] MalformedToken),

    /// Unknown, expired or already redeemed.
    #[error("login token is not redeemable")]
    NotRedeemable,

    #[error("credential store unavailable: {0}")]
    CacheUnavailable(#[from] tally_cache::Error),

    #[error("failed to encode session: {0}")]
    SessionEncoding(#[from] serde_json::Error),
}

impl ExchangeError {
    fn kind(&self) -> &'static str {
        match self {
            ExchangeError::MissingToken => "missing_token",
            ExchangeError::MalformedToken(_) => "malformed_token",
            ExchangeError::NotRedeemable => "not_redeemable",
            ExchangeError::CacheUnavailable(_) => "cache_unavailable",
            ExchangeError::SessionEncoding(_) => "session_encoding",
        }
    }
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        match &self {
            ExchangeError::CacheUnavailable(_) | ExchangeError::SessionEncoding(_) => {
                tracing::error!(kind = self.kind(), error = %self, "Login exchange failed")
            }
            _ => warn!(kind = self.kind(), error = %self, "Login exchange rejected"),
        }
        found(ERROR_PATH)
    }
}

/// `GET /login?key=<token>`
///
/// Parses the token, redeems it once, and on success sets the session
/// cookie and redirects to the configured landing page.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Result<(PrivateCookieJar, Response), ExchangeError> {
    let key = query
        .ok()
        .and_then(|Query(query)| query.key)
        .ok_or(ExchangeError::MissingToken)?;
    let token: OneTimeToken = key.parse()?;

    let credential = state
        .login_tokens
        .redeem(&token)?
        .ok_or(ExchangeError::NotRedeemable)?;

    let session = state.issuer.issue(credential);
    let cookie = session.to_cookie(&state.config.cookie_name, state.config.secure_cookie)?;

    info!(
        username = %session.claims.username,
        expires_at = %session.expires_at,
        "Signed in"
    );

    Ok((jar.add(cookie), found(&state.config.home_path)))
}

/// `GET /logout`
///
/// Drops the signed-in user's ephemeral state, clears the session cookie
/// and redirects to the anonymous landing page. Works without a session.
///
/// The removal cookie is sent unconditionally: a cookie that no longer
/// decrypts (for example after a key change) is still cleared.
pub async fn logout_handler(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    if let Some(session) = current_session(&jar, &state.config.cookie_name) {
        let username = session.claims.username;
        let evicted = state.preferences.evict(&username);
        info!(username = %username, evicted, "Signed out");
    }

    let removal = removal_cookie(&state.config.cookie_name, state.config.secure_cookie);
    let mut response = found(ANONYMOUS_LANDING);
    if let Ok(value) = HeaderValue::from_str(&removal.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Expired, empty cookie that makes the browser drop `name`.
fn removal_cookie(name: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}
