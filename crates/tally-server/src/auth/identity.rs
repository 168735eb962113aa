//! The signed-in user, as carried by the session cookie.

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use tracing::debug;

use super::session::Session;
use crate::error::ServerError;
use crate::state::AppState;

/// Read the live session from `jar`.
///
/// Missing, undecryptable, undecodable and expired cookies all count as
/// anonymous.
pub fn current_session(jar: &PrivateCookieJar, cookie_name: &str) -> Option<Session> {
    let cookie = jar.get(cookie_name)?;
    let session = Session::from_cookie(&cookie)?;

    if session.is_expired(Utc::now()) {
        debug!(username = %session.claims.username, "Ignoring expired session cookie");
        return None;
    }

    Some(session)
}

/// The authenticated principal of the current request.
///
/// Use as an extractor; requests without a live session are rejected with
/// `401 Unauthorized`.
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> String {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    /// Tracker secret from the session claims.
    pub secret: String,
}

impl From<Session> for CurrentUser {
    fn from(session: Session) -> Self {
        Self {
            username: session.claims.username,
            secret: session.claims.secret,
        }
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key().clone());

        current_session(&jar, &state.config.cookie_name)
            .map(CurrentUser::from)
            .ok_or_else(|| ServerError::Unauthorized("No valid session".to_string()))
    }
}
