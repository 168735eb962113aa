//! One-time token sign-in and cookie sessions.
//!
//! A trusted component mints a [`OneTimeToken`] for a [`Credential`]. The
//! holder follows `/login?key=<token>`, which redeems the token exactly once
//! and sets an encrypted session cookie. [`CurrentUser`] reads it back on
//! later requests.

pub mod exchange;
pub mod identity;
pub mod session;
pub mod token;

pub use exchange::{
    ANONYMOUS_LANDING, ERROR_PATH, ExchangeError, LOGIN_PATH, LOGOUT_PATH, LoginQuery,
    login_handler, logout_handler,
};
pub use identity::{CurrentUser, current_session};
pub use session::{Session, SessionClaims, SessionIssuer};
pub use token::{Credential, CredentialStore, LoginTokens, MalformedToken, OneTimeToken};
