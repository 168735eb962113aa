//! Helpers shared by the in-crate handler tests.

use axum::{
    http::{HeaderMap, header},
    response::IntoResponse,
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};

/// Encrypt `cookie` with `key` and return it as a `Cookie` request header
/// value (`name=ciphertext`).
pub(crate) fn encrypted_cookie_header(key: &Key, cookie: Cookie<'static>) -> String {
    let jar = PrivateCookieJar::new(key.clone()).add(cookie);
    let response = (jar, ()).into_response();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("jar emits Set-Cookie")
        .to_str()
        .unwrap();
    first_pair(set_cookie).to_string()
}

/// Every `Set-Cookie` header value in `headers`.
pub(crate) fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The `name=value` part of a `Set-Cookie` value.
pub(crate) fn first_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap_or_default().trim()
}
