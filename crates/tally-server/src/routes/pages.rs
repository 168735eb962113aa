//! Plain pages the exchange redirects to.

use axum::extract::State;
use axum_extra::extract::PrivateCookieJar;

use crate::auth::current_session;
use crate::state::AppState;

/// Body of the page every failed sign-in lands on.
pub const ERROR_PAGE_BODY: &str = "sign-in link invalid or expired";

/// `GET /error`
pub async fn error_page() -> &'static str {
    ERROR_PAGE_BODY
}

/// `GET /`
pub async fn index(State(state): State<AppState>, jar: PrivateCookieJar) -> String {
    match current_session(&jar, &state.config.cookie_name) {
        Some(session) => format!("signed in as {}", session.claims.username),
        None => "not signed in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, SessionIssuer};
    use crate::config::ServerConfig;
    use crate::test_support::encrypted_cookie_header;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    fn create_test_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/error", get(error_page))
            .with_state(state)
    }

    async fn body_text(app: Router, request: Request<Body>) -> String {
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_page() {
        let app = create_test_router(AppState::new(ServerConfig::new()).unwrap());
        let request = Request::builder().uri("/error").body(Body::empty()).unwrap();

        assert_eq!(body_text(app, request).await, ERROR_PAGE_BODY);
    }

    #[tokio::test]
    async fn test_index_anonymous_and_signed_in() {
        let state = AppState::new(ServerConfig::new()).unwrap();
        let session = SessionIssuer::new(state.config.session_lifetime)
            .issue(Credential::new("alice", "s3cr3t"));
        let cookie = encrypted_cookie_header(
            state.cookie_key(),
            session.to_cookie(&state.config.cookie_name, false).unwrap(),
        );
        let app = create_test_router(state);

        let anonymous = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(body_text(app.clone(), anonymous).await, "not signed in");

        let signed_in = Request::builder()
            .uri("/")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_text(app, signed_in).await, "signed in as alice");
    }
}
