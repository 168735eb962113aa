//! Theme preference endpoints.
//!
//! Both routes act on the signed-in user only; no route takes a username.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::auth::CurrentUser;
use crate::error::{Result, ServerError};
use crate::preferences::UserTheme;
use crate::state::AppState;

/// `GET /api/v1/preferences/theme`
pub async fn get_theme_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Json<UserTheme> {
    Json(state.preferences.theme(&user))
}

/// `PUT /api/v1/preferences/theme`
pub async fn put_theme_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    body: std::result::Result<Json<UserTheme>, JsonRejection>,
) -> Result<Json<UserTheme>> {
    let Json(theme) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    Ok(Json(state.preferences.set_theme(&user, theme)))
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
        http::{Method, Request, StatusCode, header},
        response::Response,
        routing::get,
    };
    use tower::ServiceExt;

    const THEME: &str = "/theme";

    fn create_test_router(state: AppState) -> Router {
        Router::new()
            .route(THEME, get(get_theme_handler).put(put_theme_handler))
            .with_state(state)
    }

    fn signed_in(state: &AppState, username: &str) -> String {
        let session = SessionIssuer::new(state.config.session_lifetime)
            .issue(Credential::new(username, "s3cr3t"));
        encrypted_cookie_header(
            state.cookie_key(),
            session.to_cookie(&state.config.cookie_name, false).unwrap(),
        )
    }

    async fn send(app: &Router, method: Method, cookie: Option<&str>, body: Option<&str>) -> Response {
        let mut request = Request::builder().method(method).uri(THEME);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn theme(response: Response) -> UserTheme {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_requires_session() {
        let app = create_test_router(AppState::new(ServerConfig::new()).unwrap());

        let get = send(&app, Method::GET, None, None).await;
        assert_eq!(get.status(), StatusCode::UNAUTHORIZED);

        let put = send(&app, Method::PUT, None, Some(r#"{"dark_mode":true}"#)).await;
        assert_eq!(put.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_defaults_then_put() {
        let state = AppState::new(ServerConfig::new()).unwrap();
        let alice = signed_in(&state, "alice");
        let app = create_test_router(state.clone());

        let initial = send(&app, Method::GET, Some(&alice), None).await;
        assert_eq!(initial.status(), StatusCode::OK);
        assert_eq!(theme(initial).await, UserTheme::default());

        let updated = send(&app, Method::PUT, Some(&alice), Some(r#"{"dark_mode":true}"#)).await;
        assert_eq!(updated.status(), StatusCode::OK);
        assert!(theme(updated).await.dark_mode);

        let reread = send(&app, Method::GET, Some(&alice), None).await;
        assert!(theme(reread).await.dark_mode);
        assert_eq!(state.preferences.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_users_do_not_see_each_other() {
        let state = AppState::new(ServerConfig::new()).unwrap();
        let alice = signed_in(&state, "alice");
        let bob = signed_in(&state, "bob");
        let app = create_test_router(state);

        send(&app, Method::PUT, Some(&alice), Some(r#"{"dark_mode":true}"#)).await;

        let bobs = send(&app, Method::GET, Some(&bob), None).await;
        assert!(!theme(bobs).await.dark_mode);
    }

    #[tokio::test]
    async fn test_bad_body_is_bad_request() {
        let state = AppState::new(ServerConfig::new()).unwrap();
        let alice = signed_in(&state, "alice");
        let app = create_test_router(state);

        let response = send(&app, Method::PUT, Some(&alice), Some(r#"{"dark_mode":"yes"}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
