//! HTTP service for Tally sign-in.
//!
//! This crate turns one-time login tokens into persistent cookie sessions
//! and keeps a small ephemeral cache of per-user preferences.
//!
//! # Features
//!
//! - `GET /login?key=<token>` single-use token exchange
//! - `GET /logout` with eviction of the user's cached state
//! - Encrypted, persistent session cookies
//! - Per-user theme preferences
//! - Request logging
//!
//! # Example
//!
//! ```ignore
//! use tally_server::{Credential, Server, ServerConfig};
//!
//! let server = Server::new(ServerConfig::new().with_cookie_secret(secret))?;
//! let token = server.state().login_tokens.mint(Credential::new("alice", "s3cr3t"))?;
//! println!("http://127.0.0.1:8080/login?key={token}");
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod preferences;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use auth::{
    Credential, CredentialStore, CurrentUser, ExchangeError, LoginTokens, OneTimeToken, Session,
    SessionIssuer,
};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use middleware::request_logging_middleware;
pub use preferences::{PreferenceCache, UserTheme};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, middleware::from_fn_with_state};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The Tally HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Application state, e.g. for minting login tokens.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::get;

        Router::new()
            // Health routes (no session required)
            .merge(routes::health_routes())
            // Token exchange
            .route(auth::LOGIN_PATH, get(auth::login_handler))
            .route(auth::LOGOUT_PATH, get(auth::logout_handler))
            // Pages the exchange redirects to
            .route(auth::ERROR_PATH, get(routes::error_page))
            .route(auth::ANONYMOUS_LANDING, get(routes::index))
            .nest("/api/v1", self.api_routes())
            // Request logging
            .layer(from_fn_with_state(
                self.state.clone(),
                middleware::request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// API routes (v1). Each handler requires a session via [`CurrentUser`].
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::get;

        Router::new().route(
            "/preferences/theme",
            get(routes::get_theme_handler).put(routes::put_theme_handler),
        )
    }

    /// Run the server until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.serve(addr, std::future::pending()).await
    }

    /// Run the server until `shutdown` resolves, then drain connections and
    /// stop the cache sweepers.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address;
        self.serve(addr, shutdown).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        self.serve(addr, std::future::pending()).await
    }

    async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        let sweepers = self.state.start_sweepers();

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)));

        for sweeper in sweepers {
            if let Err(e) = sweeper.shutdown().await {
                warn!(error = %e, "Cache sweeper did not stop cleanly");
            }
        }

        info!("Server stopped");
        served
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
