//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::http::{HeaderMap, header};
use axum_extra::extract::PrivateCookieJar;
use reqwest::{Client, redirect::Policy};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use tally_server::auth::current_session;
use tally_server::{AppState, Credential, OneTimeToken, Server, ServerConfig, Session};

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client that never follows redirects.
    pub client: Client,
    /// Shared with the running server.
    pub state: AppState,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default configuration.
    pub async fn start() -> Result<Self> {
        Self::start_with(|config| config).await
    }

    /// Start a new test server after adjusting the default test config.
    pub async fn start_with(configure: impl FnOnce(ServerConfig) -> ServerConfig) -> Result<Self> {
        let addr = find_available_port().await?;

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_request_logging(false)
            .with_home_path("/worklogs");
        let state = AppState::new(configure(config))?;

        let server = Server::from_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::builder().redirect(Policy::none()).build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// GET `path`, optionally presenting a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.client.get(format!("{}{}", self.base_url(), path));
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        Ok(request.send().await?)
    }

    /// Park a credential and return its login token.
    pub fn mint(&self, username: &str) -> OneTimeToken {
        self.state
            .login_tokens
            .mint(Credential::new(username, "s3cr3t"))
            .expect("in-memory store accepts tokens")
    }

    /// Follow `/login` for `token`.
    pub async fn login(&self, token: &str) -> Result<reqwest::Response> {
        self.get(&format!("/login?key={token}"), None).await
    }

    /// Decrypt the session in a `Cookie` header value produced by
    /// [`session_cookie`].
    pub fn decode_session(&self, cookie: &str) -> Option<Session> {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, cookie.parse().ok()?);
        let jar = PrivateCookieJar::from_headers(&headers, self.state.cookie_key().clone());
        current_session(&jar, &self.state.config.cookie_name)
    }
}

/// `Location` of a redirect.
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// The session cookie set by `response`, as a `Cookie` header value.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_string())
        .find(|pair| pair.starts_with("tally_session=") && pair.len() > "tally_session=".len())
}

/// All `Set-Cookie` values of `response`.
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
