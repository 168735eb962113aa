//! Serve command - runs the sign-in server.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use tally_config::TallyConfig;
use tally_server::{Credential, Server, ServerConfig};

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Landing page after sign-in (overrides config)
    #[arg(long)]
    pub home: Option<String>,

    /// Mint a login link for this user at startup (repeatable, for local
    /// testing only)
    #[arg(long = "dev-user", value_name = "USERNAME")]
    pub dev_users: Vec<String>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    if ctx.verbose {
        let sources = ctx.loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let config = server_config(&ctx.loaded.config, &args)?;
    let server = Server::new(config)?;

    for username in &args.dev_users {
        let token = server
            .state()
            .login_tokens
            .mint(Credential::new(username.as_str(), ""))?;
        println!(
            "Login link for {}: http://{}/login?key={}",
            username,
            server.bind_address(),
            token
        );
    }

    server.run_until(shutdown_signal()).await?;
    Ok(())
}

/// Build the server configuration from file values and CLI overrides.
pub fn server_config(config: &TallyConfig, args: &ServeArgs) -> Result<ServerConfig> {
    let server = config.server();
    let login = config.login();
    let session = config.session();
    let preferences = config.preferences();

    let bind = args.bind.as_deref().unwrap_or(&server.bind);
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind))?;
    let port = args.port.unwrap_or(server.port);

    let home = args.home.clone().unwrap_or(server.home_path);
    if !home.starts_with('/') {
        anyhow::bail!("landing page must start with '/': {}", home);
    }

    let mut server_config = ServerConfig::new()
        .with_bind_address(SocketAddr::new(ip, port))
        .with_request_logging(server.request_logging)
        .with_home_path(home)
        .with_login_token_ttl(Duration::from_secs(login.token_ttl_secs))
        .with_login_sweep_interval(Duration::from_secs(login.sweep_interval_secs))
        .with_session_lifetime(Duration::from_secs(
            u64::from(session.lifetime_days) * 24 * 60 * 60,
        ))
        .with_cookie_name(session.cookie_name)
        .with_secure_cookie(session.secure_cookie)
        .with_preference_ttl(Duration::from_secs(preferences.ttl_secs))
        .with_preference_sweep_interval(Duration::from_secs(preferences.sweep_interval_secs));

    if let Some(secret) = session.secret {
        server_config = server_config.with_cookie_secret(secret);
    }

    Ok(server_config)
}

/// Resolve on Ctrl-C (and SIGTERM on unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_through() {
        let config = server_config(&TallyConfig::new(), &ServeArgs::default()).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.login_token_ttl, Duration::from_secs(300));
        assert_eq!(config.session_lifetime, Duration::from_secs(30 * 86_400));
        assert_eq!(config.preference_ttl, Duration::from_secs(43_200));
        assert_eq!(config.cookie_name, "tally_session");
        assert_eq!(config.home_path, "/");
        assert!(config.cookie_secret.is_none());
    }

    #[test]
    fn test_file_values() {
        let file = TallyConfig::from_toml(
            r#"
            [server]
            port = 9000
            home_path = "/worklogs"

            [login]
            token_ttl_secs = 60

            [session]
            lifetime_days = 7
            cookie_name = "sid"
            secure_cookie = true
            secret = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();

        let config = server_config(&file, &ServeArgs::default()).unwrap();

        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.home_path, "/worklogs");
        assert_eq!(config.login_token_ttl, Duration::from_secs(60));
        assert_eq!(config.session_lifetime, Duration::from_secs(7 * 86_400));
        assert_eq!(config.cookie_name, "sid");
        assert!(config.secure_cookie);
        assert!(config.cookie_secret.is_some());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TallyConfig::from_toml("[server]\nport = 9000\n").unwrap();
        let args = ServeArgs {
            port: Some(9100),
            bind: Some("0.0.0.0".into()),
            home: Some("/home".into()),
            ..Default::default()
        };

        let config = server_config(&file, &args).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:9100".parse().unwrap());
        assert_eq!(config.home_path, "/home");
    }

    #[test]
    fn test_rejects_bad_overrides() {
        let bad_bind = ServeArgs {
            bind: Some("localhost:80".into()),
            ..Default::default()
        };
        assert!(server_config(&TallyConfig::new(), &bad_bind).is_err());

        let bad_home = ServeArgs {
            home: Some("worklogs".into()),
            ..Default::default()
        };
        assert!(server_config(&TallyConfig::new(), &bad_home).is_err());
    }
}
