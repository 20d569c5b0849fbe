use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Extension, Router};
use chrono::Duration;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use turnstile::{LoginGuardConfig, TurnstileBuilder};
use turnstile_axum::{
    IdentifierStrategy, LoginState, StaticCredentials, TrustForwardedHeaders,
};

/// Command line interface for Turnstile
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    guard: GuardArgs,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GuardArgs {
    /// Consecutive failures before an identifier is blocked
    #[arg(long, env = "TURNSTILE_MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u32,

    /// Seconds after which failures stop counting (0 keeps them forever)
    #[arg(long, env = "TURNSTILE_FAILURE_WINDOW_SECS", default_value_t = 900)]
    failure_window_secs: i64,

    /// Seconds a block lasts (0 blocks until success or unlock)
    #[arg(long, env = "TURNSTILE_LOCKOUT_SECS", default_value_t = 900)]
    lockout_secs: i64,

    /// Seconds between sweeps of expired records
    #[arg(long, env = "TURNSTILE_CLEANUP_INTERVAL_SECS", default_value_t = 60)]
    cleanup_interval_secs: u64,

    /// Disable attempt tracking entirely
    #[arg(long, env = "TURNSTILE_DISABLED")]
    disabled: bool,
}

impl GuardArgs {
    fn to_config(&self) -> anyhow::Result<LoginGuardConfig> {
        Ok(LoginGuardConfig {
            enabled: !self.disabled,
            max_attempts: self.max_attempts,
            failure_window: optional_period("failure-window-secs", self.failure_window_secs)?,
            lockout_period: optional_period("lockout-secs", self.lockout_secs)?,
            cleanup_interval: std::time::Duration::from_secs(self.cleanup_interval_secs),
        })
    }
}

/// Zero means no period.
fn optional_period(flag: &str, secs: i64) -> anyhow::Result<Option<Duration>> {
    if secs == 0 {
        return Ok(None);
    }

    Duration::try_seconds(secs)
        .map(Some)
        .with_context(|| format!("--{flag} is out of range: {secs}"))
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Strategy {
    Ip,
    Username,
    IpAndUsername,
}

impl From<Strategy> for IdentifierStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Ip => IdentifierStrategy::ClientIp,
            Strategy::Username => IdentifierStrategy::Username,
            Strategy::IpAndUsername => IdentifierStrategy::ClientIpAndUsername,
        }
    }
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Run a login server guarded by turnstile
    Serve {
        /// Address to listen on
        #[arg(long, env = "TURNSTILE_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        /// Accepted credentials as username:password. Repeat the flag for
        /// more users; the password is taken verbatim after the first colon.
        #[arg(long = "user")]
        users: Vec<String>,

        /// What a failed attempt is counted against
        #[arg(long, value_enum, default_value = "ip")]
        strategy: Strategy,

        /// Expose the unauthenticated lockout admin routes under /admin
        #[arg(long)]
        enable_admin: bool,

        /// Take the client IP from X-Forwarded-For / X-Real-IP. Only safe
        /// behind a reverse proxy that overwrites those headers.
        #[arg(long, env = "TURNSTILE_TRUST_FORWARDED_HEADERS")]
        trust_forwarded_headers: bool,
    },
    /// Validate and print the effective configuration
    CheckConfig,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,turnstile=debug,turnstile_core=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.guard.to_config()?;

    match cli.command {
        Commands::Serve {
            bind,
            users,
            strategy,
            enable_admin,
            trust_forwarded_headers,
        } => {
            serve(
                config,
                bind,
                users,
                strategy.into(),
                enable_admin,
                trust_forwarded_headers,
            )
            .await
        }
        Commands::CheckConfig => {
            config.validate().context("invalid configuration")?;
            println!("{config:#?}");
            Ok(())
        }
        Commands::Version => {
            println!("Turnstile v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(
    config: LoginGuardConfig,
    bind: SocketAddr,
    users: Vec<String>,
    strategy: IdentifierStrategy,
    enable_admin: bool,
    trust_forwarded_headers: bool,
) -> anyhow::Result<()> {
    let turnstile = TurnstileBuilder::new().with_config(config).build()?;
    let cleanup = turnstile.start_cleanup();

    let credentials = users
        .iter()
        .map(|entry| StaticCredentials::parse_entry(entry))
        .collect::<Result<StaticCredentials, _>>()?;
    if credentials.is_empty() {
        warn!("No users configured; every login attempt will fail");
    }

    let state = LoginState::new(turnstile.guard().clone(), Arc::new(credentials));
    let auth_routes = turnstile_axum::routes(state.clone())
        .with_strategy(strategy)
        .build();

    let mut app = Router::new().nest("/auth", auth_routes);
    if enable_admin {
        warn!("Lockout admin routes are enabled without authentication");
        app = app.nest("/admin", turnstile_axum::admin_router(state));
    }
    if trust_forwarded_headers {
        info!("Client addresses are taken from forwarded headers");
        app = app.layer(Extension(TrustForwardedHeaders));
    }

    info!("Server starting on http://{bind}");
    info!("Available endpoints:");
    info!("  POST   /auth/login                    - Login with username and password");
    info!("  GET    /auth/health                   - Health check");
    if enable_admin {
        info!("  GET    /admin/lockout/{{identifier}}   - Lockout status");
        info!("  DELETE /admin/lockout/{{identifier}}   - Unlock identifier");
    }

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cleanup.shutdown().await?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_zero_seconds_disables_period() {
        let cli = parse(&[
            "turnstile",
            "--failure-window-secs",
            "0",
            "--lockout-secs",
            "0",
            "check-config",
        ]);
        let config = cli.guard.to_config().unwrap();

        assert_eq!(config.failure_window, None);
        assert_eq!(config.lockout_period, None);
    }

    #[test]
    fn test_out_of_range_seconds_is_an_error() {
        let huge = i64::MAX.to_string();
        let cli = parse(&["turnstile", "--lockout-secs", huge.as_str(), "check-config"]);

        let err = cli.guard.to_config().unwrap_err();
        assert!(err.to_string().contains("--lockout-secs"));
    }

    #[test]
    fn test_user_password_keeps_commas() {
        let cli = parse(&[
            "turnstile",
            "serve",
            "--user",
            "alice:pa,ss",
            "--user",
            "bob:hunter2",
        ]);
        let Commands::Serve { users, .. } = cli.command else {
            panic!("expected serve command");
        };

        assert_eq!(users, vec!["alice:pa,ss", "bob:hunter2"]);
        let credentials = users
            .iter()
            .map(|entry| StaticCredentials::parse_entry(entry))
            .collect::<Result<StaticCredentials, _>>()
            .unwrap();
        assert_eq!(credentials.len(), 2);
    }
}
