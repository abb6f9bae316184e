//! `formrelay` server entry point.
//!
//! Loads configuration from the environment, builds the relay state, and
//! serves it with graceful shutdown on Ctrl-C / SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use formrelay_server::config::RelayConfig;
use formrelay_server::routes;
use formrelay_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        origins = ?config.allowed_origins,
        validation = ?config.validation,
        timeout_ms = u64::try_from(config.upstream_timeout.as_millis()).unwrap_or(u64::MAX),
        "formrelay starting"
    );
    warn_on_missing_secrets(&config);

    let state = Arc::new(AppState::from_config(&config)?);
    let app = routes::build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "formrelay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("formrelay stopped");
    Ok(())
}

/// Missing secrets are reported per request as 500s; say so once at startup too.
fn warn_on_missing_secrets(config: &RelayConfig) {
    if config.verification_secret.is_none() {
        warn!("RECAPTCHA_SECRET is not set; every submission will fail with 500");
    }
    if config.access_key.is_none() {
        warn!("W3FORM_ID is not set; every submission will fail with 500");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
