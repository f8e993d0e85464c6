//! `pr-cooldown` server entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use pr_cooldown::api::{self, AppState};
use pr_cooldown::telemetry::TracingTelemetrySink;
use pr_cooldown::{
    ConfigError, CooldownConfig, CredentialCache, EvaluatorSettings, OctocrabGatewayFactory,
    PersistenceError, SqliteCooldownStore, migrate_database,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to load configuration: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("server I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "pr-cooldown stopped");
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = CooldownConfig::load().map_err(|error| StartupError::Configuration {
        message: error.to_string(),
    })?;
    config.validate()?;

    let schema_version = migrate_database(&config.database_url, &TracingTelemetrySink)?;
    if config.migrate_db {
        tracing::info!(
            schema_version = schema_version.as_str(),
            "migrations applied; exiting"
        );
        return Ok(());
    }

    let store = SqliteCooldownStore::new(config.database_url.clone())?;
    let gateways = OctocrabGatewayFactory::new(config.github_api_url()?.as_str());
    let state = AppState::new(
        Arc::new(store),
        Arc::new(gateways),
        CredentialCache::new(config.token_cache_ttl()?),
        EvaluatorSettings::from_cache_ttl(config.cache_ttl()?),
        config.request_timeout()?,
    );

    let listener = TcpListener::bind(config.socket_addr()?).await?;
    api::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested; draining connections");
}
