use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::{net::TcpListener, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ai::{AiProvider, Assistant};
use crate::error::{AppError, log_error};
use crate::model::{DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod ai;
pub mod auth;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "codecamp";

/// Wires the router over an opened database and a chosen AI provider. Migrations run here.
pub async fn build_server_with(
    db: DbConnection,
    config: Arc<Config>,
    provider: Arc<dyn AiProvider>,
) -> AppResult<(AppState, Router)> {
    db.migrate().await?;

    let assistant = Assistant::new(provider, config.ai().max_tokens());
    let mm = ModelManager::new(db);
    let state = AppState::new(mm, config, assistant);
    let app = web::routes::build_app(state.clone());
    Ok((state, app))
}

pub async fn build_server(config: Arc<Config>) -> AppResult<(AppState, Router)> {
    let db = DbConnection::connect(config.app().database_file())?;
    let provider = ai::provider_from_config(config.ai())?;
    build_server_with(db, config, provider).await
}

/// Periodically drops expired sessions until `cancel` fires.
pub fn spawn_session_cleanup(state: AppState, cancel: CancellationToken) -> JoinHandle<()> {
    let period = state.config().app().session_cleanup_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match state.issuer().cleanup_expired(state.pool()).await {
                        Ok(0) => {}
                        Ok(removed) => tracing::info!("removed {removed} expired sessions"),
                        Err(e) => log_error(&e),
                    }
                }
            }
        }

        tracing::debug!("session cleanup stopped");
    })
}

#[tracing::instrument(skip_all)]
pub async fn setup_workers(config: Arc<Config>) -> AppResult<()> {
    if config.host().reload() {
        tracing::warn!("RELOAD is set but has no effect, restart the server to pick up changes");
    }
    if config.app().secret_key() == config::DEFAULT_SECRET_KEY {
        tracing::warn!("SECRET_KEY is the built-in default, set a real one outside of development");
    }

    let (state, app) = build_server(config.clone()).await?;
    let listener = TcpListener::bind(config.host().bindto()).await?;
    let cancel = CancellationToken::new();
    let cleanup = spawn_session_cleanup(state, cancel.clone());

    tracing::info!("axum is starting at: {}", config.host().bindto());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    if let Err(e) = cleanup.await {
        tracing::warn!("session cleanup task failed: {e}");
    }
    Ok(())
}

fn setup_trace(log: &config::Log) -> AppResult<()> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log.level()))
        .map_err(|e| AppError::TraceError(e.to_string()))?;

    let file_layer = match log.file() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(file_layer)
        .with(filter)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| AppError::TraceError(e.to_string()))?;

    tracing::debug!("tracing initialized.");
    Ok(())
}

pub async fn run() -> AppResult<()> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;
    setup_trace(config.log())?;

    setup_workers(Arc::new(config.clone())).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trace_file_layer_creates_log_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("codecamp.log");
        let config = Config::default()
            .with_overrides(|key| match key {
                "LOG_FILE" => log_path.to_str().map(String::from),
                _ => None,
            })
            .unwrap();

        setup_trace(config.log()).unwrap();
        assert!(log_path.is_file());

        // the global subscriber can only be installed once
        let err = setup_trace(config.log()).unwrap_err();
        assert!(matches!(err, AppError::TraceError(_)));
    }
}
