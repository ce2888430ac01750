use crate::api;
use crate::config::Config;
use crate::db::{self, ConnectionPool, MigrationError};
use axum::Router;
use diesel::r2d2::PoolError;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::layer::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Shared handles every request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub connection_pool: ConnectionPool,
    pub config: Arc<Config>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(connection_pool: ConnectionPool, config: Config) -> Self {
        Self {
            connection_pool,
            config: Arc::new(config),
            http_client: reqwest::Client::new(),
        }
    }

    /// Returns a connection to the database from the connection pool.
    pub fn get_connection(&self) -> Result<db::Connection, PoolError> {
        self.connection_pool.get()
    }
}

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Failed to connect to database: {0}")]
    Connection(#[from] PoolError),
    #[error("Failed to run migrations: {0}")]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    StdIo(#[from] std::io::Error),
}

pub fn enable_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads configuration, builds the connection pool, and brings the database schema up to date.
pub fn initialize() -> Result<AppState, InitializationError> {
    let config = Config::load()?;

    let num_threads = tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_workers())
        .unwrap_or(1);
    let connection_pool = db::create_connection_pool(&config.database_url, num_threads as u32)?;
    db::run_migrations(&mut *connection_pool.get()?)?;

    tracing::info!("Using database {}", config.database_url);
    Ok(AppState::new(connection_pool, config))
}

/// The served application. Trailing slashes are trimmed before routing, so the
/// normalizing layer wraps the whole router rather than sitting inside it.
pub fn router(state: AppState) -> Router {
    let normalized = NormalizePathLayer::trim_trailing_slash().layer(api::routes(state));
    Router::new().fallback_service(normalized)
}

pub async fn run(state: AppState) -> Result<(), InitializationError> {
    let port = state.config.port;
    let app = router(state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Stopping server...");
}
