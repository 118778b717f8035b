//! # Taskboard API Server
//!
//! JSON API for workspaces, list containers, tasks and comments.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Signup, login and token refresh (Argon2id + HS256 JWT)
//! - Ownership-checked CRUD over the workspace hierarchy
//! - A Postgres store, or an in-memory store for local runs
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) STORAGE_BACKEND=memory cargo run -p taskboard-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use taskboard_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{MemoryStore, PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let (store, pool) = open_store(&config).await?;

    let addr = config.bind_address();
    let state = AppState::new(store, config).context("Invalid JWT configuration")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Installs the global subscriber; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Opens the configured store, returning the pool when there is one to close
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    match config.storage {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .clone()
                .context("DATABASE_URL environment variable is required")?;

            let pool = create_pool(DatabaseConfig {
                max_connections: config.database.max_connections,
                ..DatabaseConfig::new(url)
            })
            .await
            .context("Failed to connect to database")?;

            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
            Ok((store, Some(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; all data is lost on shutdown");
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            Ok((store, None))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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

    tracing::info!("Shutdown signal received, draining connections...");
}
