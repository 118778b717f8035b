/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskboard_shared::auth::{
    credentials::CredentialStore, jwt::JwtError, middleware::jwt_auth_middleware,
    password::HashParams,
};
use taskboard_shared::store::Store;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is behind an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Repository backend
    pub store: Arc<dyn Store>,

    /// Signup, login and token verification
    pub credentials: Arc<CredentialStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Fails if the configured JWT secret is too weak.
    pub fn new(store: Arc<dyn Store>, config: Config) -> Result<Self, JwtError> {
        Self::with_hash_params(store, config, HashParams::default())
    }

    /// Creates state with explicit Argon2 cost parameters
    pub fn with_hash_params(
        store: Arc<dyn Store>,
        config: Config,
        hash_params: HashParams,
    ) -> Result<Self, JwtError> {
        let credentials =
            CredentialStore::new(store.clone(), config.jwt_settings()?).with_hash_params(hash_params);

        Ok(Self {
            store,
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                                   (public)
/// ├── POST /signup, /login, /refresh                 (public)
/// └── everything below requires a Bearer access token
///     ├── GET  /protected
///     ├── POST /workspaces, GET /workspaces
///     ├── GET|PUT|DELETE /workspaces/:id
///     ├── POST /containers, GET /containers/:id
///     ├── GET  /workspaces/:id/containers
///     ├── PUT|DELETE /workspaces/:id/containers/:container_id
///     ├── POST /tasks, GET /tasks/:id
///     ├── GET  /containers/:id/tasks
///     ├── PUT|DELETE /containers/:id/tasks/:task_id
///     ├── POST /comments, GET /comments/:id
///     ├── GET  /tasks/:id/comments
///     └── PUT|DELETE /tasks/:id/comments/:comment_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Compression
/// 4. Logging (tower-http TraceLayer)
/// 5. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Routes behind the JWT layer. Parameters in the same segment must
    // share a name, so every parent id is `:id`.
    let protected_routes = Router::new()
        .route("/protected", get(routes::auth::protected))
        .route(
            "/workspaces",
            post(routes::workspaces::create_workspace).get(routes::workspaces::list_workspaces),
        )
        .route(
            "/workspaces/:id",
            get(routes::workspaces::get_workspace)
                .put(routes::workspaces::update_workspace)
                .delete(routes::workspaces::delete_workspace),
        )
        .route("/containers", post(routes::containers::create_container))
        .route("/containers/:id", get(routes::containers::get_container))
        .route(
            "/workspaces/:id/containers",
            get(routes::containers::list_containers),
        )
        .route(
            "/workspaces/:id/containers/:container_id",
            put(routes::containers::update_container).delete(routes::containers::delete_container),
        )
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/:id", get(routes::tasks::get_task))
        .route(
            "/containers/:id/tasks",
            get(routes::tasks::list_tasks),
        )
        .route(
            "/containers/:id/tasks/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/comments", post(routes::comments::create_comment))
        .route("/comments/:id", get(routes::comments::get_comment))
        .route("/tasks/:id/comments", get(routes::comments::list_comments))
        .route(
            "/tasks/:id/comments/:comment_id",
            put(routes::comments::update_comment).delete(routes::comments::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.credentials.clone(),
            jwt_auth_middleware,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::store::MemoryStore;

    fn config(secret: &str) -> Config {
        Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(secret.to_string()),
            "STORAGE_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_app_state_shares_store() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config("test-secret-key-at-least-32-bytes-long"))
            .unwrap();

        assert!(Arc::ptr_eq(&state.store, &store));
        assert_eq!(state.store.backend(), "memory");
    }

    #[test]
    fn test_weak_secret_rejected() {
        let mut config = config("test-secret-key-at-least-32-bytes-long");
        config.jwt.secret = "short".to_string();

        let result = AppState::new(Arc::new(MemoryStore::new()), config);
        assert!(matches!(result, Err(JwtError::WeakSecret(5))));
    }
}
