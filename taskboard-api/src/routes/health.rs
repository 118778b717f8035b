/// `GET /health`, unauthenticated
///
/// Always answers 200 so a load balancer can tell "process up" from "store
/// down"; the latter shows as `"status": "degraded"`.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected", "backend": "postgres" }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub database: StoreStatus,

    /// "postgres" or "memory"
    pub backend: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match state.store.ping().await {
        Ok(()) => (ServiceStatus::Healthy, StoreStatus::Connected),
        Err(e) => {
            warn!(error = %e, backend = state.store.backend(), "Store ping failed");
            (ServiceStatus::Degraded, StoreStatus::Disconnected)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        backend: state.store.backend().to_string(),
    })
}
