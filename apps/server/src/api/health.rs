use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::main_lib::AppState;

#[derive(Debug, Serialize)]
pub struct MongoStatus {
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct WatcherStatus {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since boot.
    pub uptime: f64,
    pub mongo: MongoStatus,
    pub watchers: WatcherStatus,
}

/// Liveness: 200 while the database answers a ping, 503 otherwise.
async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let connected = match state.database.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health ping failed: {}", e);
            false
        }
    };
    let response = HealthResponse {
        status: if connected { "ok" } else { "degraded" },
        uptime: state.started_at.elapsed().as_secs_f64(),
        mongo: MongoStatus { connected },
        watchers: WatcherStatus {
            count: state.active_watchers().await,
        },
    };
    let code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/healthz", get(healthz))
}
