use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub mod health;

/// Liveness router. Any path other than `/healthz` is a 404.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
