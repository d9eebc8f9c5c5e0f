use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
    database_latency_ms: u128,
}

/// `GET /health` — liveness check; never touches the database.
async fn liveness() -> impl IntoResponse {
    Json(LivenessResponse { status: "ok" })
}

/// `GET /api/v1/health` — health check including a database round-trip.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (connected, latency) = crate::db::ping(&state.db).await;

    let (status, code, database) = if connected {
        ("ok", StatusCode::OK, "connected")
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE, "disconnected")
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
        database_latency_ms: latency,
    };

    (code, Json(response))
}

/// Routes mounted at the root.
pub fn root_router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}

/// Routes mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
