// handlers/public/service.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Incident API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "login": "POST /login (public)",
            "reference": "/offices, /user-roles, /incident-statuses, /device-types (read public, write admin)",
            "me": "GET /me (authenticated)",
            "incidents": "/incidents[/:id][/history] (authenticated, delete admin)",
            "devices": "/devices[/:id] (read authenticated, write admin)",
            "users": "/users[/:id] (admin)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
