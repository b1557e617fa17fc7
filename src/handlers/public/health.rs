use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Workspace API (Rust)",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "whoami": "/api/auth/whoami (authenticated)",
            "granted": "/api/auth/permissions (authenticated)",
            "catalog": "/api/permissions/catalog (requires ws:permission:read)",
            "check": "/api/permissions/check/:code (authenticated)",
        }
    }))
}

/// GET /health - datastore connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.permissions.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
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
