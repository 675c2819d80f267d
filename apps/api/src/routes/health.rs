use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a status object with the service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "job_search": "active",
            "resume_optimizer": "active"
        }
    }))
}

/// GET /ping and GET /api/ping
pub async fn ping_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp()
    }))
}
