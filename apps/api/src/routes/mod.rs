pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::optimize::handlers as optimize;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ping", get(health::ping_handler))
        .route("/api/ping", get(health::ping_handler))
        // Jobs API
        .route("/api/jobs/search", post(jobs::handle_search))
        .route("/api/jobs/:job_id/description", get(jobs::handle_description))
        // Optimization API
        .route("/api/optimize/resume", post(optimize::handle_optimize_text))
        .route("/api/optimize/resume/url", post(optimize::handle_optimize_url))
        .route("/api/optimize/resume/docx", post(optimize::handle_optimize_docx))
        .route("/api/optimize/resume/export", post(optimize::handle_export))
        .with_state(state)
}
