//! Axum route handlers for the job search API.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::client::{JobSearchQuery, PAGE_SIZE};
use crate::models::job::{JobSearchRequest, JobSearchResponse};
use crate::state::AppState;

/// POST /api/jobs/search
///
/// Returns one page of listings with basic card data; descriptions load
/// lazily through the description endpoint.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<JobSearchRequest>,
) -> Result<Json<JobSearchResponse>, AppError> {
    if request.keywords.trim().is_empty() {
        return Err(AppError::Validation(
            "Keywords are required for job search".to_string(),
        ));
    }

    state.limits.search.try_acquire()?;

    let query = JobSearchQuery {
        keywords: request.keywords.trim().to_string(),
        location: request.location.clone(),
        job_type: request.job_type.clone(),
        page: request.page.unwrap_or(0),
    };

    let cache_key = search_cache_key(&query);
    if let Some(cached) = state.search_cache.get(&cache_key) {
        info!("Cache hit for {cache_key}");
        return Ok(Json(cached));
    }

    let jobs = state.jobs.search(&query).await?;
    info!(
        "Found {} jobs for keywords='{}' page={}",
        jobs.len(),
        query.keywords,
        query.page
    );

    let response = JobSearchResponse {
        has_more: jobs.len() == PAGE_SIZE,
        jobs,
    };
    state.search_cache.insert(cache_key, response.clone());

    Ok(Json(response))
}

/// GET /api/jobs/:job_id/description
///
/// Returns the full description for a listing as plain text.
pub async fn handle_description(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<String, AppError> {
    state.limits.search.try_acquire()?;

    let cache_key = format!("desc:{job_id}");
    if let Some(cached) = state.description_cache.get(&cache_key) {
        return Ok(cached);
    }

    let description = state.jobs.fetch_description(&job_id).await?;
    info!(
        "Fetched description for job_id={job_id} (length={})",
        description.len()
    );
    state.description_cache.insert(cache_key, description.clone());

    Ok(description)
}

fn search_cache_key(query: &JobSearchQuery) -> String {
    format!(
        "search:{}:{}:{}:{}",
        query.keywords.to_lowercase(),
        query.location.as_deref().unwrap_or(""),
        query.job_type.as_deref().unwrap_or(""),
        query.page
    )
}
