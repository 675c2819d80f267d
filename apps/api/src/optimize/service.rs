//! Optimization pipeline — orchestrates one request end to end.
//!
//! Flow: resolve resume input + job description (concurrently) →
//!       build prompt → single completion call under the request-level
//!       timeout → wrap the suggestion into an `OptimizationResult`.
//!
//! A failure at any stage terminates the request; there is no checkpointing
//! and no partial result. Retrying is a fresh user-initiated request.

use std::time::Duration;

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::OPTIMIZE_SYSTEM;
use crate::models::optimize::OptimizationResult;
use crate::optimize::builder::{build_prompt, JobInput, OptimizationRequest};
use crate::optimize::resolver::{resolve, ResumeInput};
use crate::state::AppState;

pub async fn run_optimization(
    state: &AppState,
    resume_input: ResumeInput,
    job_input: JobInput,
) -> Result<OptimizationResult, AppError> {
    // Resume resolution and the job-description lookup have no data
    // dependency on each other; both must finish before the prompt is built.
    let (resume, job_description) = tokio::try_join!(
        async { resolve(resume_input) },
        resolve_job_description(state, job_input),
    )?;
    info!(
        "Inputs resolved ({:?} resume, original retained: {})",
        resume.format,
        resume.original.is_some()
    );

    let request = OptimizationRequest::new(resume.raw_text, job_description)?;
    let prompt = build_prompt(&request);
    info!(
        "Prompt built (resume: {} chars, job description: {} chars)",
        request.resume_text.len(),
        request.job_description.len()
    );

    // Request-level ceiling, distinct from the HTTP client's transport
    // timeout: the handler must fail with Timeout instead of hanging.
    let timeout = Duration::from_secs(state.config.completion_timeout_secs);
    let suggested_text =
        tokio::time::timeout(timeout, state.llm.complete(&prompt, OPTIMIZE_SYSTEM))
            .await
            .map_err(|_| {
                AppError::Timeout("completion call exceeded the request budget".to_string())
            })?
            .map_err(AppError::from)?;

    info!("Completion received ({} chars)", suggested_text.len());

    Ok(OptimizationResult::new(request.resume_text, suggested_text))
}

/// Resolves the job-description text, fetching the posting when a URL was
/// supplied. URL lookups go through the read-through cache.
async fn resolve_job_description(
    state: &AppState,
    job_input: JobInput,
) -> Result<String, AppError> {
    match job_input {
        JobInput::Description(description) => Ok(description),
        JobInput::Url(url) => {
            let cache_key = format!("url:{url}");
            if let Some(cached) = state.description_cache.get(&cache_key) {
                info!("Cache hit for {cache_key}");
                return Ok(cached);
            }

            let posting = state.jobs.fetch_by_url(&url).await?;
            let description = posting
                .description
                .ok_or_else(|| AppError::NotFound("Job posting has no description".to_string()))?;

            state
                .description_cache
                .insert(cache_key, description.clone());
            Ok(description)
        }
    }
}
