use std::sync::Arc;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::jobs::client::JobSource;
use crate::llm_client::LlmClient;
use crate::models::job::JobSearchResponse;
use crate::ratelimit::RateLimits;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every service is constructed once at startup; handlers only
/// hold cheap clones.
#[derive(Clone)]
pub struct AppState {
    /// Opaque job-lookup service. Trait object so tests can substitute a fake.
    pub jobs: Arc<dyn JobSource>,
    pub llm: LlmClient,
    /// Read-through cache for search pages, keyed by (keywords, location,
    /// job_type, page).
    pub search_cache: Arc<TtlCache<JobSearchResponse>>,
    /// Read-through cache for descriptions, keyed by listing id or URL.
    pub description_cache: Arc<TtlCache<String>>,
    /// Fixed-window counters, one per endpoint group.
    pub limits: Arc<RateLimits>,
    pub config: Config,
}
