mod cache;
mod clock;
mod config;
mod docx;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod optimize;
mod ratelimit;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::TtlCache;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::jobs::client::LinkedInClient;
use crate::llm_client::LlmClient;
use crate::ratelimit::RateLimits;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (errors out on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_name, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Completion client
    let llm = LlmClient::new(config.gemini_api_key.clone());
    info!("Completion client initialized (model: {})", llm_client::MODEL);

    // Job source adapter
    let job_source = Arc::new(LinkedInClient::new());
    info!("Job source client initialized");

    // Process-wide services: rate limiters and read-through caches share one
    // clock, injected so tests can substitute a deterministic one.
    let clock = Arc::new(SystemClock);
    let limits = Arc::new(RateLimits::new(
        config.search_rate_limit,
        config.optimize_rate_limit,
        Duration::from_secs(config.rate_limit_window_secs),
        clock.clone(),
    ));
    let cache_ttl = Duration::from_secs(config.cache_ttl_secs);
    let search_cache = Arc::new(TtlCache::new(cache_ttl, clock.clone()));
    let description_cache = Arc::new(TtlCache::new(cache_ttl, clock));
    info!(
        "Rate limits: search={}/window, optimize={}/window, window={}s, cache TTL {}s",
        config.search_rate_limit,
        config.optimize_rate_limit,
        config.rate_limit_window_secs,
        config.cache_ttl_secs
    );

    // Build app state
    let state = AppState {
        jobs: job_source,
        llm,
        search_cache,
        description_cache,
        limits,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS layer from configuration: a single allowed origin for browser calls,
/// or permissive when configured with "*".
fn build_cors(config: &Config) -> Result<CorsLayer> {
    if config.allowed_origin == "*" {
        return Ok(CorsLayer::permissive());
    }
    let origin: HeaderValue = config
        .allowed_origin
        .parse()
        .with_context(|| format!("Invalid ALLOWED_ORIGIN '{}'", config.allowed_origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}
