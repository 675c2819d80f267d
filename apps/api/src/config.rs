use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub host: String,
    pub port: u16,
    /// Origin allowed for browser calls. "*" enables a permissive CORS layer.
    pub allowed_origin: String,
    /// Max job-search calls per rate-limit window.
    pub search_rate_limit: u32,
    /// Max optimization calls per rate-limit window.
    pub optimize_rate_limit: u32,
    pub rate_limit_window_secs: u64,
    pub cache_ttl_secs: u64,
    /// Request-level ceiling on a single completion call, distinct from the
    /// HTTP client's transport timeout.
    pub completion_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8080)?,
            allowed_origin: std::env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            search_rate_limit: parse_env("SEARCH_RATE_LIMIT", 30)?,
            optimize_rate_limit: parse_env("OPTIMIZE_RATE_LIMIT", 10)?,
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 60)?,
            cache_ttl_secs: parse_env("CACHE_TTL_SECS", 300)?,
            completion_timeout_secs: parse_env("COMPLETION_TIMEOUT_SECS", 60)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
