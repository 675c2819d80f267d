//! Job Source Adapter — resolves job descriptions from the external board.
//!
//! Pure I/O adapter: request shaping and response normalization only. HTML
//! extraction lives in sync helpers so `scraper::Html` (not `Send`) never
//! crosses an await point, and so parsing is testable against fixtures.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::errors::AppError;
use crate::models::job::JobPosting;

const SEARCH_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
const JOB_VIEW_URL: &str = "https://www.linkedin.com/jobs/view";
/// Listings per result page; the upstream paginates with a start offset.
pub const PAGE_SIZE: usize = 25;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum JobSourceError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    NotFound(String),

    #[error("job board is rate limiting requests")]
    RateLimited,

    #[error("job board unavailable: {0}")]
    Unavailable(String),
}

impl From<JobSourceError> for AppError {
    fn from(e: JobSourceError) -> Self {
        match e {
            JobSourceError::InvalidQuery(msg) => AppError::Validation(msg),
            JobSourceError::NotFound(msg) => AppError::NotFound(msg),
            JobSourceError::RateLimited => AppError::RateLimited {
                retry_after_secs: 60,
            },
            JobSourceError::Unavailable(msg) => AppError::UpstreamUnavailable(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobSearchQuery {
    pub keywords: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub page: u32,
}

/// Opaque job-lookup service. Injected as `Arc<dyn JobSource>` so handlers
/// and the optimization pipeline can be exercised against a fake.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// One finite batch of listings; callers paginate by re-invoking with the
    /// next page.
    async fn search(&self, query: &JobSearchQuery) -> Result<Vec<JobPosting>, JobSourceError>;

    /// Fetches a single posting, description included.
    async fn fetch_by_url(&self, url: &str) -> Result<JobPosting, JobSourceError>;

    /// Fetches the full description for a listing id.
    async fn fetch_description(&self, job_id: &str) -> Result<String, JobSourceError>;
}

/// Adapter over LinkedIn's guest job-search surface.
pub struct LinkedInClient {
    client: reqwest::Client,
}

impl LinkedInClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(5))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, JobSourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| JobSourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(JobSourceError::RateLimited);
        }
        if status.as_u16() == 404 || status.as_u16() == 410 {
            return Err(JobSourceError::NotFound(format!(
                "posting no longer exists ({url})"
            )));
        }
        if !status.is_success() {
            return Err(JobSourceError::Unavailable(format!("HTTP {status} for {url}")));
        }

        response
            .text()
            .await
            .map_err(|e| JobSourceError::Unavailable(e.to_string()))
    }
}

impl Default for LinkedInClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for LinkedInClient {
    async fn search(&self, query: &JobSearchQuery) -> Result<Vec<JobPosting>, JobSourceError> {
        if query.keywords.trim().is_empty() {
            return Err(JobSourceError::InvalidQuery(
                "Keywords are required for job search".to_string(),
            ));
        }

        let url = build_search_url(query);
        debug!(url = %url, "Searching job board");

        let html = self.fetch_html(&url).await?;
        let jobs = parse_search_cards(&html);
        debug!("Parsed {} job cards for '{}'", jobs.len(), query.keywords);
        Ok(jobs)
    }

    async fn fetch_by_url(&self, url: &str) -> Result<JobPosting, JobSourceError> {
        let job_id = parse_job_url(url)?;
        let html = self.fetch_html(url).await?;

        match parse_job_page(&html, url, &job_id) {
            Some(posting) => Ok(posting),
            None => Err(JobSourceError::NotFound(format!(
                "Job posting {job_id} is no longer available"
            ))),
        }
    }

    async fn fetch_description(&self, job_id: &str) -> Result<String, JobSourceError> {
        if job_id.is_empty() || !job_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(JobSourceError::InvalidQuery(format!(
                "'{job_id}' is not a valid job id"
            )));
        }

        let url = format!("{JOB_VIEW_URL}/{job_id}/");
        let html = self.fetch_html(&url).await?;

        match parse_description(&html) {
            Some(description) => Ok(description),
            None => {
                warn!("No description found for job {job_id}");
                Err(JobSourceError::NotFound(
                    "Job description not found".to_string(),
                ))
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// URL shaping and validation
// ────────────────────────────────────────────────────────────────────────────

fn build_search_url(query: &JobSearchQuery) -> String {
    let mut url = format!(
        "{SEARCH_URL}?keywords={}",
        urlencoding::encode(query.keywords.trim())
    );
    if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
        url.push_str(&format!("&location={}", urlencoding::encode(location.trim())));
    }
    let start = query.page as usize * PAGE_SIZE;
    if start > 0 {
        url.push_str(&format!("&start={start}"));
    }
    if let Some(job_type) = &query.job_type {
        if job_type.eq_ignore_ascii_case("remote") {
            url.push_str("&f_WT=2");
        }
    }
    url
}

/// Validates a job-posting URL shape and extracts the numeric listing id.
pub fn parse_job_url(raw: &str) -> Result<String, JobSourceError> {
    let url = Url::parse(raw)
        .map_err(|_| JobSourceError::InvalidQuery(format!("'{raw}' is not a valid URL")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(JobSourceError::InvalidQuery(
            "Job URL must use http or https".to_string(),
        ));
    }

    let host = url.host_str().unwrap_or_default();
    if !host.ends_with("linkedin.com") || !url.path().contains("/jobs/") {
        return Err(JobSourceError::InvalidQuery(
            "Not a recognized job posting URL".to_string(),
        ));
    }

    let job_id = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string();

    if job_id.is_empty() || !job_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(JobSourceError::InvalidQuery(
            "Job URL does not contain a listing id".to_string(),
        ));
    }

    Ok(job_id)
}

// ────────────────────────────────────────────────────────────────────────────
// HTML extraction
// ────────────────────────────────────────────────────────────────────────────

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Collapses whitespace runs and strips leading/trailing space.
fn clean_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts listings from a search result page. Cards missing a title or
/// company are skipped entirely; a half-formed entry is never returned.
fn parse_search_cards(html: &str) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let card_selector = selector("div.base-search-card__info");
    let title_selector = selector("h3");
    let company_selector = selector("a.hidden-nested-link");
    let location_selector = selector("span.job-search-card__location");
    let posted_selector = selector("time.job-search-card__listdate");

    let mut jobs = Vec::new();
    for card in document.select(&card_selector) {
        let title = card
            .select(&title_selector)
            .next()
            .map(clean_text)
            .unwrap_or_default();
        let company = card
            .select(&company_selector)
            .next()
            .map(clean_text)
            .unwrap_or_default();

        if title.is_empty() || company.is_empty() {
            continue;
        }

        let Some(job_id) = card
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.value().attr("data-entity-urn"))
            .and_then(|urn| urn.rsplit(':').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let location = card
            .select(&location_selector)
            .next()
            .map(clean_text)
            .unwrap_or_default();
        let posted_at = card
            .select(&posted_selector)
            .next()
            .map(clean_text)
            .filter(|t| !t.is_empty());

        jobs.push(JobPosting {
            source_url: format!("{JOB_VIEW_URL}/{job_id}/"),
            id: Some(job_id),
            title,
            company,
            location,
            description: None,
            posted_at,
        });
    }
    jobs
}

/// Extracts a full posting from a job view page. Returns `None` when the
/// page no longer carries a title and company (posting removed).
fn parse_job_page(html: &str, source_url: &str, job_id: &str) -> Option<JobPosting> {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("h1.top-card-layout__title"))
        .next()
        .map(clean_text)
        .filter(|t| !t.is_empty())?;
    let company = document
        .select(&selector("a.topcard__org-name-link"))
        .next()
        .map(clean_text)
        .filter(|c| !c.is_empty())?;
    let location = document
        .select(&selector("span.topcard__flavor--bullet"))
        .next()
        .map(clean_text)
        .unwrap_or_default();

    Some(JobPosting {
        id: Some(job_id.to_string()),
        title,
        company,
        location,
        description: extract_description(&document),
        source_url: source_url.to_string(),
        posted_at: None,
    })
}

/// Extracts the rich description block as plain text, one line per
/// paragraph-ish node.
fn parse_description(html: &str) -> Option<String> {
    extract_description(&Html::parse_document(html))
}

fn extract_description(document: &Html) -> Option<String> {
    let description_selector = selector("div.description__text");

    let block = document.select(&description_selector).next()?;
    let mut lines: Vec<String> = Vec::new();
    for chunk in block.text() {
        let line = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    let text = lines.join("\n");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_FIXTURE: &str = r##"
        <ul>
          <li>
            <div data-entity-urn="urn:li:jobPosting:3912345678">
              <div class="base-search-card__info">
                <h3>Senior Backend Engineer</h3>
                <h4><a class="hidden-nested-link" href="#">Acme Corp</a></h4>
                <span class="job-search-card__location">Berlin, Germany</span>
                <time class="job-search-card__listdate">2 weeks ago</time>
              </div>
            </div>
          </li>
          <li>
            <div data-entity-urn="urn:li:jobPosting:3900000001">
              <div class="base-search-card__info">
                <h3></h3>
                <h4><a class="hidden-nested-link" href="#">Ghost Inc</a></h4>
              </div>
            </div>
          </li>
          <li>
            <div data-entity-urn="urn:li:jobPosting:3900000002">
              <div class="base-search-card__info">
                <h3>Platform Engineer</h3>
                <h4><a class="hidden-nested-link" href="#">  Globex
                    GmbH </a></h4>
              </div>
            </div>
          </li>
        </ul>
    "##;

    #[test]
    fn test_parse_search_cards_extracts_listings() {
        let jobs = parse_search_cards(SEARCH_FIXTURE);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Senior Backend Engineer");
        assert_eq!(jobs[0].company, "Acme Corp");
        assert_eq!(jobs[0].location, "Berlin, Germany");
        assert_eq!(jobs[0].id.as_deref(), Some("3912345678"));
        assert_eq!(jobs[0].posted_at.as_deref(), Some("2 weeks ago"));
        assert_eq!(
            jobs[0].source_url,
            "https://www.linkedin.com/jobs/view/3912345678/"
        );
    }

    #[test]
    fn test_parse_search_cards_skips_cards_without_title() {
        let jobs = parse_search_cards(SEARCH_FIXTURE);
        assert!(jobs.iter().all(|j| !j.title.is_empty() && !j.company.is_empty()));
    }

    #[test]
    fn test_parse_search_cards_normalizes_whitespace() {
        let jobs = parse_search_cards(SEARCH_FIXTURE);
        assert_eq!(jobs[1].company, "Globex GmbH");
    }

    #[test]
    fn test_parse_search_cards_empty_page_is_empty_batch() {
        assert!(parse_search_cards("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_parse_description_joins_paragraphs() {
        let html = r#"
            <div class="description__text description__text--rich">
              <p>We are seeking a backend engineer with Go experience.</p>
              <ul><li>Build services</li><li>Own reliability</li></ul>
            </div>
        "#;
        let description = parse_description(html).unwrap();
        assert!(description.contains("backend engineer with Go experience"));
        assert!(description.contains("Build services"));
    }

    #[test]
    fn test_parse_description_missing_block_is_none() {
        assert!(parse_description("<div><p>nothing here</p></div>").is_none());
    }

    #[test]
    fn test_parse_job_url_accepts_canonical_shape() {
        let id = parse_job_url("https://www.linkedin.com/jobs/view/3912345678/").unwrap();
        assert_eq!(id, "3912345678");
    }

    #[test]
    fn test_parse_job_url_strips_query_params() {
        let id =
            parse_job_url("https://www.linkedin.com/jobs/view/3912345678?refId=abc").unwrap();
        assert_eq!(id, "3912345678");
    }

    #[test]
    fn test_parse_job_url_rejects_other_hosts() {
        assert!(parse_job_url("https://example.com/jobs/view/123/").is_err());
    }

    #[test]
    fn test_parse_job_url_rejects_non_numeric_id() {
        assert!(parse_job_url("https://www.linkedin.com/jobs/view/senior-engineer/").is_err());
    }

    #[test]
    fn test_parse_job_url_rejects_garbage() {
        assert!(parse_job_url("not a url").is_err());
        assert!(parse_job_url("ftp://www.linkedin.com/jobs/view/123/").is_err());
    }

    #[test]
    fn test_build_search_url_encodes_and_paginates() {
        let url = build_search_url(&JobSearchQuery {
            keywords: "rust engineer".to_string(),
            location: Some("New York".to_string()),
            job_type: Some("remote".to_string()),
            page: 2,
        });
        assert!(url.contains("keywords=rust%20engineer"));
        assert!(url.contains("location=New%20York"));
        assert!(url.contains("start=50"));
        assert!(url.ends_with("&f_WT=2"));
    }

    #[test]
    fn test_build_search_url_first_page_has_no_offset() {
        let url = build_search_url(&JobSearchQuery {
            keywords: "rust".to_string(),
            location: None,
            job_type: None,
            page: 0,
        });
        assert!(!url.contains("start="));
        assert!(!url.contains("location="));
    }
}
