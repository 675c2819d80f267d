use serde::{Deserialize, Serialize};

/// A single job listing fetched from the external job board.
///
/// Immutable once fetched. `id` may be absent for ad-hoc URL lookups where
/// the board exposes no listing id; `source_url` is the identity then.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Populated by `fetch_by_url`; search results load descriptions lazily
    /// through the description endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_url: String,
    /// Relative listing age as shown on the card ("2 weeks ago").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSearchRequest {
    pub keywords: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    /// Zero-based result page; each page holds up to 25 listings.
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSearchResponse {
    pub jobs: Vec<JobPosting>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_posting_omits_absent_optionals() {
        let posting = JobPosting {
            id: None,
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: None,
            source_url: "https://www.linkedin.com/jobs/view/123/".to_string(),
            posted_at: None,
        };
        let json = serde_json::to_value(&posting).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("description").is_none());
        assert_eq!(json["company"], "Acme");
    }

    #[test]
    fn test_search_request_defaults_optionals() {
        let request: JobSearchRequest =
            serde_json::from_str(r#"{"keywords": "rust engineer"}"#).unwrap();
        assert_eq!(request.keywords, "rust engineer");
        assert!(request.location.is_none());
        assert!(request.page.is_none());
    }
}
