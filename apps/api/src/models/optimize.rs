use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output of one optimization run. Held only in the caller's session; the
/// server keeps nothing once the response is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub id: Uuid,
    pub original_resume: String,
    pub suggested_text: String,
    pub generated_at: DateTime<Utc>,
}

impl OptimizationResult {
    pub fn new(original_resume: String, suggested_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_resume,
            suggested_text,
            generated_at: Utc::now(),
        }
    }
}

/// Body of `POST /api/optimize/resume`.
#[derive(Debug, Deserialize)]
pub struct OptimizeTextRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// Body of `POST /api/optimize/resume/url`.
#[derive(Debug, Deserialize)]
pub struct OptimizeUrlRequest {
    pub resume_text: String,
    pub job_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_round_trips_through_json() {
        let result = OptimizationResult::new(
            "Experienced backend engineer".to_string(),
            "POSITION_UPDATES:\n...".to_string(),
        );
        let json = serde_json::to_string(&result).unwrap();
        let recovered: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered.id, result.id);
        assert_eq!(recovered.original_resume, result.original_resume);
        assert_eq!(recovered.suggested_text, result.suggested_text);
    }
}
