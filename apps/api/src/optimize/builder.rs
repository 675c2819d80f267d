//! Optimization Request Builder — combines the resolved resume and job
//! description into the instruction payload for the completion service.
//!
//! The contract is narrow: both texts are embedded verbatim, the output is
//! identical for identical inputs, and oversized inputs are rejected rather
//! than silently truncated.

use crate::errors::AppError;
use crate::llm_client::prompts::{OPTIMIZE_JD_ONLY_TEMPLATE, OPTIMIZE_PROMPT_TEMPLATE};

/// Ceiling on either input's size. Inputs beyond this would be truncated by
/// the model's context anyway; rejecting keeps the verbatim guarantee honest.
const MAX_INPUT_CHARS: usize = 60_000;

/// The job-description source for one optimization: exactly one of a direct
/// description or a posting URL.
#[derive(Debug, Clone, PartialEq)]
pub enum JobInput {
    Description(String),
    Url(String),
}

impl JobInput {
    /// Resolves the two optional request fields into exactly one source.
    /// Neither or both present is a validation error; the conflict is never
    /// silently resolved by picking one.
    pub fn from_parts(
        job_description: Option<String>,
        job_url: Option<String>,
    ) -> Result<Self, AppError> {
        let description = job_description.filter(|d| !d.trim().is_empty());
        let url = job_url.filter(|u| !u.trim().is_empty());

        match (description, url) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Provide either a job description or a job URL, not both".to_string(),
            )),
            (Some(d), None) => Ok(JobInput::Description(d)),
            (None, Some(u)) => Ok(JobInput::Url(u.trim().to_string())),
            (None, None) => Err(AppError::Validation(
                "Either a job description or a job URL is required".to_string(),
            )),
        }
    }
}

/// A validated prompt payload. `job_description` is always non-empty;
/// `resume_text` may be empty only for the advice-only template.
#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub resume_text: String,
    pub job_description: String,
}

impl OptimizationRequest {
    pub fn new(resume_text: String, job_description: String) -> Result<Self, AppError> {
        if job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "Job description cannot be empty".to_string(),
            ));
        }
        if resume_text.len() > MAX_INPUT_CHARS {
            return Err(AppError::Validation(format!(
                "Resume text exceeds the {MAX_INPUT_CHARS} character limit"
            )));
        }
        if job_description.len() > MAX_INPUT_CHARS {
            return Err(AppError::Validation(format!(
                "Job description exceeds the {MAX_INPUT_CHARS} character limit"
            )));
        }
        Ok(Self {
            resume_text,
            job_description,
        })
    }
}

/// Fills the instruction template. Selects the resume-aware template when
/// resume text is present, the advice-only template otherwise.
pub fn build_prompt(request: &OptimizationRequest) -> String {
    if request.resume_text.trim().is_empty() {
        OPTIMIZE_JD_ONLY_TEMPLATE.replace("{job_description}", &request.job_description)
    } else {
        OPTIMIZE_PROMPT_TEMPLATE
            .replace("{resume_text}", &request.resume_text)
            .replace("{job_description}", &request.job_description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_texts_verbatim() {
        let request = OptimizationRequest::new(
            "Experienced backend engineer with eight years of Rust".to_string(),
            "Seeking a backend engineer with Go experience".to_string(),
        )
        .unwrap();
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Experienced backend engineer with eight years of Rust"));
        assert!(prompt.contains("Seeking a backend engineer with Go experience"));
    }

    #[test]
    fn test_prompt_is_stable_for_identical_inputs() {
        let request =
            OptimizationRequest::new("resume".to_string(), "description".to_string()).unwrap();
        assert_eq!(build_prompt(&request), build_prompt(&request));
    }

    #[test]
    fn test_empty_resume_selects_advice_template() {
        let request =
            OptimizationRequest::new(String::new(), "description".to_string()).unwrap();
        let prompt = build_prompt(&request);
        assert!(prompt.contains("optimization advice"));
        assert!(!prompt.contains("POSITION_UPDATES"));
    }

    #[test]
    fn test_empty_job_description_is_rejected() {
        let result = OptimizationRequest::new("resume".to_string(), "  ".to_string());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_oversized_input_is_rejected_not_truncated() {
        let huge = "x".repeat(MAX_INPUT_CHARS + 1);
        let result = OptimizationRequest::new(huge, "description".to_string());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_job_input_requires_exactly_one_source() {
        assert!(matches!(
            JobInput::from_parts(None, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            JobInput::from_parts(
                Some("desc".to_string()),
                Some("https://example.com".to_string())
            ),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_job_input_blank_fields_count_as_absent() {
        let input = JobInput::from_parts(
            Some("  ".to_string()),
            Some("https://www.linkedin.com/jobs/view/123/".to_string()),
        )
        .unwrap();
        assert_eq!(
            input,
            JobInput::Url("https://www.linkedin.com/jobs/view/123/".to_string())
        );
    }

    #[test]
    fn test_job_input_description_passthrough() {
        let input =
            JobInput::from_parts(Some("We need a Go engineer".to_string()), None).unwrap();
        assert_eq!(input, JobInput::Description("We need a Go engineer".to_string()));
    }
}
