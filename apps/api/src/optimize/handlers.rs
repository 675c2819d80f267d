//! Axum route handlers for the optimization API.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::docx;
use crate::errors::AppError;
use crate::models::optimize::{OptimizationResult, OptimizeTextRequest, OptimizeUrlRequest};
use crate::optimize::builder::JobInput;
use crate::optimize::resolver::ResumeInput;
use crate::optimize::service::run_optimization;
use crate::state::AppState;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const EXPORT_FILENAME: &str = "optimized_resume.docx";

/// POST /api/optimize/resume
///
/// Optimizes pasted resume text against a pasted job description.
pub async fn handle_optimize_text(
    State(state): State<AppState>,
    Json(request): Json<OptimizeTextRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    state.limits.optimize.try_acquire()?;

    let job_input = JobInput::from_parts(Some(request.job_description), None)?;
    let result =
        run_optimization(&state, ResumeInput::Text(request.resume_text), job_input).await?;
    Ok(Json(result))
}

/// POST /api/optimize/resume/url
///
/// Optimizes pasted resume text against a job posting URL.
pub async fn handle_optimize_url(
    State(state): State<AppState>,
    Json(request): Json<OptimizeUrlRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    state.limits.optimize.try_acquire()?;

    let job_input = JobInput::from_parts(None, Some(request.job_url))?;
    let result =
        run_optimization(&state, ResumeInput::Text(request.resume_text), job_input).await?;
    Ok(Json(result))
}

/// POST /api/optimize/resume/docx (multipart)
///
/// Fields: `resume` (file upload) and `job_description` or `job_url`.
pub async fn handle_optimize_docx(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OptimizationResult>, AppError> {
    state.limits.optimize.try_acquire()?;

    let mut form = read_multipart(multipart).await?;
    let (filename, bytes) = form
        .file
        .take()
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;

    info!("Optimizing uploaded resume '{filename}' ({} bytes)", bytes.len());

    let resume_input = ResumeInput::from_upload(&filename, bytes)?;
    let job_input = JobInput::from_parts(
        form.field("job_description"),
        form.field("job_url"),
    )?;

    let result = run_optimization(&state, resume_input, job_input).await?;
    Ok(Json(result))
}

/// POST /api/optimize/resume/export (multipart)
///
/// Fields: `resume` (the originally uploaded .docx) and `suggestions`.
/// Returns the merged document as a download.
pub async fn handle_export(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    state.limits.optimize.try_acquire()?;

    let mut form = read_multipart(multipart).await?;
    let (filename, bytes) = form.file.take().ok_or_else(|| {
        AppError::UnsupportedFormat(
            "Export requires the originally uploaded resume document".to_string(),
        )
    })?;

    let lowered = filename.to_lowercase();
    if !lowered.ends_with(".docx") && !lowered.ends_with(".doc") {
        return Err(AppError::UnsupportedFormat(
            "Only .doc and .docx resumes can be exported".to_string(),
        ));
    }

    let suggestions = form
        .field("suggestions")
        .ok_or_else(|| AppError::Validation("Suggestions text is required".to_string()))?;

    let merged = docx::merge_suggestions(&bytes, &suggestions)?;
    info!("Exported merged resume ({} bytes)", merged.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={EXPORT_FILENAME}"),
            ),
        ],
        merged,
    ))
}

/// Collected multipart form: at most one file part plus named text fields.
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    fields: Vec<(String, String)>,
}

impl UploadForm {
    fn field(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.trim().is_empty())
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file: None,
        fields: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "resume" {
            let filename = field.file_name().unwrap_or("resume").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
            form.file = Some((filename, bytes.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid form field '{name}': {e}")))?;
            form.fields.push((name, value));
        }
    }

    Ok(form)
}
