//! Resume Input Resolver — normalizes every accepted input shape into one
//! plain-text representation.
//!
//! Purely local transformation: no network calls, deterministic, idempotent.

use crate::docx;
use crate::errors::AppError;

/// The resume input shapes the API accepts, one resolver arm per tag.
#[derive(Debug)]
pub enum ResumeInput {
    /// Raw pasted text.
    Text(String),
    /// Uploaded plain-text file.
    PlainFile(Vec<u8>),
    /// Uploaded rich document; the binary is retained for export.
    Docx(Vec<u8>),
    /// Uploaded PDF; text is extracted, merge-back is not supported.
    Pdf(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Plain,
    RichDocument,
}

/// A resolved resume. `raw_text` is always populated; `original` is kept
/// only for rich documents so the exporter can merge back into it later.
#[derive(Debug)]
pub struct ResumeDocument {
    pub raw_text: String,
    pub format: ResumeFormat,
    pub original: Option<Vec<u8>>,
}

impl ResumeInput {
    /// Classifies an uploaded file by extension.
    pub fn from_upload(filename: &str, bytes: Vec<u8>) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        let lowered = filename.to_lowercase();
        if lowered.ends_with(".docx") || lowered.ends_with(".doc") {
            Ok(ResumeInput::Docx(bytes))
        } else if lowered.ends_with(".pdf") {
            Ok(ResumeInput::Pdf(bytes))
        } else if lowered.ends_with(".txt") || lowered.ends_with(".text") || lowered.ends_with(".md")
        {
            Ok(ResumeInput::PlainFile(bytes))
        } else {
            Err(AppError::UnsupportedFormat(format!(
                "'{filename}' is not a supported resume format (.docx, .pdf, or plain text)"
            )))
        }
    }
}

/// Resolves any input shape into a `ResumeDocument`.
pub fn resolve(input: ResumeInput) -> Result<ResumeDocument, AppError> {
    match input {
        ResumeInput::Text(text) => plain(text),
        ResumeInput::PlainFile(bytes) => {
            let text = String::from_utf8(bytes).map_err(|_| {
                AppError::UnsupportedFormat(
                    "Plain-text resume file is not valid UTF-8".to_string(),
                )
            })?;
            plain(text)
        }
        ResumeInput::Docx(bytes) => {
            let raw_text = docx::extract_text(&bytes)?;
            if raw_text.trim().is_empty() {
                return Err(AppError::Validation(
                    "No text content found in document".to_string(),
                ));
            }
            Ok(ResumeDocument {
                raw_text,
                format: ResumeFormat::RichDocument,
                original: Some(bytes),
            })
        }
        ResumeInput::Pdf(bytes) => {
            let raw_text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
                AppError::UnsupportedFormat(format!("Could not read PDF: {e}"))
            })?;
            if raw_text.trim().is_empty() {
                return Err(AppError::Validation(
                    "No text content found in document".to_string(),
                ));
            }
            Ok(ResumeDocument {
                raw_text: raw_text.trim().to_string(),
                format: ResumeFormat::Plain,
                original: None,
            })
        }
    }
}

fn plain(text: String) -> Result<ResumeDocument, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text cannot be empty".to_string(),
        ));
    }
    Ok(ResumeDocument {
        raw_text: text,
        format: ResumeFormat::Plain,
        original: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_text_is_identity() {
        let doc = resolve(ResumeInput::Text("Experienced backend engineer".to_string())).unwrap();
        assert_eq!(doc.raw_text, "Experienced backend engineer");
        assert_eq!(doc.format, ResumeFormat::Plain);
        assert!(doc.original.is_none());
    }

    #[test]
    fn test_resolve_is_idempotent_for_plain_text() {
        let first = resolve(ResumeInput::Text("Some resume".to_string())).unwrap();
        let second = resolve(ResumeInput::Text(first.raw_text.clone())).unwrap();
        assert_eq!(first.raw_text, second.raw_text);
    }

    #[test]
    fn test_resolve_rejects_empty_text() {
        let result = resolve(ResumeInput::Text("   \n ".to_string()));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_resolve_plain_file_decodes_utf8() {
        let doc = resolve(ResumeInput::PlainFile(b"line one\nline two".to_vec())).unwrap();
        assert_eq!(doc.raw_text, "line one\nline two");
    }

    #[test]
    fn test_resolve_plain_file_rejects_invalid_utf8() {
        let result = resolve(ResumeInput::PlainFile(vec![0xff, 0xfe, 0x00]));
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_resolve_docx_retains_original_binary() {
        let bytes = {
            use docx_rust::document::Paragraph;
            use docx_rust::Docx;
            let mut doc = Docx::default();
            doc.document
                .push(Paragraph::default().push_text("Experienced backend engineer"));
            doc.write(std::io::Cursor::new(Vec::new()))
                .unwrap()
                .into_inner()
        };
        let doc = resolve(ResumeInput::Docx(bytes.clone())).unwrap();
        assert_eq!(doc.raw_text, "Experienced backend engineer");
        assert_eq!(doc.format, ResumeFormat::RichDocument);
        assert_eq!(doc.original, Some(bytes));
    }

    #[test]
    fn test_resolve_docx_rejects_corrupt_binary() {
        let result = resolve(ResumeInput::Docx(b"not a document".to_vec()));
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_upload_classifies_by_extension() {
        assert!(matches!(
            ResumeInput::from_upload("resume.docx", vec![1]).unwrap(),
            ResumeInput::Docx(_)
        ));
        assert!(matches!(
            ResumeInput::from_upload("Resume.PDF", vec![1]).unwrap(),
            ResumeInput::Pdf(_)
        ));
        assert!(matches!(
            ResumeInput::from_upload("resume.txt", vec![1]).unwrap(),
            ResumeInput::PlainFile(_)
        ));
    }

    #[test]
    fn test_from_upload_rejects_unknown_extension() {
        let result = ResumeInput::from_upload("resume.xlsx", vec![1]);
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_upload_rejects_empty_file() {
        let result = ResumeInput::from_upload("resume.docx", vec![]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
