//! Resume upload and plain-text extraction.
//!
//! Extraction is deliberately thin plumbing: given a stored file and its
//! declared format, produce plain text for the question generator. Anything
//! that goes wrong here is a Validation error to the caller.

pub mod docx;
pub mod handlers;

use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// Accepted resume file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    Doc,
}

impl ResumeFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(ResumeFormat::Pdf),
            "docx" => Some(ResumeFormat::Docx),
            "doc" => Some(ResumeFormat::Doc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Docx => "docx",
            ResumeFormat::Doc => "doc",
        }
    }
}

/// Extracts plain text from a stored resume file.
///
/// Runs on the blocking pool — PDF and DOCX parsing are synchronous and can
/// chew CPU on large files.
pub async fn extract_text(path: &Path, format: ResumeFormat) -> Result<String, AppError> {
    let path: PathBuf = path.to_path_buf();

    let text = tokio::task::spawn_blocking(move || match format {
        ResumeFormat::Pdf => pdf_extract::extract_text(&path)
            .map_err(|e| AppError::Validation(format!("Could not read PDF resume: {e}"))),
        // Legacy .doc files are attempted with the DOCX reader; genuinely
        // binary .doc content fails extraction and surfaces as Validation.
        ResumeFormat::Docx | ResumeFormat::Doc => docx::extract_docx_text(&path)
            .map_err(|e| AppError::Validation(format!("Could not read DOCX resume: {e}"))),
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Resume extraction task failed: {e}")))??;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation(
            "Resume file contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}
