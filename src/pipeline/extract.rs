//! PDF text extraction via pdfium.
//!
//! `pdfium-render` wraps a C++ library with thread-local state, so all work
//! happens inside `tokio::task::spawn_blocking`.
//!
//! The library is bound from `PDFIUM_LIB_PATH` when set (a path to the shared
//! library itself), otherwise from the system loader path.

use crate::error::StudyAidError;
use crate::output::ExtractedDocument;
use crate::pipeline::postprocess::clean_extracted_text;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extract the text of every page, in page order.
///
/// `fallback_title` is used when the PDF metadata carries no title.
pub async fn extract_text(
    pdf_path: &Path,
    password: Option<&str>,
    fallback_title: &str,
) -> Result<ExtractedDocument, StudyAidError> {
    let path = pdf_path.to_path_buf();
    let password = password.map(str::to_string);
    let fallback_title = fallback_title.to_string();

    tokio::task::spawn_blocking(move || {
        extract_text_blocking(&path, password.as_deref(), &fallback_title)
    })
    .await
    .map_err(|e| StudyAidError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn bind_pdfium() -> Result<Pdfium, StudyAidError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(lib) if !lib.is_empty() => Pdfium::bind_to_library(PathBuf::from(lib)),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| StudyAidError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn extract_text_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    fallback_title: &str,
) -> Result<ExtractedDocument, StudyAidError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let detail = format!("{:?}", e);
        if detail.to_lowercase().contains("password") {
            if password.is_some() {
                StudyAidError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                StudyAidError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            StudyAidError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail,
            }
        }
    })?;

    let title = document
        .metadata()
        .get(PdfDocumentMetadataTagType::Title)
        .map(|tag| tag.value().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let mut page_texts = Vec::with_capacity(page_count);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| StudyAidError::ExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        if text.trim().is_empty() {
            warn!("Page {} has no extractable text", idx + 1);
        } else {
            debug!("Page {}: {} chars", idx + 1, text.chars().count());
        }
        page_texts.push(text);
    }

    let text = clean_extracted_text(&page_texts.join("\n"));
    if text.is_empty() {
        return Err(StudyAidError::EmptyDocument {
            path: pdf_path.to_path_buf(),
            pages: page_count,
        });
    }

    Ok(ExtractedDocument {
        title,
        text,
        page_count,
    })
}
