//! Per-page text extraction from PDF bytes.

use galena_core::{Error, Page, Result};
use pdf_extract::extract_text_from_mem_by_pages;
use std::ffi::OsStr;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

/// Returns `true` when the file name carries a `.pdf` extension.
///
/// The check is case-insensitive so `REPORT.PDF` is accepted.
#[must_use]
pub fn is_pdf_file_name(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"))
}

/// Reduces an upload file name to its base name.
///
/// Uploads occasionally arrive with client-side path prefixes; only the base
/// name is stored in chunk metadata and citations.
#[must_use]
pub fn document_name(file_name: &str) -> String {
    Path::new(file_name).file_name().map_or_else(
        || file_name.to_owned(),
        |base| base.to_string_lossy().into_owned(),
    )
}

/// Extracts per-page text from PDF bytes.
///
/// Page numbers are 1-based and count every physical page, so a blank page
/// still consumes its number. Pages whose extracted text is empty or
/// whitespace-only are skipped; the text of every returned page is trimmed.
///
/// # Errors
/// Returns [`Error::Extraction`] when the bytes cannot be parsed as a PDF.
pub fn extract_pages(file_name: &str, bytes: &[u8]) -> Result<Vec<Page>> {
    let file = document_name(file_name);
    let texts = page_texts(bytes)?;

    let mut pages = Vec::new();
    for (index, text) in texts.iter().enumerate() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        pages.push(Page::new(file.clone(), index as u32 + 1, trimmed));
    }

    debug!(
        "extracted {} non-empty pages of {} from {file}",
        pages.len(),
        texts.len()
    );
    Ok(pages)
}

/// Extracts the full text of a PDF as a single string.
///
/// Pages are trimmed, blank pages dropped, and the remainder joined with
/// blank lines. Used by the plain extraction operation, which carries no
/// page metadata.
///
/// # Errors
/// Returns [`Error::Extraction`] when the bytes cannot be parsed as a PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let texts = page_texts(bytes)?;
    let joined = texts
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    Ok(joined)
}

/// Runs the PDF parser and normalizes its failure modes.
///
/// `pdf-extract` panics on some malformed documents; a panic is caught and
/// reported as an ordinary extraction error so one bad upload cannot take
/// the process down.
fn page_texts(bytes: &[u8]) -> Result<Vec<String>> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| extract_text_from_mem_by_pages(bytes)));
    match outcome {
        Ok(Ok(texts)) => Ok(texts),
        Ok(Err(error)) => Err(Error::Extraction(format!("Failed to parse PDF: {error}"))),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|text| (*text).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_owned());
            warn!("PDF parser panicked: {message}");
            Err(Error::Extraction(format!(
                "PDF parser panicked: {message}"
            )))
        }
    }
}
