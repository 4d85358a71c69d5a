//! Context assembly and citation formatting for the query pipeline.

use galena_core::{RetrievedDocument, SourceCitation};
use std::collections::HashSet;

/// Notice streamed when a query arrives before any document was indexed.
pub const EMPTY_INDEX_STREAM_NOTICE: &str =
    "I don't have any documents indexed yet. Please upload a PDF first to get started.";

/// Buffered answer returned when a query arrives before any document was indexed.
pub const EMPTY_INDEX_ANSWER: &str =
    "I don't have any documents indexed yet. Please upload a PDF first.";

/// Marker that separates streamed answer text from the citation payload.
pub const SOURCES_MARKER: &str = "\n\n[SOURCES]";

/// Formats retrieved passages into the labelled context block of the prompt.
///
/// Each passage gets a 1-based source label carrying its file name and page
/// number; passages are separated by blank lines.
#[must_use]
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(position, document)| {
            format!(
                "[Source {}: {}, Page {}]\n{}",
                position + 1,
                document.file,
                document.page,
                document.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Collects citations from retrieved passages, deduplicating (file, page)
/// pairs while preserving first-seen order.
#[must_use]
pub fn extract_citations(documents: &[RetrievedDocument]) -> Vec<SourceCitation> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter(|document| seen.insert((document.file.clone(), document.page)))
        .map(|document| SourceCitation::new(document.file.clone(), document.page))
        .collect()
}

/// Renders the final stream fragment: the sources marker followed by the
/// citation list as a JSON array.
#[must_use]
pub fn citation_marker(citations: &[SourceCitation]) -> String {
    let payload = serde_json::to_string(citations).unwrap_or_else(|_error| "[]".to_owned());
    format!("{SOURCES_MARKER}{payload}")
}
