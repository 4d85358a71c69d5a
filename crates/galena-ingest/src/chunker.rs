//! Sliding-window chunking of page text.

use galena_core::{Chunk, ChunkingConfig, Error, Page, Result};
use sha2::{Digest as _, Sha256};

/// Length of the hex chunk identifier.
const CHUNK_ID_LEN: usize = 16;

/// Splits page text into overlapping fixed-size segments.
///
/// Offsets are counted in characters, not bytes, so multi-byte text never
/// splits inside a code point. Chunking never crosses a page boundary.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    /// Maximum chunk length in characters.
    chunk_size: usize,
    /// Characters shared by consecutive chunks of the same page.
    overlap: usize,
}

impl Chunker {
    /// Creates a chunker with the given window size and overlap.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `chunk_size` is zero or `overlap` is
    /// not smaller than `chunk_size`; either would stall the window.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config(
                "chunk size must be greater than zero".to_owned(),
            ));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Creates a chunker from configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the configured values are invalid.
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.overlap)
    }

    /// Chunks every page in order, emitting chunks page by page.
    #[must_use]
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            self.chunk_page(page, &mut chunks);
        }
        chunks
    }

    /// Walks the window over one page's text.
    ///
    /// Each step emits `[start, start + chunk_size)` clamped to the text end,
    /// then advances by `chunk_size - overlap`. The final chunk of a page may
    /// be shorter than the window but is always longer than the overlap.
    fn chunk_page(&self, page: &Page, chunks: &mut Vec<Chunk>) {
        let text = page.text.as_str();
        let char_starts: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        let total_chars = char_starts.len();
        let byte_at =
            |position: usize| char_starts.get(position).copied().unwrap_or(text.len());

        let mut start = 0;
        let mut index: u32 = 0;
        while start < total_chars {
            let end = start + self.chunk_size;
            let segment = &text[byte_at(start)..byte_at(end)];
            chunks.push(Chunk {
                text: segment.to_owned(),
                file: page.file.clone(),
                page: page.number,
                chunk_id: chunk_id(&page.file, page.number, index),
            });
            if end >= total_chars {
                break;
            }
            start = end - self.overlap;
            index += 1;
        }
    }
}

/// Derives the deterministic chunk identifier for (file, page, chunk index).
///
/// First 16 hex characters of a SHA-256 digest. Collisions are not detected;
/// the identifier space dwarfs any plausible chunk count.
fn chunk_id(file: &str, page: u32, index: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{file}:{page}:{index}").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..CHUNK_ID_LEN].to_owned()
}
