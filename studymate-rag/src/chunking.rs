//! Document chunking.
//!
//! Text is split on whitespace into words and cut into fixed-size word
//! windows. Consecutive windows share `overlap` words, so a window starts
//! every `size - overlap` words:
//!
//! ```text
//! "A B C D E F", size = 3, overlap = 1  →  "A B C" | "C D E" | "E F"
//! ```

use tracing::debug;

use crate::config::validate_window;
use crate::document::{Chunk, ChunkId, Document};
use crate::error::Result;

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no words.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// A half-open word range `[start, end)` produced by [`split_words`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    /// Index of the first word.
    pub start: usize,
    /// Index one past the last word.
    pub end: usize,
}

/// Compute the word windows for a text of `word_count` words.
///
/// A text shorter than `size` words yields exactly one window. Any other
/// text yields `ceil(word_count / (size - overlap))` windows, the last of
/// which may lie entirely inside its predecessor's tail.
///
/// # Errors
///
/// Returns [`RagError::InvalidConfig`](crate::RagError::InvalidConfig) when
/// `size == 0` or `overlap >= size`.
pub fn word_windows(word_count: usize, size: usize, overlap: usize) -> Result<Vec<WordSpan>> {
    validate_window(size, overlap)?;

    if word_count == 0 {
        return Ok(Vec::new());
    }
    if word_count < size {
        return Ok(vec![WordSpan { start: 0, end: word_count }]);
    }

    let step = size - overlap;
    let spans = (0..word_count)
        .step_by(step)
        .map(|start| WordSpan { start, end: (start + size).min(word_count) })
        .collect();
    Ok(spans)
}

/// Split `text` into overlapping word windows and return their texts.
///
/// Words inside a window are joined with a single space.
///
/// # Errors
///
/// Same as [`word_windows`].
pub fn split_words(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let spans = word_windows(words.len(), size, overlap)?;
    Ok(spans.iter().map(|span| words[span.start..span.end].join(" ")).collect())
}

/// Rebuild the word sequence from consecutive chunks by dropping the
/// first `overlap` words of every chunk after the first.
pub fn reconstruct_words<S: AsRef<str>>(chunks: &[S], overlap: usize) -> Vec<String> {
    let mut words = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let skip = if i == 0 { 0 } else { overlap };
        words.extend(chunk.as_ref().split_whitespace().skip(skip).map(str::to_string));
    }
    words
}

/// Splits text into fixed-size word windows with a configurable overlap.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`; every chunk
/// carries the parent's [`SourceRef`](crate::SourceRef) for citation.
///
/// # Example
///
/// ```rust,ignore
/// use studymate_rag::WordWindowChunker;
///
/// let chunker = WordWindowChunker::new(300, 50)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct WordWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — number of words per chunk
    /// * `chunk_overlap` — number of words shared by consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`](crate::RagError::InvalidConfig) when
    /// `chunk_size == 0` or `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Words per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Words shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let words: Vec<&str> = document.text.split_whitespace().collect();
        // The window was validated in `new`.
        let spans = word_windows(words.len(), self.chunk_size, self.chunk_overlap)
            .unwrap_or_default();

        let chunks: Vec<Chunk> = spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| Chunk {
                id: ChunkId::new(&document.id, index),
                text: words[span.start..span.end].join(" "),
                document_id: document.id.clone(),
                source: document.source.clone(),
                index,
                start_word: span.start,
                end_word: span.end,
            })
            .collect();

        debug!(
            document.id = %document.id,
            word_count = words.len(),
            chunk_count = chunks.len(),
            "chunked document"
        );
        chunks
    }
}
