//! Data types for documents, chunks, and search results.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a piece of text came from, for citations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceRef {
    /// Originating file name or other label.
    pub name: String,
    /// One-based page number, when the source is paginated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SourceRef {
    /// A source without page information.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), page: None }
    }

    /// A source pointing at a single page.
    pub fn page(name: impl Into<String>, page: u32) -> Self {
        Self { name: name.into(), page: Some(page) }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "{} (page {page})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A source document: already-extracted text plus where it came from.
///
/// Documents are immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// Citation information.
    pub source: SourceRef,
    /// Key-value metadata associated with the document.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document whose source name is its id.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let id = id.into();
        Self { source: SourceRef::new(id.clone()), id, text: text.into(), metadata: HashMap::new() }
    }

    /// Create a document for one page of a paginated file.
    ///
    /// The id is `{name}#p{page}` so pages of the same file stay distinct.
    pub fn from_page(name: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("{name}#p{page}"),
            text: text.into(),
            source: SourceRef::page(name, page),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Identifier of a [`Chunk`], formatted `{document_id}_{chunk_index}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    /// Build the id of chunk `index` of `document_id`.
    pub fn new(document_id: &str, index: usize) -> Self {
        Self(format!("{document_id}_{index}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChunkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ChunkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A contiguous word span of a [`Document`].
///
/// Chunks refer back to their document by id and carry a copy of its
/// [`SourceRef`]; they do not own the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: ChunkId,
    /// The words of the span joined by single spaces.
    pub text: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Citation information copied from the parent document.
    pub source: SourceRef,
    /// Position of this chunk within its document.
    pub index: usize,
    /// Index of the first word of the span (inclusive).
    pub start_word: usize,
    /// Index one past the last word of the span.
    pub end_word: usize,
}

impl Chunk {
    /// Number of words in the chunk.
    pub fn word_count(&self) -> usize {
        self.end_word - self.start_word
    }
}

/// A retrieved [`Chunk`] paired with its distance from the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Distance from the query vector (lower is more relevant).
    pub distance: f32,
}

/// One question and the answer recorded for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    /// The user's question.
    pub query: String,
    /// The answer shown to the user, or the error string recorded instead.
    pub answer: String,
}

impl ConversationTurn {
    /// Create a turn.
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { query: query.into(), answer: answer.into() }
    }
}
