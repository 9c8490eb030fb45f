//! # studymate-rag
//!
//! Retrieval-augmented question answering over a set of documents.
//!
//! ## Overview
//!
//! Documents arrive as already-extracted text. At ingest time they are
//! split into overlapping word windows, embedded in one batch, and stored
//! in an exact vector index. At question time the query is embedded with
//! the same provider, the nearest chunks are retrieved, and an
//! [`Answerer`] turns them into a reply that is appended to the session
//! history.
//!
//! ```text
//! documents ─▶ WordWindowChunker ─▶ EmbeddingProvider ─▶ FlatIndex
//! query ─▶ EmbeddingProvider ─▶ FlatIndex::search ─▶ Answerer ─▶ history
//! ```
//!
//! ## Components
//!
//! - [`WordWindowChunker`] — fixed-size word windows with overlap
//! - [`EmbeddingProvider`] — [`LocalEmbeddingProvider`] or, with the
//!   `openai` feature, `OpenAIEmbeddingProvider`
//! - [`FlatIndex`] — exact Euclidean or cosine nearest-neighbour search
//! - [`Retriever`] — atomic ingest and top-k retrieval
//! - [`Answerer`] — [`HostedAnswerer`] over a [`ChatModel`], or [`ConcatAnswerer`]
//! - [`Studio`] — audio/video overviews, mind maps, reports, flashcards, quizzes
//! - [`Session`] — owns the retriever and the conversation history
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use studymate_rag::{
//!     ConcatAnswerer, Document, LocalEmbeddingProvider, RagConfig, Retriever, Session,
//! };
//!
//! let config = RagConfig::builder().chunk_size(300).chunk_overlap(50).top_k(3).build()?;
//! let retriever = Retriever::new(Arc::new(LocalEmbeddingProvider::default()), config.clone())?;
//! let mut session = Session::new(retriever, Arc::new(ConcatAnswerer), config);
//!
//! session.ingest(&[Document::new("notes", "Paris is the capital of France.")]).await?;
//! println!("{}", session.ask("What is the capital?").await?);
//! ```
//!
//! ## Features
//!
//! - `openai` — hosted embeddings and chat via OpenAI-compatible APIs

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod local;
#[cfg(feature = "openai")]
pub mod openai;
pub mod retriever;
pub mod session;
pub mod studio;

pub use answer::{
    Answerer, CHUNK_SEPARATOR, ChatModel, ConcatAnswerer, HostedAnswerer, PromptLimits,
    build_condense_prompt, build_prompt, truncate_context,
};
pub use chunking::{
    Chunker, WordSpan, WordWindowChunker, reconstruct_words, split_words, word_windows,
};
pub use config::{HistoryPolicy, RagConfig, RagConfigBuilder};
pub use document::{Chunk, ChunkId, ConversationTurn, Document, SearchResult, SourceRef};
pub use embedding::EmbeddingProvider;
pub use error::{EmbedErrorKind, RagError, Result};
pub use index::{DistanceMetric, FlatIndex};
pub use local::{DEFAULT_LOCAL_DIMENSIONS, LocalEmbeddingProvider};
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
pub use retriever::{IngestReport, Retriever};
pub use session::{Session, SessionState};
pub use studio::{
    ReportKind, ReportTemplate, SUPPORTED_LANGUAGES, Studio, StudioOptions, StudioOutput,
};
