//! Document retriever.
//!
//! The [`Retriever`] owns the chunks and vector index of the current
//! document set. [`ingest`](Retriever::ingest) runs chunk → embed → index
//! over the whole set and swaps the result in with a single write, so a
//! concurrent [`retrieve`](Retriever::retrieve) sees either the previous
//! corpus or the complete new one. A failed ingest leaves the previous
//! corpus in place.
//!
//! # Example
//!
//! ```rust,ignore
//! use studymate_rag::{Document, LocalEmbeddingProvider, RagConfig, Retriever};
//!
//! let embedder = Arc::new(LocalEmbeddingProvider::default());
//! let retriever = Retriever::new(embedder, RagConfig::default())?;
//! retriever.ingest(&[Document::new("notes", "Paris is the capital of France.")]).await?;
//! let chunks = retriever.retrieve("capital", 3).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::chunking::{Chunker, WordWindowChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, ChunkId, Document, SearchResult};
use crate::embedding::{EmbeddingProvider, check_batch};
use crate::error::{RagError, Result};
use crate::index::FlatIndex;

/// Summary of a successful ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of documents ingested.
    pub documents: usize,
    /// Number of chunks indexed.
    pub chunks: usize,
    /// Vector dimension of the new index (zero if nothing was indexed).
    pub dimension: usize,
}

/// An immutable, fully built document set.
#[derive(Debug)]
struct Corpus {
    documents: Vec<Document>,
    chunks: HashMap<ChunkId, Chunk>,
    index: FlatIndex,
}

/// Chunks, embeds, indexes, and searches a document set.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: WordWindowChunker,
    config: RagConfig,
    corpus: RwLock<Option<Arc<Corpus>>>,
}

impl Retriever {
    /// Create a retriever with no documents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if `config` does not validate.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: RagConfig) -> Result<Self> {
        config.validate()?;
        let chunker = WordWindowChunker::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self { embedder, chunker, config, corpus: RwLock::new(None) })
    }

    /// Return a reference to the retriever configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Whether a non-empty document set is currently indexed.
    pub async fn is_ingested(&self) -> bool {
        self.corpus.read().await.is_some()
    }

    /// Number of chunks in the current index.
    pub async fn chunk_count(&self) -> usize {
        self.corpus.read().await.as_ref().map_or(0, |corpus| corpus.chunks.len())
    }

    /// The documents of the current set.
    pub async fn documents(&self) -> Vec<Document> {
        self.corpus.read().await.as_ref().map(|corpus| corpus.documents.clone()).unwrap_or_default()
    }

    /// Replace the current document set: chunk → embed (one batch) → index.
    ///
    /// An empty set, or one without any words, clears the retriever.
    ///
    /// # Errors
    ///
    /// Propagates embedding failures ([`RagError::Embedding`]) and
    /// [`RagError::DimensionMismatch`]. On error the previous document set
    /// stays active and unchanged.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestReport> {
        self.ingest_chunked(documents, &self.chunker).await
    }

    /// Like [`ingest`](Retriever::ingest), with a one-off chunk window
    /// instead of the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] for an invalid window, before
    /// anything is embedded; otherwise as [`ingest`](Retriever::ingest).
    pub async fn ingest_with_window(
        &self,
        documents: &[Document],
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<IngestReport> {
        let chunker = WordWindowChunker::new(chunk_size, chunk_overlap)?;
        self.ingest_chunked(documents, &chunker).await
    }

    async fn ingest_chunked(
        &self,
        documents: &[Document],
        chunker: &WordWindowChunker,
    ) -> Result<IngestReport> {
        let chunks: Vec<Chunk> =
            documents.iter().flat_map(|document| chunker.chunk(document)).collect();

        if chunks.is_empty() {
            *self.corpus.write().await = None;
            info!(documents = documents.len(), chunk_count = 0, "ingested empty document set");
            return Ok(IngestReport { documents: documents.len(), chunks: 0, dimension: 0 });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        debug!(provider = self.embedder.name(), batch_size = texts.len(), "embedding chunks");

        let vectors = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(
                provider = self.embedder.name(),
                error = %e,
                "embedding failed during ingestion"
            );
            e
        })?;
        check_batch(self.embedder.as_ref(), texts.len(), &vectors)?;

        let mut index = FlatIndex::new(self.config.metric);
        for (chunk, vector) in chunks.iter().zip(vectors) {
            index.insert(chunk.id.clone(), vector)?;
        }
        let dimension = index.dimension().unwrap_or_default();

        let chunks: HashMap<ChunkId, Chunk> =
            chunks.into_iter().map(|chunk| (chunk.id.clone(), chunk)).collect();
        let report =
            IngestReport { documents: documents.len(), chunks: chunks.len(), dimension };

        let corpus = Corpus { documents: documents.to_vec(), chunks, index };
        *self.corpus.write().await = Some(Arc::new(corpus));

        info!(
            documents = report.documents,
            chunk_count = report.chunks,
            dimension = report.dimension,
            "ingested document set"
        );
        Ok(report)
    }

    /// Return the `k` chunks closest to `query`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotIngested`] if no document set is active, and
    /// propagates embedding and index errors.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let results = self.retrieve_scored(query, k).await?;
        Ok(results.into_iter().map(|result| result.chunk).collect())
    }

    /// Like [`retrieve`](Retriever::retrieve), with each chunk's distance.
    ///
    /// # Errors
    ///
    /// See [`retrieve`](Retriever::retrieve).
    pub async fn retrieve_scored(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        // Hold the corpus, not the lock, across the embedding call.
        let corpus = self.corpus.read().await.clone().ok_or(RagError::NotIngested)?;

        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(provider = self.embedder.name(), error = %e, "embedding failed during query");
            e
        })?;

        let hits = corpus.index.search(&query_embedding, k)?;
        let results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(|(id, distance)| {
                corpus.chunks.get(&id).map(|chunk| SearchResult { chunk: chunk.clone(), distance })
            })
            .collect();

        debug!(result_count = results.len(), k, "retrieved chunks");
        Ok(results)
    }
}
