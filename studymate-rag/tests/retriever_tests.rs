//! Tests for ingestion and retrieval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use studymate_rag::{
    Document, EmbedErrorKind, EmbeddingProvider, LocalEmbeddingProvider, RagConfig, RagError,
    Retriever,
};

/// Wraps the local embedder and can be switched to time out.
struct FlakyEmbedder {
    inner: LocalEmbeddingProvider,
    failing: AtomicBool,
}

impl FlakyEmbedder {
    fn new() -> Self {
        Self { inner: LocalEmbeddingProvider::default(), failing: AtomicBool::new(false) }
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn embed(&self, text: &str) -> studymate_rag::Result<Vec<f32>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RagError::embedding("flaky", EmbedErrorKind::Timeout, "request timed out"));
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Returns vectors whose length depends on the input.
struct RaggedEmbedder;

#[async_trait]
impl EmbeddingProvider for RaggedEmbedder {
    fn name(&self) -> &str {
        "ragged"
    }

    async fn embed(&self, text: &str) -> studymate_rag::Result<Vec<f32>> {
        Ok(vec![1.0; 2 + text.len() % 2])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

fn small_config() -> RagConfig {
    RagConfig::builder().chunk_size(5).chunk_overlap(1).top_k(2).build().unwrap()
}

fn corpus() -> Vec<Document> {
    vec![
        Document::new("geo", "Paris is the capital of France and sits on the Seine river."),
        Document::new("bio", "Mitochondria produce energy for the cell through respiration."),
    ]
}

#[tokio::test]
async fn retrieve_before_ingest_is_not_ingested() {
    let retriever =
        Retriever::new(Arc::new(LocalEmbeddingProvider::default()), small_config()).unwrap();
    assert!(!retriever.is_ingested().await);
    assert!(matches!(retriever.retrieve("anything", 3).await, Err(RagError::NotIngested)));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let config = RagConfig { chunk_size: 10, chunk_overlap: 10, ..RagConfig::default() };
    let result = Retriever::new(Arc::new(LocalEmbeddingProvider::default()), config);
    assert!(matches!(result, Err(RagError::InvalidConfig(_))));
}

#[tokio::test]
async fn ingest_reports_counts_and_retrieves_relevant_chunk() {
    let retriever =
        Retriever::new(Arc::new(LocalEmbeddingProvider::default()), small_config()).unwrap();
    let report = retriever.ingest(&corpus()).await.unwrap();

    assert_eq!(report.documents, 2);
    assert_eq!(report.chunks, retriever.chunk_count().await);
    assert_eq!(report.dimension, 384);

    let results = retriever.retrieve_scored("mitochondria energy cell", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.document_id, "bio");
    assert!(results[0].distance <= results[1].distance);
}

#[tokio::test]
async fn failed_ingest_keeps_previous_corpus() {
    let embedder = Arc::new(FlakyEmbedder::new());
    let retriever = Retriever::new(embedder.clone(), small_config()).unwrap();
    retriever.ingest(&corpus()).await.unwrap();
    let before = retriever.chunk_count().await;

    embedder.fail(true);
    let err = retriever
        .ingest(&[Document::new("new", "Completely different material about volcanoes.")])
        .await
        .unwrap_err();
    assert_eq!(err.embed_kind(), Some(EmbedErrorKind::Timeout));
    assert!(err.is_transient());

    embedder.fail(false);
    assert_eq!(retriever.chunk_count().await, before);
    let chunks = retriever.retrieve("Paris capital", 1).await.unwrap();
    assert_eq!(chunks[0].document_id, "geo");
    let ids: Vec<String> = retriever.documents().await.into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["geo", "bio"]);
}

#[tokio::test]
async fn query_embedding_failure_propagates() {
    let embedder = Arc::new(FlakyEmbedder::new());
    let retriever = Retriever::new(embedder.clone(), small_config()).unwrap();
    retriever.ingest(&corpus()).await.unwrap();

    embedder.fail(true);
    let err = retriever.retrieve("Paris", 1).await.unwrap_err();
    assert_eq!(err.embed_kind(), Some(EmbedErrorKind::Timeout));
}

#[tokio::test]
async fn inconsistent_dimensions_fail_ingest() {
    let retriever = Retriever::new(Arc::new(RaggedEmbedder), small_config()).unwrap();
    let documents = vec![Document::new("a", "one two three four five six seven")];

    let err = retriever.ingest(&documents).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));
    assert!(!retriever.is_ingested().await);
}

#[tokio::test]
async fn empty_ingest_clears_corpus() {
    let retriever =
        Retriever::new(Arc::new(LocalEmbeddingProvider::default()), small_config()).unwrap();
    retriever.ingest(&corpus()).await.unwrap();
    assert!(retriever.is_ingested().await);

    let report = retriever.ingest(&[]).await.unwrap();
    assert_eq!(report.chunks, 0);
    assert!(!retriever.is_ingested().await);
    assert!(matches!(retriever.retrieve("Paris", 1).await, Err(RagError::NotIngested)));
}

#[tokio::test]
async fn reingest_replaces_document_set() {
    let retriever =
        Retriever::new(Arc::new(LocalEmbeddingProvider::default()), small_config()).unwrap();
    retriever.ingest(&corpus()).await.unwrap();
    retriever.ingest(&[Document::new("volcano", "Lava erupts from the volcano.")]).await.unwrap();

    let chunks = retriever.retrieve("Paris capital France", 5).await.unwrap();
    assert!(chunks.iter().all(|chunk| chunk.document_id == "volcano"));
}

#[tokio::test]
async fn per_call_window_overrides_config() {
    let retriever =
        Retriever::new(Arc::new(LocalEmbeddingProvider::default()), small_config()).unwrap();
    let documents = vec![Document::new("letters", "A B C D E F")];

    let report = retriever.ingest_with_window(&documents, 3, 1).await.unwrap();
    assert_eq!(report.chunks, 3);

    let err = retriever.ingest_with_window(&documents, 3, 3).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidConfig(_)));
    assert_eq!(retriever.chunk_count().await, 3);
}
