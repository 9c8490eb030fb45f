//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a local model or a hosted API behind a unified
/// async interface. Every vector a provider returns has length
/// [`dimensions`](EmbeddingProvider::dimensions); vectors from two
/// different providers must never share an index.
///
/// Providers make a single attempt per call. Hosted failures surface as
/// [`RagError::Embedding`] with an [`EmbedErrorKind`](crate::EmbedErrorKind)
/// and retry policy is left to the caller.
///
/// # Example
///
/// ```rust,ignore
/// use studymate_rag::{EmbeddingProvider, LocalEmbeddingProvider};
///
/// let provider = LocalEmbeddingProvider::default();
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The output has one vector per input, in input order. The default
    /// implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially; backends with native batching should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Check that a provider's batch output lines up with its input.
///
/// # Errors
///
/// Returns [`RagError::Embedding`] if the vector count differs from the
/// input count and [`RagError::DimensionMismatch`] if any vector has the
/// wrong length.
pub(crate) fn check_batch(
    provider: &dyn EmbeddingProvider,
    inputs: usize,
    vectors: &[Vec<f32>],
) -> Result<()> {
    if vectors.len() != inputs {
        return Err(RagError::embedding(
            provider.name(),
            crate::EmbedErrorKind::Unknown,
            format!("expected {inputs} embeddings, got {}", vectors.len()),
        ));
    }
    let expected = provider.dimensions();
    if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
        return Err(RagError::DimensionMismatch { expected, actual: bad.len() });
    }
    Ok(())
}
