//! Deterministic local embedding provider.
//!
//! [`LocalEmbeddingProvider`] needs no network and no model files: each
//! lower-cased alphanumeric token is hashed with XxHash64 (seed 0) into one
//! of `dimensions` buckets with a hash-derived sign, and the resulting
//! vector is L2-normalised. Texts sharing vocabulary land close together
//! under both Euclidean and cosine distance, and the same text always
//! produces the same vector.

use std::hash::Hasher;

use async_trait::async_trait;
use twox_hash::XxHash64;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Default dimensionality, matching small sentence-embedding models.
pub const DEFAULT_LOCAL_DIMENSIONS: usize = 384;

/// A feature-hashing [`EmbeddingProvider`] that runs entirely in-process.
#[derive(Debug, Clone)]
pub struct LocalEmbeddingProvider {
    dimensions: usize,
}

impl Default for LocalEmbeddingProvider {
    fn default() -> Self {
        Self { dimensions: DEFAULT_LOCAL_DIMENSIONS }
    }
}

impl LocalEmbeddingProvider {
    /// Create a provider producing vectors of the given length.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::InvalidConfig("dimensions must be greater than zero".into()));
        }
        Ok(Self { dimensions })
    }

    /// Embed synchronously.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokens(text) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let hash = hasher.finish();

            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

/// Lower-cased alphanumeric runs of `text`.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    fn name(&self) -> &str {
        "Local"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_sync(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
