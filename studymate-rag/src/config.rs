//! Configuration for the retrieval pipeline and session.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::index::DistanceMetric;

/// What happens to the conversation history when a new document set is
/// ingested into a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Drop all turns, so no answer refers to documents that are gone.
    #[default]
    ClearOnIngest,
    /// Keep earlier turns across re-ingestion.
    Keep,
}

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Chunk size in words.
    pub chunk_size: usize,
    /// Number of words shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Distance metric of the vector index.
    pub metric: DistanceMetric,
    /// Maximum characters of retrieved context placed in a hosted prompt.
    pub context_char_budget: usize,
    /// Number of most recent turns included in a hosted prompt.
    pub history_turns: usize,
    /// History handling on re-ingestion.
    pub history_policy: HistoryPolicy,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            // The overlap is a crate default; plain fixed windows use 0.
            chunk_size: 300,
            chunk_overlap: 50,
            top_k: 3,
            metric: DistanceMetric::Euclidean,
            context_char_budget: 4000,
            history_turns: 4,
            history_policy: HistoryPolicy::ClearOnIngest,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `context_char_budget == 0`
    pub fn validate(&self) -> Result<()> {
        validate_window(self.chunk_size, self.chunk_overlap)?;
        if self.top_k == 0 {
            return Err(RagError::InvalidConfig("top_k must be greater than zero".to_string()));
        }
        if self.context_char_budget == 0 {
            return Err(RagError::InvalidConfig(
                "context_char_budget must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validate a chunk window.
pub(crate) fn validate_window(size: usize, overlap: usize) -> Result<()> {
    if size == 0 {
        return Err(RagError::InvalidConfig("chunk_size must be greater than zero".to_string()));
    }
    if overlap >= size {
        return Err(RagError::InvalidConfig(format!(
            "chunk_overlap ({overlap}) must be less than chunk_size ({size})"
        )));
    }
    Ok(())
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the chunk size in words.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in words.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the distance metric of the vector index.
    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Set the character budget for retrieved context in hosted prompts.
    pub fn context_char_budget(mut self, budget: usize) -> Self {
        self.config.context_char_budget = budget;
        self
    }

    /// Set how many recent turns are included in hosted prompts.
    pub fn history_turns(mut self, turns: usize) -> Self {
        self.config.history_turns = turns;
        self
    }

    /// Set the history handling on re-ingestion.
    pub fn history_policy(mut self, policy: HistoryPolicy) -> Self {
        self.config.history_policy = policy;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
