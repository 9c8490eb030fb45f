//! Error types for the `studymate-rag` crate.

use std::fmt;

use thiserror::Error;

/// Why a hosted embedding call failed.
///
/// The embedder never retries; callers inspect the kind to decide
/// whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedErrorKind {
    /// The request did not complete within the client timeout.
    Timeout,
    /// The API rejected the credentials (HTTP 401/403).
    AuthFailure,
    /// The API is throttling requests (HTTP 429).
    RateLimited,
    /// Any other transport, protocol, or server failure.
    Unknown,
}

impl fmt::Display for EmbedErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::AuthFailure => "authentication failure",
            Self::RateLimited => "rate limited",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Errors that can occur in retrieval and answering operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Chunker or pipeline parameters are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An embedding provider failed.
    #[error("Embedding error ({provider}, {kind}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// Classification of the failure.
        kind: EmbedErrorKind,
        /// A description of the failure.
        message: String,
    },

    /// A vector does not match the dimension fixed by the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension fixed by the first insert.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// A search was issued against an index with no entries.
    #[error("Index is empty")]
    EmptyIndex,

    /// Retrieval was requested before any documents were ingested.
    #[error("No documents have been ingested")]
    NotIngested,

    /// The hosted chat model failed to produce an answer.
    #[error("Generation failed ({provider}): {message}")]
    Generation {
        /// The chat model that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    /// Build an [`RagError::Embedding`] error.
    pub fn embedding(
        provider: impl Into<String>,
        kind: EmbedErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::Embedding { provider: provider.into(), kind, message: message.into() }
    }

    /// Build an [`RagError::Generation`] error.
    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation { provider: provider.into(), message: message.into() }
    }

    /// Returns the embedding failure kind, if this is an embedding error.
    pub fn embed_kind(&self) -> Option<EmbedErrorKind> {
        match self {
            Self::Embedding { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the error came from a hosted API call rather than from
    /// misconfiguration or misuse.
    ///
    /// Transient errors are reported to the user as an answer string;
    /// everything else is a programmer error and propagates.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Embedding { .. } | Self::Generation { .. })
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
