//! Conversation session.
//!
//! A [`Session`] is the caller-owned replacement for ambient UI state: it
//! owns the [`Retriever`] for the current document set and the
//! conversation history, and moves through
//! `Empty → Ingested → (Answering ⇄ Ingested)`.
//!
//! # Example
//!
//! ```rust,ignore
//! use studymate_rag::{ConcatAnswerer, LocalEmbeddingProvider, RagConfig, Retriever, Session};
//!
//! let config = RagConfig::default();
//! let retriever = Retriever::new(Arc::new(LocalEmbeddingProvider::default()), config.clone())?;
//! let mut session = Session::new(retriever, Arc::new(ConcatAnswerer), config);
//! session.ingest(&documents).await?;
//! let answer = session.ask("What is the capital?").await?;
//! ```

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::answer::Answerer;
use crate::config::{HistoryPolicy, RagConfig};
use crate::document::{ConversationTurn, Document};
use crate::error::{RagError, Result};
use crate::retriever::{IngestReport, Retriever};
use crate::studio::{ReportKind, Studio, StudioOptions, StudioOutput};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No documents ingested.
    Empty,
    /// A document set is indexed and the session is idle.
    Ingested,
    /// A question is being answered.
    Answering,
}

/// A single-user question answering session.
pub struct Session {
    id: String,
    retriever: Retriever,
    answerer: Arc<dyn Answerer>,
    studio: Option<Studio>,
    config: RagConfig,
    history: Vec<ConversationTurn>,
    state: SessionState,
}

impl Session {
    /// Create an empty session.
    pub fn new(retriever: Retriever, answerer: Arc<dyn Answerer>, config: RagConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            retriever,
            answerer,
            studio: None,
            config,
            history: Vec::new(),
            state: SessionState::Empty,
        }
    }

    /// Attach a studio for [`Session::studio`].
    pub fn with_studio(mut self, studio: Studio) -> Self {
        self.studio = Some(studio);
        self
    }

    /// Unique session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Conversation so far, oldest turn first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// The session configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The retriever owned by this session.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Documents of the current set.
    pub async fn documents(&self) -> Vec<Document> {
        self.retriever.documents().await
    }

    /// Replace the session's document set.
    ///
    /// History is cleared or kept according to the configured
    /// [`HistoryPolicy`], and only once the new index is in place.
    ///
    /// # Errors
    ///
    /// Propagates [`Retriever::ingest`] errors; the session is unchanged
    /// on failure.
    pub async fn ingest(&mut self, documents: &[Document]) -> Result<IngestReport> {
        let report = self.retriever.ingest(documents).await?;

        if self.config.history_policy == HistoryPolicy::ClearOnIngest && !self.history.is_empty() {
            info!(session.id = %self.id, turns = self.history.len(), "clearing history on ingest");
            self.history.clear();
        }
        self.state =
            if report.chunks == 0 { SessionState::Empty } else { SessionState::Ingested };
        Ok(report)
    }

    /// Answer `query` against the current document set and record the turn.
    ///
    /// A hosted API failure does not fail the call: the answer becomes
    /// `"Error processing query: {reason}"` and is recorded like any other.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotIngested`] before a successful ingest and
    /// propagates non-transient errors, in which case no turn is recorded.
    pub async fn ask(&mut self, query: &str) -> Result<String> {
        if self.state == SessionState::Empty {
            return Err(RagError::NotIngested);
        }
        self.state = SessionState::Answering;
        let outcome = self.answer_query(query).await;
        self.state = SessionState::Ingested;

        let answer = match outcome {
            Ok(answer) => answer,
            Err(e) if e.is_transient() => {
                warn!(session.id = %self.id, error = %e, "answering failed");
                format!("Error processing query: {e}")
            }
            Err(e) => return Err(e),
        };

        self.history.push(ConversationTurn::new(query, answer.clone()));
        Ok(answer)
    }

    async fn answer_query(&self, query: &str) -> Result<String> {
        let recent = &self.history[self.history.len().saturating_sub(self.config.history_turns)..];
        let search_query = self.answerer.retrieval_query(query, recent).await?;
        let context = self.retriever.retrieve(&search_query, self.config.top_k).await?;
        self.answerer.answer(query, &context, recent).await
    }

    /// Generate study material over the current documents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotIngested`] before a successful ingest and
    /// [`RagError::InvalidConfig`] when no studio is attached.
    pub async fn studio(&self, kind: ReportKind, options: &StudioOptions) -> Result<StudioOutput> {
        if self.state == SessionState::Empty {
            return Err(RagError::NotIngested);
        }
        let studio = self.studio.as_ref().ok_or_else(|| {
            RagError::InvalidConfig("studio requires a hosted chat model".to_string())
        })?;
        let documents = self.retriever.documents().await;
        Ok(studio.generate(kind, &documents, options).await)
    }

    /// Forget the conversation history; the document set stays.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
