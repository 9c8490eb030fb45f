//! Answer generation from retrieved chunks.
//!
//! Two [`Answerer`]s are provided:
//!
//! - [`HostedAnswerer`] — builds a bounded prompt and delegates to a
//!   [`ChatModel`]
//! - [`ConcatAnswerer`] — returns the retrieved text itself, used when no
//!   hosted model is configured

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::RagConfig;
use crate::document::{Chunk, ConversationTurn};
use crate::error::Result;

/// Separator placed between chunks by [`ConcatAnswerer`].
pub const CHUNK_SEPARATOR: &str = "\n---\n";

/// A hosted text generation capability.
///
/// Implementations send a prompt to a third-party model and return its
/// reply. Failures are reported as [`RagError::Generation`](crate::RagError::Generation).
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Produces an answer for a query from retrieved chunks and prior turns.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// The text to retrieve chunks with for `query`.
    ///
    /// Defaults to `query` itself.
    async fn retrieval_query(&self, query: &str, _history: &[ConversationTurn]) -> Result<String> {
        Ok(query.to_string())
    }

    /// Answer `query` using `context` (nearest chunk first) and `history`
    /// (oldest turn first).
    async fn answer(
        &self,
        query: &str,
        context: &[Chunk],
        history: &[ConversationTurn],
    ) -> Result<String>;
}

/// Returns the retrieved chunk texts joined by [`CHUNK_SEPARATOR`].
///
/// No generation takes place; a single chunk is returned exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatAnswerer;

#[async_trait]
impl Answerer for ConcatAnswerer {
    async fn answer(
        &self,
        _query: &str,
        context: &[Chunk],
        _history: &[ConversationTurn],
    ) -> Result<String> {
        let texts: Vec<&str> = context.iter().map(|chunk| chunk.text.as_str()).collect();
        Ok(texts.join(CHUNK_SEPARATOR))
    }
}

/// Limits applied when building a hosted prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    /// Maximum characters of chunk text included.
    pub context_char_budget: usize,
    /// Maximum number of most recent turns included.
    pub history_turns: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self { context_char_budget: 4000, history_turns: 4 }
    }
}

impl From<&RagConfig> for PromptLimits {
    fn from(config: &RagConfig) -> Self {
        Self {
            context_char_budget: config.context_char_budget,
            history_turns: config.history_turns,
        }
    }
}

/// Take chunk texts in rank order until `budget` characters are used.
///
/// The chunk that crosses the budget is cut on a character boundary and
/// nothing after it is included.
pub fn truncate_context(context: &[Chunk], budget: usize) -> Vec<String> {
    let mut remaining = budget;
    let mut out = Vec::new();

    for chunk in context {
        if remaining == 0 {
            break;
        }
        let len = chunk.text.chars().count();
        if len <= remaining {
            out.push(chunk.text.clone());
            remaining -= len;
        } else {
            out.push(chunk.text.chars().take(remaining).collect());
            break;
        }
    }
    out
}

/// Build the prompt sent to a hosted model.
pub fn build_prompt(
    query: &str,
    context: &[Chunk],
    history: &[ConversationTurn],
    limits: PromptLimits,
) -> String {
    let mut prompt = String::from(
        "Answer the question using only the document excerpts below. \
         If they do not contain the answer, say so.\n",
    );

    let recent = &history[history.len().saturating_sub(limits.history_turns)..];
    if !recent.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in recent {
            prompt.push_str(&format!("User: {}\nAssistant: {}\n", turn.query, turn.answer));
        }
    }

    let excerpts = truncate_context(context, limits.context_char_budget);
    prompt.push_str("\nExcerpts:\n");
    for (chunk, text) in context.iter().zip(&excerpts) {
        prompt.push_str(&format!("[{}]\n{}\n\n", chunk.source, text));
    }

    prompt.push_str(&format!("Question: {query}\nAnswer:"));
    prompt
}

/// Build the prompt that rewrites a follow-up into a standalone question.
pub fn build_condense_prompt(
    query: &str,
    history: &[ConversationTurn],
    limits: PromptLimits,
) -> String {
    let mut prompt = String::from(
        "Rephrase the follow-up question as a standalone question that can be \
         understood without the conversation. Reply with the question only.\n\nConversation:\n",
    );
    let recent = &history[history.len().saturating_sub(limits.history_turns)..];
    for turn in recent {
        prompt.push_str(&format!("User: {}\nAssistant: {}\n", turn.query, turn.answer));
    }
    prompt.push_str(&format!("\nFollow-up question: {query}\nStandalone question:"));
    prompt
}

/// Delegates answering to a hosted [`ChatModel`].
///
/// The model's reply is returned verbatim. Model failures are returned as
/// errors; turning them into a user-facing message is the session's job.
pub struct HostedAnswerer {
    model: Arc<dyn ChatModel>,
    limits: PromptLimits,
    condense_questions: bool,
}

impl HostedAnswerer {
    /// Create an answerer with default prompt limits.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, limits: PromptLimits::default(), condense_questions: false }
    }

    /// Rewrite follow-up questions into standalone ones before retrieval.
    ///
    /// Costs one extra model call per question asked with history. The
    /// original question is still the one answered.
    pub fn with_question_condensing(mut self) -> Self {
        self.condense_questions = true;
        self
    }

    /// Override the prompt limits.
    pub fn with_limits(mut self, limits: PromptLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The prompt limits in effect.
    pub fn limits(&self) -> PromptLimits {
        self.limits
    }
}

#[async_trait]
impl Answerer for HostedAnswerer {
    async fn retrieval_query(&self, query: &str, history: &[ConversationTurn]) -> Result<String> {
        if !self.condense_questions || history.is_empty() {
            return Ok(query.to_string());
        }

        let prompt = build_condense_prompt(query, history, self.limits);
        let condensed = self.model.generate(&prompt).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "question condensing failed");
            e
        })?;
        let condensed = condensed.trim();
        if condensed.is_empty() {
            return Ok(query.to_string());
        }
        debug!(model = self.model.name(), %condensed, "condensed follow-up question");
        Ok(condensed.to_string())
    }

    async fn answer(
        &self,
        query: &str,
        context: &[Chunk],
        history: &[ConversationTurn],
    ) -> Result<String> {
        let prompt = build_prompt(query, context, history, self.limits);
        debug!(model = self.model.name(), prompt_len = prompt.len(), "sending prompt");

        self.model.generate(&prompt).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "generation failed");
            e
        })
    }
}
