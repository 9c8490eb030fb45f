//! OpenAI-compatible hosted embedding and chat clients.
//!
//! This module is only available when the `openai` feature is enabled.
//! Both clients make exactly one attempt per request; timeouts are the
//! `reqwest` client's own.

use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::answer::ChatModel;
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbedErrorKind, RagError, Result};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default model for OpenAI embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default chat model.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_BATCH_SIZE: usize = 64;
const DEFAULT_CONCURRENCY: usize = 4;

/// Native output size of the known OpenAI embedding models.
fn model_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

fn api_key_from_env() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|key| !key.trim().is_empty())
}

fn base_url_from_env() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_API_BASE.to_string())
}

fn build_client(timeout: Duration) -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Map an HTTP error status to an embedding failure kind.
fn classify_status(status: StatusCode) -> EmbedErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EmbedErrorKind::AuthFailure,
        StatusCode::TOO_MANY_REQUESTS => EmbedErrorKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => EmbedErrorKind::Timeout,
        _ => EmbedErrorKind::Unknown,
    }
}

/// Map a transport error to an embedding failure kind.
fn classify_transport(err: &reqwest::Error) -> EmbedErrorKind {
    if err.is_timeout() {
        EmbedErrorKind::Timeout
    } else if let Some(status) = err.status() {
        classify_status(status)
    } else {
        EmbedErrorKind::Unknown
    }
}

/// Pull the `error.message` field out of an OpenAI error body, if present.
fn error_detail(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// Large inputs are split into batches of `batch_size` texts that are sent
/// with up to `concurrency` requests in flight. Batches are reassembled in
/// input order.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use studymate_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::from_env()?.with_batch_size(32);
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
    batch_size: usize,
    concurrency: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`) and dimensions (1536).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::embedding(
                "OpenAI",
                EmbedErrorKind::AuthFailure,
                "API key must not be empty",
            ));
        }

        let client = build_client(DEFAULT_TIMEOUT).map_err(|e| {
            RagError::InvalidConfig(format!("failed to build OpenAI HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    ///
    /// `OPENAI_BASE_URL` overrides the endpoint when set.
    pub fn from_env() -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| {
            RagError::embedding(
                "OpenAI",
                EmbedErrorKind::AuthFailure,
                "OPENAI_API_KEY environment variable not set",
            )
        })?;
        Ok(Self::new(api_key)?.with_base_url(base_url_from_env()))
    }

    /// Point the provider at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    ///
    /// Known models also update [`dimensions()`](EmbeddingProvider::dimensions)
    /// unless [`with_dimensions`](Self::with_dimensions) was called.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        if self.request_dimensions.is_none() {
            if let Some(dims) = model_dimensions(&self.model) {
                self.dimensions = dims;
            }
        }
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Set the maximum number of texts per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the maximum number of requests in flight during a batch.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout).map_err(|e| {
            RagError::InvalidConfig(format!("failed to build OpenAI HTTP client: {e}"))
        })?;
        Ok(self)
    }

    /// Send one request for at most `batch_size` texts.
    async fn request_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                let kind = classify_transport(&e);
                error!(provider = "OpenAI", %kind, error = %e, "request failed");
                RagError::embedding("OpenAI", kind, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let kind = classify_status(status);

            error!(provider = "OpenAI", %status, %kind, "API error");
            return Err(RagError::embedding(
                "OpenAI",
                kind,
                format!("API returned {status}: {}", error_detail(body)),
            ));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse response");
            RagError::embedding(
                "OpenAI",
                classify_transport(&e),
                format!("failed to parse response: {e}"),
            )
        })?;

        let mut data = embedding_response.data;
        // The API documents `index`; order by it when present.
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index);
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.request_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| {
            RagError::embedding("OpenAI", EmbedErrorKind::Unknown, "API returned empty response")
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            requests = texts.len().div_ceil(self.batch_size),
            model = %self.model,
            "embedding batch"
        );

        // Build the request futures up front; `buffered` keeps them in
        // input order while up to `concurrency` run at once.
        let requests: Vec<_> =
            texts.chunks(self.batch_size).map(|batch| self.request_batch(batch)).collect();
        let batches: Vec<Vec<Vec<f32>>> =
            stream::iter(requests).buffered(self.concurrency).try_collect().await?;

        Ok(batches.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat ───────────────────────────────────────────────────────────

/// A [`ChatModel`] backed by the OpenAI chat completions API.
///
/// # Example
///
/// ```rust,ignore
/// use studymate_rag::openai::OpenAIChatModel;
///
/// let model = OpenAIChatModel::from_env()?.with_temperature(0.3);
/// let reply = model.generate("Summarise this").await?;
/// ```
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model client with the given API key.
    ///
    /// Uses `gpt-4o` at temperature 0.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::generation("OpenAI", "API key must not be empty"));
        }

        let client = build_client(DEFAULT_TIMEOUT).map_err(|e| {
            RagError::InvalidConfig(format!("failed to build OpenAI HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_CHAT_MODEL.into(),
            temperature: 0.0,
        })
    }

    /// Create a client using the `OPENAI_API_KEY` environment variable.
    ///
    /// `OPENAI_BASE_URL` overrides the endpoint when set.
    pub fn from_env() -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| {
            RagError::generation("OpenAI", "OPENAI_API_KEY environment variable not set")
        })?;
        Ok(Self::new(api_key)?.with_base_url(base_url_from_env()))
    }

    /// Point the client at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout).map_err(|e| {
            RagError::InvalidConfig(format!("failed to build OpenAI HTTP client: {e}"))
        })?;
        Ok(self)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "chat request failed");
                RagError::generation(&self.model, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.model, %status, "chat API error");
            return Err(RagError::generation(
                &self.model,
                format!("API returned {status}: {}", error_detail(body)),
            ));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            RagError::generation(&self.model, format!("failed to parse response: {e}"))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RagError::generation(&self.model, "API returned no content"))
    }
}
