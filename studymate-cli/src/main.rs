use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use studymate_cli::{load_paths, run_console};
use studymate_rag::openai::OPENAI_API_BASE;
use studymate_rag::{
    ConcatAnswerer, HistoryPolicy, HostedAnswerer, LocalEmbeddingProvider, OpenAIChatModel,
    OpenAIEmbeddingProvider, RagConfig, Retriever, Session, Studio,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "studymate", version, about = "Ask questions about your documents")]
struct Args {
    /// Documents to load at start-up (.txt, .md, .pdf)
    files: Vec<PathBuf>,

    /// Use the offline embedder and answer with the retrieved text itself
    #[arg(long, env = "STUDYMATE_LOCAL")]
    local: bool,

    /// Words per chunk
    #[arg(long, env = "STUDYMATE_CHUNK_SIZE", default_value_t = 300)]
    chunk_size: usize,

    /// Words shared by consecutive chunks
    #[arg(long, env = "STUDYMATE_CHUNK_OVERLAP", default_value_t = 50)]
    chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, env = "STUDYMATE_TOP_K", default_value_t = 3)]
    top_k: usize,

    /// Keep the conversation when new documents are loaded
    #[arg(long, env = "STUDYMATE_KEEP_HISTORY")]
    keep_history: bool,

    /// Rewrite follow-up questions into standalone ones before retrieval
    #[arg(long, env = "STUDYMATE_CONDENSE_QUESTIONS")]
    condense_questions: bool,

    /// API key for the hosted embedding and chat models
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// OpenAI-compatible API endpoint
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OPENAI_API_BASE)]
    openai_base_url: String,

    /// Chat model used for answers and study material
    #[arg(long, env = "STUDYMATE_CHAT_MODEL", default_value = "gpt-4o")]
    chat_model: String,

    /// Embedding model
    #[arg(long, env = "STUDYMATE_EMBEDDING_MODEL", default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// Timeout for each hosted API request, in seconds
    #[arg(long, env = "STUDYMATE_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("studymate=info,studymate_rag=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let history_policy =
        if args.keep_history { HistoryPolicy::Keep } else { HistoryPolicy::ClearOnIngest };
    let config = RagConfig::builder()
        .chunk_size(args.chunk_size)
        .chunk_overlap(args.chunk_overlap)
        .top_k(args.top_k)
        .history_policy(history_policy)
        .build()
        .context("invalid chunking or retrieval settings")?;

    let mut session = build_session(&args, config)?;
    info!(session.id = %session.id(), "session started");

    if !args.files.is_empty() {
        let documents = load_paths(&args.files)?;
        let report = session.ingest(&documents).await.context("failed to index documents")?;
        println!("Indexed {} chunk(s) from {} document(s).", report.chunks, report.documents);
    }

    run_console(&mut session).await
}

fn build_session(args: &Args, config: RagConfig) -> Result<Session> {
    let api_key = args.openai_api_key.as_deref().filter(|key| !key.trim().is_empty());
    let Some(api_key) = api_key.filter(|_| !args.local) else {
        info!("using local embeddings; answers are the retrieved passages");
        let embedder = Arc::new(LocalEmbeddingProvider::default());
        let retriever = Retriever::new(embedder, config.clone())?;
        return Ok(Session::new(retriever, Arc::new(ConcatAnswerer), config));
    };

    let timeout = Duration::from_secs(args.timeout_secs);
    let embedder = OpenAIEmbeddingProvider::new(api_key)?
        .with_base_url(&args.openai_base_url)
        .with_model(&args.embedding_model)
        .with_timeout(timeout)?;
    let chat = OpenAIChatModel::new(api_key)?
        .with_base_url(&args.openai_base_url)
        .with_model(&args.chat_model)
        .with_timeout(timeout)?;
    let studio_model = OpenAIChatModel::new(api_key)?
        .with_base_url(&args.openai_base_url)
        .with_model(&args.chat_model)
        .with_temperature(0.3)
        .with_timeout(timeout)?;

    info!(
        chat_model = %args.chat_model,
        embedding_model = %args.embedding_model,
        "using hosted models"
    );
    let retriever = Retriever::new(Arc::new(embedder), config.clone())?;
    let mut answerer = HostedAnswerer::new(Arc::new(chat)).with_limits((&config).into());
    if args.condense_questions {
        answerer = answerer.with_question_condensing();
    }
    Ok(Session::new(retriever, Arc::new(answerer), config)
        .with_studio(Studio::new(Arc::new(studio_model))))
}
