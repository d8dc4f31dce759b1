use chrono::Utc;
use clap::Parser;
use persona_digest_core::{
    write_report, CharacterNgramEmbedder, DigestOptions, DigestPipeline, DigestRequest, Embedder,
    EndpointConfig, HttpEmbedder, HttpSummarizer, LeadSentenceSummarizer, LopdfExtractor,
    PipelineError, PunctuationSentenceTokenizer, Summarizer, DEFAULT_EMBEDDING_BATCH_SIZE,
    DEFAULT_EMBEDDING_MODEL,
    DEFAULT_SENTENCES_PER_CHUNK, DEFAULT_SUMMARY_MAX_LENGTH, DEFAULT_SUMMARY_MIN_LENGTH,
    DEFAULT_TOP_K,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "persona-digest", version)]
struct Cli {
    /// Folder whose top-level PDFs are digested
    #[arg(long, env = "DIGEST_INPUT_DIR", default_value = "/app/input")]
    input_dir: PathBuf,

    /// Folder that receives the report
    #[arg(long, env = "DIGEST_OUTPUT_DIR", default_value = "/app/output")]
    output_dir: PathBuf,

    /// Report file name inside the output folder
    #[arg(long, env = "DIGEST_OUTPUT_FILE", default_value = "result.json")]
    output_file: String,

    /// Who is asking
    #[arg(long, env = "DIGEST_PERSONA", default_value = "Travel Planner")]
    persona: String,

    /// What they need to get done
    #[arg(
        long,
        env = "DIGEST_JOB",
        default_value = "Plan a trip of 4 days for a group of 10 college friends."
    )]
    job: String,

    /// Sentences joined into one chunk
    #[arg(long, env = "DIGEST_SENTENCES_PER_CHUNK", default_value_t = DEFAULT_SENTENCES_PER_CHUNK)]
    sentences_per_chunk: usize,

    /// Number of chunks reported and summarized
    #[arg(long, env = "DIGEST_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Lower length hint passed to the summarizer
    #[arg(long, env = "DIGEST_SUMMARY_MIN_LENGTH", default_value_t = DEFAULT_SUMMARY_MIN_LENGTH)]
    summary_min_length: usize,

    /// Upper length hint passed to the summarizer
    #[arg(long, env = "DIGEST_SUMMARY_MAX_LENGTH", default_value_t = DEFAULT_SUMMARY_MAX_LENGTH)]
    summary_max_length: usize,

    /// Feature-extraction endpoint; the local trigram embedder is used when unset
    #[arg(long, env = "EMBEDDING_ENDPOINT")]
    embedding_endpoint: Option<String>,

    /// Model name recorded for the embedding endpoint
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Texts sent per request to the embedding endpoint
    #[arg(long, env = "EMBEDDING_BATCH_SIZE", default_value_t = DEFAULT_EMBEDDING_BATCH_SIZE)]
    embedding_batch_size: usize,

    /// Summarization endpoint; the local lead-sentence summarizer is used when unset
    #[arg(long, env = "SUMMARIZER_ENDPOINT")]
    summarizer_endpoint: Option<String>,

    /// Bearer token sent to both endpoints
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
}

fn build_embedder(cli: &Cli) -> anyhow::Result<Box<dyn Embedder>> {
    match cli.embedding_endpoint.as_deref().map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => {
            let config = EndpointConfig::parse(endpoint, cli.api_token.clone())?;
            let embedder = HttpEmbedder::new(config, &cli.embedding_model)?
                .with_batch_size(cli.embedding_batch_size);
            Ok(Box::new(embedder))
        }
        _ => Ok(Box::new(CharacterNgramEmbedder::default())),
    }
}

fn build_summarizer(cli: &Cli) -> anyhow::Result<Box<dyn Summarizer>> {
    match cli.summarizer_endpoint.as_deref().map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => {
            let config = EndpointConfig::parse(endpoint, cli.api_token.clone())?;
            Ok(Box::new(HttpSummarizer::new(config)?))
        }
        _ => Ok(Box::new(LeadSentenceSummarizer::new(
            PunctuationSentenceTokenizer::new()?,
        ))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        input_dir = %cli.input_dir.display(),
        "persona-digest boot"
    );

    let options = DigestOptions {
        sentences_per_chunk: cli.sentences_per_chunk,
        top_k: cli.top_k,
        summary_min_length: cli.summary_min_length,
        summary_max_length: cli.summary_max_length,
    };
    let request = DigestRequest::new(cli.persona.clone(), cli.job.clone());

    let embedder = build_embedder(&cli)?;
    let summarizer = build_summarizer(&cli)?;
    info!(model = embedder.model_id(), "capabilities loaded");

    let pipeline = DigestPipeline::new(
        LopdfExtractor,
        PunctuationSentenceTokenizer::new()?,
        embedder,
        summarizer,
        options,
    )?;

    let outcome = match pipeline.run_folder(&cli.input_dir, &request).await {
        Ok(outcome) => outcome,
        Err(PipelineError::EmptyCorpus(reason)) => {
            info!(%reason, input_dir = %cli.input_dir.display(), "nothing to digest");
            println!(
                "Nothing to digest in {}: {reason}. No report written.",
                cli.input_dir.display()
            );
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    if !outcome.skipped_files.is_empty() {
        warn!(
            "skipped_files={} for folder={}",
            outcome.skipped_files.len(),
            cli.input_dir.display()
        );
    }
    if outcome.summary_fallback {
        warn!("report uses the fallback summary");
    }

    let output_path = cli.output_dir.join(&cli.output_file);
    write_report(&output_path, &outcome.report).await?;

    println!(
        "{} chunks ranked from {} documents, top {} written to {}",
        outcome.chunk_count,
        outcome.report.metadata.input_documents.len(),
        outcome.report.top_chunks.len(),
        output_path.display()
    );

    Ok(())
}
