use crate::chunking::ChunkingConfig;
use crate::embeddings::Embedder;
use crate::error::{EmbeddingError, EmptyCorpus, PipelineError};
use crate::extractor::PdfExtractor;
use crate::ingest::{discover_pdf_files, ingest_files_best_effort, SkippedPdf};
use crate::models::{Chunk, DigestOptions, DigestRequest, Report, ScoredChunk, SUMMARY_FALLBACK};
use crate::ranking::rank_chunks;
use crate::report::build_report;
use crate::sentences::SentenceTokenizer;
use crate::summarizer::Summarizer;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DigestOutcome {
    pub report: Report,
    pub skipped_files: Vec<SkippedPdf>,
    pub chunk_count: usize,
    pub summary_fallback: bool,
}

pub struct DigestPipeline<X, T, E, S>
where
    X: PdfExtractor,
    T: SentenceTokenizer,
    E: Embedder,
    S: Summarizer,
{
    extractor: X,
    tokenizer: T,
    embedder: E,
    summarizer: S,
    options: DigestOptions,
}

impl<X, T, E, S> DigestPipeline<X, T, E, S>
where
    X: PdfExtractor,
    T: SentenceTokenizer,
    E: Embedder,
    S: Summarizer,
{
    pub fn new(
        extractor: X,
        tokenizer: T,
        embedder: E,
        summarizer: S,
        options: DigestOptions,
    ) -> Result<Self, PipelineError> {
        options.validate()?;
        Ok(Self {
            extractor,
            tokenizer,
            embedder,
            summarizer,
            options,
        })
    }

    /// Digests every PDF directly inside `folder`.
    pub async fn run_folder(
        &self,
        folder: &Path,
        request: &DigestRequest,
    ) -> Result<DigestOutcome, PipelineError> {
        let files = discover_pdf_files(folder).map_err(|source| PipelineError::InputFolder {
            path: folder.to_path_buf(),
            source,
        })?;
        if files.is_empty() {
            return Err(PipelineError::EmptyCorpus(EmptyCorpus::NoPdfFiles));
        }
        self.run(&files, request, Utc::now()).await
    }

    pub async fn run(
        &self,
        files: &[PathBuf],
        request: &DigestRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<DigestOutcome, PipelineError> {
        request.validate()?;
        if files.is_empty() {
            return Err(PipelineError::EmptyCorpus(EmptyCorpus::NoPdfFiles));
        }

        let ingestion = ingest_files_best_effort(
            files,
            &self.extractor,
            &self.tokenizer,
            ChunkingConfig::from(self.options),
        );
        info!(
            files = files.len(),
            skipped = ingestion.skipped_files.len(),
            chunks = ingestion.chunks.len(),
            "documents chunked"
        );

        if ingestion.chunks.is_empty() {
            return Err(PipelineError::EmptyCorpus(EmptyCorpus::NoChunks));
        }
        let chunk_count = ingestion.chunks.len();

        let top = self.rank(request, ingestion.chunks).await?;
        let (refined_text, summary_fallback) = self.summarize(&top).await;

        let report = build_report(&ingestion.documents, request, timestamp, &top, &refined_text);

        Ok(DigestOutcome {
            report,
            skipped_files: ingestion.skipped_files,
            chunk_count,
            summary_fallback,
        })
    }

    async fn rank(
        &self,
        request: &DigestRequest,
        chunks: Vec<Chunk>,
    ) -> Result<Vec<ScoredChunk>, PipelineError> {
        let query_vector = self.embedder.embed(&request.query_text()).await?;
        let contents: Vec<String> = chunks.iter().map(|chunk| chunk.content().to_string()).collect();
        let chunk_vectors = self.embedder.embed_batch(&contents).await?;

        if chunk_vectors.len() != chunks.len() {
            return Err(EmbeddingError::Malformed(format!(
                "expected {} chunk vectors, got {}",
                chunks.len(),
                chunk_vectors.len()
            ))
            .into());
        }
        if let Some(vector) = chunk_vectors
            .iter()
            .find(|vector| vector.len() != query_vector.len())
        {
            return Err(EmbeddingError::DimensionMismatch {
                expected: query_vector.len(),
                actual: vector.len(),
            }
            .into());
        }

        info!(
            model = self.embedder.model_id(),
            dimensions = query_vector.len(),
            chunks = chunks.len(),
            "chunks embedded"
        );

        Ok(rank_chunks(&query_vector, chunks, &chunk_vectors).into_top_k(self.options.top_k))
    }

    async fn summarize(&self, top: &[ScoredChunk]) -> (String, bool) {
        let text = top
            .iter()
            .map(|scored| scored.chunk.content())
            .collect::<Vec<_>>()
            .join(" ");

        match self
            .summarizer
            .summarize(
                &text,
                self.options.summary_min_length,
                self.options.summary_max_length,
            )
            .await
        {
            Ok(summary) => (summary, false),
            Err(error) => {
                warn!(%error, "summary generation failed, using fallback text");
                (SUMMARY_FALLBACK.to_string(), true)
            }
        }
    }
}
