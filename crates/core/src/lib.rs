pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod http;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod ranking;
pub mod report;
pub mod sentences;
pub mod summarizer;

pub use chunking::{chunk_page, normalize_whitespace, sentence_windows, ChunkingConfig};
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, HttpEmbedder, DEFAULT_EMBEDDING_BATCH_SIZE,
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
};
pub use error::{
    EmbeddingError, EmptyCorpus, ExtractionError, PipelineError, SummarizationError,
};
pub use extractor::{LopdfExtractor, PageText, PdfExtractor};
pub use http::EndpointConfig;
pub use ingest::{
    chunk_document, discover_pdf_files, ingest_files_best_effort, IngestionReport, SkippedPdf,
};
pub use models::{
    Chunk, DigestOptions, DigestRequest, Report, ReportMetadata, ScoredChunk, TopChunk,
    DEFAULT_SENTENCES_PER_CHUNK, DEFAULT_SUMMARY_MAX_LENGTH, DEFAULT_SUMMARY_MIN_LENGTH,
    DEFAULT_TOP_K, SUMMARY_FALLBACK,
};
pub use orchestrator::{DigestOutcome, DigestPipeline};
pub use ranking::{cosine_similarity, rank_chunks, RankedList};
pub use report::{build_report, write_report};
pub use sentences::{PunctuationSentenceTokenizer, SentenceTokenizer};
pub use summarizer::{HttpSummarizer, LeadSentenceSummarizer, Summarizer, DEFAULT_SUMMARIZER_MODEL};
