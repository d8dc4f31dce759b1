use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pdf parse error in {path}: {details}")]
    PdfParse { path: PathBuf, details: String },

    #[error("path has no file name: {0}")]
    MissingFileName(PathBuf),
}

impl ExtractionError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::PdfParse { path, .. } | Self::MissingFileName(path) => {
                path
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding backend error: {0}")]
    Backend(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed embedding output: {0}")]
    Malformed(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarization backend error: {0}")]
    Backend(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid response from summarizer: {0}")]
    BackendResponse(String),

    #[error("nothing to summarize")]
    EmptyInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCorpus {
    NoPdfFiles,
    NoChunks,
}

impl std::fmt::Display for EmptyCorpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPdfFiles => f.write_str("no pdf files found"),
            Self::NoChunks => f.write_str("no chunks could be produced from the input documents"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("empty corpus: {0}")]
    EmptyCorpus(EmptyCorpus),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot read input folder {path}: {source}")]
    InputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
