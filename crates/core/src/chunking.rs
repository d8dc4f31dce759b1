use crate::error::PipelineError;
use crate::models::{Chunk, DigestOptions, DEFAULT_SENTENCES_PER_CHUNK};
use crate::sentences::SentenceTokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub sentences_per_chunk: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
        }
    }
}

impl From<DigestOptions> for ChunkingConfig {
    fn from(value: DigestOptions) -> Self {
        Self {
            sentences_per_chunk: value.sentences_per_chunk,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sentences_per_chunk == 0 {
            return Err(PipelineError::InvalidConfig(
                "sentences_per_chunk must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Consecutive, non-overlapping windows of `size` sentences joined by a
/// single space. The last window may be shorter.
pub fn sentence_windows(sentences: &[String], size: usize) -> Vec<String> {
    sentences
        .chunks(size.max(1))
        .map(|window| window.join(" ").trim().to_string())
        .collect()
}

pub fn chunk_page(
    page_text: &str,
    page: u32,
    source_file: &str,
    config: ChunkingConfig,
    tokenizer: &dyn SentenceTokenizer,
) -> Vec<Chunk> {
    let sentences = tokenizer.split(page_text);

    sentence_windows(&sentences, config.sentences_per_chunk)
        .iter()
        .filter_map(|content| Chunk::new(content, page, source_file))
        .collect()
}
