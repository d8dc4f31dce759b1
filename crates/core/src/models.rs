use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chunking::ChunkingConfig;
use crate::error::PipelineError;

pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 3;
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_SUMMARY_MIN_LENGTH: usize = 40;
pub const DEFAULT_SUMMARY_MAX_LENGTH: usize = 180;
pub const SUMMARY_FALLBACK: &str = "Summary generation failed.";

/// A sentence window of one page. Construction rejects blank content and
/// page zero, so every `Chunk` in the system satisfies both invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    content: String,
    section_title: String,
    page: u32,
    source_file: String,
}

impl Chunk {
    pub fn new(content: &str, page: u32, source_file: impl Into<String>) -> Option<Self> {
        let content = content.trim();
        if content.is_empty() || page == 0 {
            return None;
        }

        Some(Self {
            content: content.to_string(),
            section_title: page_section_title(page),
            page,
            source_file: source_file.into(),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn section_title(&self) -> &str {
        &self.section_title
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }
}

/// Placeholder section title until real heading detection exists.
pub fn page_section_title(page: u32) -> String {
    format!("Page {page}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopChunk {
    pub document: String,
    pub page: u32,
    pub section_title: String,
    pub importance_rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub top_chunks: Vec<TopChunk>,
    pub refined_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestRequest {
    pub persona: String,
    pub job_to_be_done: String,
}

impl DigestRequest {
    pub fn new(persona: impl Into<String>, job_to_be_done: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            job_to_be_done: job_to_be_done.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.persona.trim().is_empty() && self.job_to_be_done.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "persona and job_to_be_done are both empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The text embedded as the ranking query.
    pub fn query_text(&self) -> String {
        format!(
            "As a {}, I need to: {}",
            self.persona.trim(),
            self.job_to_be_done.trim()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    pub sentences_per_chunk: usize,
    pub top_k: usize,
    pub summary_min_length: usize,
    pub summary_max_length: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
            top_k: DEFAULT_TOP_K,
            summary_min_length: DEFAULT_SUMMARY_MIN_LENGTH,
            summary_max_length: DEFAULT_SUMMARY_MAX_LENGTH,
        }
    }
}

impl DigestOptions {
    pub fn validate(&self) -> Result<(), PipelineError> {
        ChunkingConfig::from(*self).validate()?;
        if self.top_k == 0 {
            return Err(PipelineError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.summary_min_length > self.summary_max_length {
            return Err(PipelineError::InvalidConfig(format!(
                "summary_min_length ({}) exceeds summary_max_length ({})",
                self.summary_min_length, self.summary_max_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_rejects_blank_content_and_page_zero() {
        assert!(Chunk::new("   \n\t", 1, "a.pdf").is_none());
        assert!(Chunk::new("Some text.", 0, "a.pdf").is_none());
    }

    #[test]
    fn chunk_trims_content_and_uses_page_title() {
        let chunk = Chunk::new("  Valves must be inspected.  ", 4, "manual.pdf")
            .expect("chunk should be valid");
        assert_eq!(chunk.content(), "Valves must be inspected.");
        assert_eq!(chunk.section_title(), "Page 4");
        assert_eq!(chunk.page(), 4);
        assert_eq!(chunk.source_file(), "manual.pdf");
    }

    #[test]
    fn query_text_combines_persona_and_job() {
        let request = DigestRequest::new("Travel Planner", "Plan a 4 day trip");
        assert_eq!(
            request.query_text(),
            "As a Travel Planner, I need to: Plan a 4 day trip"
        );
    }

    #[test]
    fn options_validation_rejects_degenerate_values() {
        assert!(DigestOptions::default().validate().is_ok());

        let zero_window = DigestOptions {
            sentences_per_chunk: 0,
            ..DigestOptions::default()
        };
        assert!(zero_window.validate().is_err());

        let zero_k = DigestOptions {
            top_k: 0,
            ..DigestOptions::default()
        };
        assert!(zero_k.validate().is_err());

        let inverted = DigestOptions {
            summary_min_length: 200,
            summary_max_length: 100,
            ..DigestOptions::default()
        };
        assert!(inverted.validate().is_err());
    }
}
