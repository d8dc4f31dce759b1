use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SummarizationError;
use crate::http::EndpointConfig;
use crate::sentences::SentenceTokenizer;

pub const DEFAULT_SUMMARIZER_MODEL: &str = "sshleifer/distilbart-cnn-6-6";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Length bounds are hints in words/tokens, as the backend counts them.
    async fn summarize(
        &self,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, SummarizationError>;
}

#[async_trait]
impl<S: Summarizer + ?Sized> Summarizer for Box<S> {
    async fn summarize(
        &self,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, SummarizationError> {
        (**self).summarize(text, min_length, max_length).await
    }
}

/// Extractive summary: leading sentences until `min_length` words are
/// collected, never exceeding `max_length` words.
pub struct LeadSentenceSummarizer<T> {
    tokenizer: T,
}

impl<T: SentenceTokenizer> LeadSentenceSummarizer<T> {
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }
}

#[async_trait]
impl<T> Summarizer for LeadSentenceSummarizer<T>
where
    T: SentenceTokenizer + Send + Sync,
{
    async fn summarize(
        &self,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, SummarizationError> {
        let sentences = self.tokenizer.split(text);
        if sentences.is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let max_length = max_length.max(1);
        let mut words: Vec<&str> = Vec::new();

        for sentence in &sentences {
            if words.len() >= min_length.max(1) {
                break;
            }
            for word in sentence.split_whitespace() {
                if words.len() == max_length {
                    break;
                }
                words.push(word);
            }
        }

        Ok(words.join(" "))
    }
}

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

/// Abstractive summaries from a summarization endpoint that answers with
/// `[{"summary_text": "..."}]`.
#[derive(Debug, Clone)]
pub struct HttpSummarizer {
    client: Client,
    config: EndpointConfig,
}

impl HttpSummarizer {
    pub fn new(config: EndpointConfig) -> Result<Self, SummarizationError> {
        Ok(Self {
            client: config.client()?,
            config,
        })
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(
        &self,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let payload = SummarizationRequest {
            inputs: text,
            parameters: SummarizationParameters {
                min_length,
                max_length,
                do_sample: false,
            },
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let response = self.config.post(&self.client).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SummarizationError::Backend(format!(
                "summarization request to {} returned {status}: {body}",
                self.config.endpoint
            )));
        }

        parse_summary(&body)
    }
}

fn parse_summary(body: &str) -> Result<String, SummarizationError> {
    let outputs: Vec<SummarizationOutput> = serde_json::from_str(body)
        .map_err(|error| SummarizationError::BackendResponse(error.to_string()))?;

    outputs
        .into_iter()
        .next()
        .map(|output| output.summary_text.trim().to_string())
        .filter(|summary| !summary.is_empty())
        .ok_or_else(|| SummarizationError::BackendResponse("no summary_text returned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentences::PunctuationSentenceTokenizer;

    fn summarizer() -> LeadSentenceSummarizer<PunctuationSentenceTokenizer> {
        LeadSentenceSummarizer::new(
            PunctuationSentenceTokenizer::new().expect("boundary pattern compiles"),
        )
    }

    #[tokio::test]
    async fn lead_summary_stops_after_min_length_words() {
        let text = "One two three. Four five six. Seven eight nine.";
        let summary = summarizer().summarize(text, 4, 100).await.expect("summary");
        assert_eq!(summary, "One two three. Four five six.");
    }

    #[tokio::test]
    async fn lead_summary_is_capped_at_max_length_words() {
        let text = "One two three four five six seven eight.";
        let summary = summarizer().summarize(text, 2, 3).await.expect("summary");
        assert_eq!(summary, "One two three");
    }

    #[tokio::test]
    async fn lead_summary_of_blank_text_fails() {
        let result = summarizer().summarize("  ", 1, 10).await;
        assert!(matches!(result, Err(SummarizationError::EmptyInput)));
    }

    #[test]
    fn summary_payload_is_parsed() {
        let summary =
            parse_summary(r#"[{"summary_text": " A short digest. "}]"#).expect("summary parses");
        assert_eq!(summary, "A short digest.");

        assert!(parse_summary("[]").is_err());
        assert!(parse_summary(r#"{"error": "model loading"}"#).is_err());
    }
}
