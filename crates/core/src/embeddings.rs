use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::EmbeddingError;
use crate::http::EndpointConfig;

const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 32;

/// Maps text into a shared vector space. The query and every chunk must go
/// through the same instance.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// One vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl CharacterNgramEmbedder {
    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let mut hash = 1469598103934665603u64;
            for ch in window {
                let mut buffer = [0u8; 4];
                for byte in ch.encode_utf8(&mut buffer).bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(1099511628211);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[async_trait]
impl Embedder for CharacterNgramEmbedder {
    fn model_id(&self) -> &str {
        "character-trigram"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectorize(text))
    }
}

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// Sentence embeddings served by a feature-extraction endpoint that accepts
/// `{"inputs": [...]}` and answers with one vector per input.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    config: EndpointConfig,
    model_id: String,
    batch_size: usize,
}

impl HttpEmbedder {
    pub fn new(config: EndpointConfig, model_id: impl Into<String>) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: config.client()?,
            config,
            model_id: model_id.into(),
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        })
    }

    /// Inputs per request; zero is raised to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let payload = FeatureExtractionRequest {
            inputs,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let response = self.config.post(&self.client).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EmbeddingError::Backend(format!(
                "embedding request to {} returned {status}: {body}",
                self.config.endpoint
            )));
        }

        parse_feature_vectors(&body, inputs.len())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Malformed("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            debug!(model = %self.model_id, batch = batch.len(), "embedding batch");
            vectors.extend(self.request(batch).await?);
        }
        Ok(vectors)
    }
}

fn parse_feature_vectors(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let vectors: Vec<Vec<f32>> = serde_json::from_str(body)
        .map_err(|error| EmbeddingError::Malformed(format!("expected a list of vectors: {error}")))?;

    if vectors.len() != expected {
        return Err(EmbeddingError::Malformed(format!(
            "expected {expected} vectors, got {}",
            vectors.len()
        )));
    }

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::{
        parse_feature_vectors, CharacterNgramEmbedder, Embedder, HttpEmbedder,
        DEFAULT_EMBEDDING_BATCH_SIZE,
    };
    use crate::error::EmbeddingError;
    use crate::http::EndpointConfig;

    #[tokio::test]
    async fn embedder_is_deterministic() {
        let embedder = CharacterNgramEmbedder::default();
        let first = embedder.embed("Coastal towns and seafood").await.expect("embed");
        let second = embedder.embed("Coastal towns and seafood").await.expect("embed");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn embedder_outputs_expected_length_and_unit_norm() {
        let embedder = CharacterNgramEmbedder { dimensions: 32 };
        let vector = embedder.embed("abcdef").await.expect("embed");
        assert_eq!(vector.len(), 32);

        let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn short_text_embeds_to_zero_vector() {
        let embedder = CharacterNgramEmbedder { dimensions: 8 };
        let vector = embedder.embed("ab").await.expect("embed");
        assert!(vector.iter().all(|value| *value == 0.0));
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let embedder = CharacterNgramEmbedder::default();
        let texts = vec!["first text".to_string(), "second text".to_string()];
        let batch = embedder.embed_batch(&texts).await.expect("embed batch");
        assert_eq!(batch[0], embedder.embed("first text").await.expect("embed"));
        assert_eq!(batch[1], embedder.embed("second text").await.expect("embed"));
    }

    #[test]
    fn feature_vectors_must_match_input_count() {
        let parsed = parse_feature_vectors("[[0.1, 0.2], [0.3, 0.4]]", 2).expect("two vectors");
        assert_eq!(parsed[1], vec![0.3, 0.4]);

        assert!(matches!(
            parse_feature_vectors("[[0.1, 0.2]]", 2),
            Err(EmbeddingError::Malformed(_))
        ));
        assert!(matches!(
            parse_feature_vectors("{\"error\": \"loading\"}", 1),
            Err(EmbeddingError::Malformed(_))
        ));
    }

    #[test]
    fn batch_size_is_configurable_and_never_zero() -> Result<(), Box<dyn std::error::Error>> {
        let config = EndpointConfig::parse("http://localhost:8080/embed", None)?;
        let embedder = HttpEmbedder::new(config, "test-model")?;
        assert_eq!(embedder.batch_size, DEFAULT_EMBEDDING_BATCH_SIZE);

        assert_eq!(embedder.clone().with_batch_size(8).batch_size, 8);
        assert_eq!(embedder.with_batch_size(0).batch_size, 1);
        Ok(())
    }
}
