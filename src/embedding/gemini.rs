//! Gemini embedding provider, reached over HTTP with `GEMINI_API_KEY`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Embedder, EmbeddingError, TaskType};

const GEMINI_EMBED_MODEL: &str = "gemini-embedding-001";
const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-embedding-001:batchEmbedContents";

/// HTTP client for the Gemini embeddings API.
///
/// Maps the closed [`TaskType`] enum to the provider's wire string at the
/// request boundary — no unvalidated string ever reaches the network call.
/// Any transport failure, non-success status, or malformed response degrades
/// to an empty batch (logged), per the embedder contract.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    dimension: usize,
}

impl GeminiEmbedder {
    /// Builds a client for `api_key` producing vectors of `dimension`.
    pub fn new(api_key: String, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            dimension,
        }
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
    #[serde(rename = "taskType")]
    task_type: String,
    #[serde(rename = "outputDimensionality")]
    output_dimensionality: usize,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, texts: &[String], task_type: TaskType) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }

        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: format!("models/{GEMINI_EMBED_MODEL}"),
                    content: Content {
                        parts: vec![Part { text: text.clone() }],
                    },
                    task_type: task_type.as_wire_str().to_string(),
                    output_dimensionality: self.dimension,
                })
                .collect(),
        };

        let response = match self
            .client
            .post(GEMINI_ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = EmbeddingError::RequestFailed(e.to_string());
                warn!(error = %err, "swallowing embedding failure, returning empty batch");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let err = EmbeddingError::ProviderStatus { status, body };
            warn!(error = %err, "swallowing embedding failure, returning empty batch");
            return Vec::new();
        }

        let parsed: BatchEmbedResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                let err = EmbeddingError::MalformedResponse(e.to_string());
                warn!(error = %err, "swallowing embedding failure, returning empty batch");
                return Vec::new();
            }
        };

        if parsed.embeddings.len() != texts.len() {
            let err = EmbeddingError::MalformedResponse(format!(
                "expected {} vectors, got {}",
                texts.len(),
                parsed.embeddings.len()
            ));
            warn!(error = %err, "swallowing embedding failure, returning empty batch");
            return Vec::new();
        }

        parsed
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
