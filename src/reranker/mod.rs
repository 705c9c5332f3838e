//! Cross-encoder reranker: re-orders candidate documents by a learned
//! pairwise relevance score.

pub mod bert;
pub mod config;
pub mod device;
pub mod error;
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{DevicePreference, MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockReranker;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use bert::BertCrossEncoder;
use device::select_device;
use utils::load_tokenizer_with_truncation;

/// Re-orders `docs` in descending order of a scalar relevance score computed
/// for each `(query, doc)` pair. A pure function of its inputs: no hidden
/// state observable to the caller, and the output is always a permutation of
/// the input (length preserved).
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Reorders `docs` by relevance to `query`.
    async fn rerank(&self, query: &str, docs: Vec<String>) -> Result<Vec<String>, RerankerError>;
}

/// BERT cross-encoder reranker (e.g. `ms-marco-MiniLM-L-12-v2`-shaped).
///
/// When no model directory is configured, falls back to a deterministic
/// lexical-overlap heuristic so the service remains fully operable without a
/// model on disk; the fallback still satisfies the permutation and
/// determinism contract.
pub struct CrossEncoderReranker {
    device: Device,
    model: Option<(BertCrossEncoder, Tokenizer)>,
}

impl CrossEncoderReranker {
    /// Loads a reranker per `config`, falling back to the lexical stub if no
    /// model path is configured.
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        let device = select_device(config.device)?;
        debug!(?device, "Selected compute device for reranker");

        let Some(model_path) = config.model_path else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                model: None,
            });
        };

        if !model_path.exists() {
            return Err(RerankerError::ModelNotFound { path: model_path });
        }

        info!(model_path = %model_path.display(), "Loading cross-encoder reranker model");

        let model = BertCrossEncoder::load(&model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("failed to load BERT cross-encoder: {e}"),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, MAX_SEQ_LEN).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("failed to load tokenizer: {e}"),
            }
        })?;

        info!("Cross-encoder reranker model loaded successfully");

        Ok(Self {
            device,
            model: Some((model, tokenizer)),
        })
    }

    /// Builds a reranker that always runs the lexical stub.
    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    /// Whether a real cross-encoder model is loaded (as opposed to the
    /// lexical-overlap stub).
    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        if let Some((model, tokenizer)) = &self.model {
            let tokens = tokenizer
                .encode((query, candidate), true)
                .map_err(|e| RerankerError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

            let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
            let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
            let attention_mask =
                Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

            let logits = model.forward(&token_ids, &type_ids, Some(&attention_mask))?;
            let score = logits.flatten_all()?.to_vec1::<f32>()?[0];
            return Ok(score);
        }

        Ok(lexical_overlap_score(query, candidate))
    }
}

#[async_trait]
impl Reranker for CrossEncoderReranker {
    async fn rerank(&self, query: &str, docs: Vec<String>) -> Result<Vec<String>, RerankerError> {
        let mut scored = docs
            .into_iter()
            .map(|doc| {
                let score = self.score(query, &doc)?;
                Ok((doc, score))
            })
            .collect::<Result<Vec<_>, RerankerError>>()?;

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }
}

/// Deterministic fallback relevance score: fraction of the query's
/// whitespace-separated tokens (case-folded) that also appear in the
/// candidate document.
fn lexical_overlap_score(query: &str, candidate: &str) -> f32 {
    let query_tokens: std::collections::HashSet<String> =
        query.split_whitespace().map(|t| t.to_lowercase()).collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let candidate_lower = candidate.to_lowercase();
    let matches = query_tokens
        .iter()
        .filter(|token| candidate_lower.contains(token.as_str()))
        .count();

    matches as f32 / query_tokens.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_reranker_is_a_permutation() {
        let reranker = CrossEncoderReranker::stub().unwrap();
        let docs = vec![
            "the quick brown fox".to_string(),
            "completely unrelated text".to_string(),
            "a fox jumps".to_string(),
        ];
        let mut expected = docs.clone();
        expected.sort();

        let mut reranked = reranker.rerank("fox", docs).await.unwrap();
        reranked.sort();

        assert_eq!(reranked, expected);
    }

    #[tokio::test]
    async fn stub_reranker_favors_lexical_overlap() {
        let reranker = CrossEncoderReranker::stub().unwrap();
        let docs = vec![
            "no match here".to_string(),
            "fox fox fox".to_string(),
        ];
        let reranked = reranker.rerank("fox", docs).await.unwrap();
        assert_eq!(reranked[0], "fox fox fox");
    }

    #[test]
    fn lexical_overlap_handles_empty_query() {
        assert_eq!(lexical_overlap_score("", "anything"), 0.0);
    }
}
