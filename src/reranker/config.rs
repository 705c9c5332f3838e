//! Cross-encoder reranker configuration.

use std::path::PathBuf;

use super::error::RerankerError;

/// Maximum sequence length used for reranker tokenization.
pub const MAX_SEQ_LEN: usize = 512;

/// Explicit compute device preference, overriding the CPU/Metal/CUDA
/// autodetect fallback [`super::device::select_device`] otherwise performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// Try Metal/CUDA (whichever is compiled in), falling back to CPU.
    #[default]
    Auto,
    /// Force CPU.
    Cpu,
    /// Force Metal; fails rather than falling back if unavailable.
    Metal,
    /// Force CUDA; fails rather than falling back if unavailable.
    Cuda,
}

/// Configuration for [`super::CrossEncoderReranker`].
#[derive(Debug, Clone, Default)]
pub struct RerankerConfig {
    /// Directory containing `config.json`, `model.safetensors`, and
    /// tokenizer files. `None` runs the deterministic lexical-overlap stub.
    pub model_path: Option<PathBuf>,
    /// Compute device to use. Defaults to autodetect-with-CPU-fallback.
    pub device: DevicePreference,
}

impl RerankerConfig {
    /// Creates a config pointing at a cross-encoder model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            device: DevicePreference::Auto,
        }
    }

    /// Creates a config that runs the stub scorer without a model.
    pub fn stub() -> Self {
        Self {
            model_path: None,
            device: DevicePreference::Auto,
        }
    }

    /// Loads config from `RERANKER_MODEL_PATH` and `RERANKER_DEVICE`.
    ///
    /// `RERANKER_DEVICE`, if set, must be one of `auto`, `cpu`, `metal`, or
    /// `cuda` (case-insensitive); any other value is a rejected configuration
    /// rather than a silent fallback.
    pub fn from_env() -> Result<Self, RerankerError> {
        let model_path = std::env::var("RERANKER_MODEL_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let device = match std::env::var("RERANKER_DEVICE") {
            Ok(raw) if !raw.trim().is_empty() => match raw.trim().to_lowercase().as_str() {
                "auto" => DevicePreference::Auto,
                "cpu" => DevicePreference::Cpu,
                "metal" => DevicePreference::Metal,
                "cuda" => DevicePreference::Cuda,
                other => {
                    return Err(RerankerError::InvalidConfig {
                        reason: format!(
                            "RERANKER_DEVICE='{other}' is not one of auto, cpu, metal, cuda"
                        ),
                    });
                }
            },
            _ => DevicePreference::Auto,
        };

        Ok(Self { model_path, device })
    }
}
