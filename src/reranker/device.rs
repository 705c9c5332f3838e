//! Compute device selection for the reranker's cross-encoder model.

use candle_core::Device;
use tracing::warn;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::config::DevicePreference;
use super::error::RerankerError;

/// Selects the compute device for `preference`.
///
/// [`DevicePreference::Auto`] probes Metal/CUDA (whichever is compiled in)
/// and falls back to CPU on failure. A forced preference
/// ([`DevicePreference::Metal`]/[`DevicePreference::Cuda`]) does not fall
/// back: an unavailable forced device is surfaced as
/// [`RerankerError::DeviceUnavailable`] rather than silently downgraded.
pub fn select_device(preference: DevicePreference) -> Result<Device, RerankerError> {
    match preference {
        DevicePreference::Auto => Ok(autodetect()),
        DevicePreference::Cpu => Ok(Device::Cpu),
        DevicePreference::Metal => {
            #[cfg(feature = "metal")]
            {
                Device::new_metal(0).map_err(|e| RerankerError::DeviceUnavailable {
                    device: "metal".to_string(),
                    reason: e.to_string(),
                })
            }
            #[cfg(not(feature = "metal"))]
            {
                Err(RerankerError::DeviceUnavailable {
                    device: "metal".to_string(),
                    reason: "metal feature not compiled".to_string(),
                })
            }
        }
        DevicePreference::Cuda => {
            #[cfg(feature = "cuda")]
            {
                Device::new_cuda(0).map_err(|e| RerankerError::DeviceUnavailable {
                    device: "cuda".to_string(),
                    reason: e.to_string(),
                })
            }
            #[cfg(not(feature = "cuda"))]
            {
                Err(RerankerError::DeviceUnavailable {
                    device: "cuda".to_string(),
                    reason: "cuda feature not compiled".to_string(),
                })
            }
        }
    }
}

/// Probes Metal/CUDA (whichever is compiled in) and falls back to CPU,
/// logging a warning rather than failing — used only for
/// [`DevicePreference::Auto`].
fn autodetect() -> Device {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU acceleration for reranker");
                return device;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "Metal device unavailable for reranker");
                failures.push(format!("metal failed: {msg}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration for reranker");
                return device;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "CUDA device unavailable for reranker");
                failures.push(format!("cuda failed: {msg}"));
            }
        }
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        debug!("No GPU features enabled for reranker");
    }

    let reason = if !cfg!(any(feature = "metal", feature = "cuda")) {
        "no GPU backend compiled".to_string()
    } else if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };

    warn!(reason = %reason, "Reranker falling back to CPU device");
    Device::Cpu
}
