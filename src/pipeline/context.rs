//! Per-request correlation id and deadline, threaded explicitly through the
//! pipeline instead of a process-wide context variable.

use tokio::time::{Duration, Instant};
use uuid::Uuid;

/// Default per-request deadline applied when a caller doesn't specify one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Explicit request-scoped state: a correlation id for log attribution and a
/// deadline every I/O operation inside `retrieve`/`store` must honor.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    request_id: Uuid,
    deadline: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request id and `timeout` from now.
    pub fn new(timeout: Duration) -> Self {
        Self::with_id(Uuid::new_v4(), timeout)
    }

    /// Creates a context from an already-minted request id (e.g. the one a
    /// gateway middleware assigned and returned as `X-Request-ID`), so every
    /// log line the pipeline emits correlates with the id the client sees.
    pub fn with_id(request_id: Uuid, timeout: Duration) -> Self {
        Self {
            request_id,
            deadline: Instant::now() + timeout,
        }
    }

    /// Creates a context with a fresh request id and `DEFAULT_REQUEST_TIMEOUT`.
    pub fn with_default_timeout() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }

    /// The correlation id to attach to every log record for this request.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Time remaining before the deadline, or `Duration::ZERO` if elapsed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has already elapsed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_id_preserves_the_given_id() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::with_id(id, Duration::from_secs(1));
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn new_and_with_default_timeout_mint_distinct_ids() {
        let a = RequestContext::with_default_timeout();
        let b = RequestContext::with_default_timeout();
        assert_ne!(a.request_id(), b.request_id());
    }
}
