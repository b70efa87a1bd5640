//! Model invocation with bounded retry
//!
//! One fixed-backoff retry on transient provider failures. Auth and
//! invalid-request errors surface immediately.

use super::{ChatRequest, ChatResponse, LlmError, LlmService};
use std::sync::Arc;
use std::time::Duration;

/// Fixed backoff before the single retry
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Shared handle for making model calls
#[derive(Clone)]
pub struct ModelInvoker {
    service: Arc<dyn LlmService>,
}

impl ModelInvoker {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }

    /// Make a chat request, retrying exactly once on a transient failure.
    pub async fn invoke(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        match self.service.chat(request).await {
            Ok(response) => Ok(response),
            Err(e) if e.kind.is_retryable() => {
                tracing::warn!(
                    model = %self.service.model_id(),
                    error = %e.message,
                    backoff_secs = RETRY_BACKOFF.as_secs(),
                    "transient provider failure, retrying once"
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.service.chat(request).await
            }
            Err(e) => Err(e),
        }
    }
}
