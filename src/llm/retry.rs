use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{CompletionRequest, LlmClient};
use crate::error::{NpcError, Result};

/// Bounds on how long and how often one generation call may be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Wraps any client with a per-attempt timeout and exponential backoff.
/// Only errors that report themselves retryable are attempted again.
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: LlmClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<Value> {
        match tokio::time::timeout(self.policy.timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(NpcError::Timeout(self.policy.timeout)),
        }
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for RetryingClient<C> {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value> {
        let mut delay = self.policy.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.attempt(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "⏳ {} call failed ({}), retry {}/{} after {:?}",
                        request.schema.name,
                        e,
                        attempt,
                        self.policy.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;
    use crate::schema;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the given error a fixed number of times, then succeeds
    struct Flaky {
        failures: u32,
        status: u16,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmClient for Flaky {
        async fn generate(&self, _request: &CompletionRequest) -> Result<Value> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(NpcError::Api { status: self.status, body: "busy".into() })
            } else {
                Ok(json!({ "ok": true }))
            }
        }
    }

    struct Slow;

    #[async_trait]
    impl LlmClient for Slow {
        async fn generate(&self, _request: &CompletionRequest) -> Result<Value> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(json!({}))
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("hi")], schema::relationship_sheet(), 0.7)
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let client = RetryingClient::new(
            Flaky { failures: 2, status: 503, calls: AtomicU32::new(0) },
            policy(2),
        );
        assert!(client.generate(&request()).await.is_ok());
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let client = RetryingClient::new(
            Flaky { failures: 5, status: 429, calls: AtomicU32::new(0) },
            policy(1),
        );
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, NpcError::Api { status: 429, .. }));
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let client = RetryingClient::new(
            Flaky { failures: 1, status: 400, calls: AtomicU32::new(0) },
            policy(3),
        );
        assert!(client.generate(&request()).await.is_err());
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let client = RetryingClient::new(
            Slow,
            RetryPolicy {
                max_retries: 0,
                initial_backoff: Duration::from_millis(1),
                timeout: Duration::from_millis(20),
            },
        );
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, NpcError::Timeout(_)));
    }
}
