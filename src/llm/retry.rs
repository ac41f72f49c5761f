//! 集成边界上的超时 + 重试装饰器
//!
//! 核心循环不处理传输失败；运行器在组装时用 RetryingLlmClient 包一层：每次调用限定超时，失败后按固定间隔重试有限次。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{GenerationParams, LlmClient, Message};

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 单次请求超时
    pub request_timeout: Duration,
    /// 首次失败后的最大重试次数（0 表示不重试）
    pub max_retries: u32,
    /// 两次尝试之间的等待
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// 包装任意 LlmClient，为每次 generate 加超时与有限重试
pub struct RetryingLlmClient {
    inner: Arc<dyn LlmClient>,
    config: RetryConfig,
}

impl RetryingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmClient for RetryingLlmClient {
    async fn generate(
        &self,
        messages: &[Message],
        params: GenerationParams,
    ) -> Result<Vec<String>, String> {
        let mut attempt = 0;
        loop {
            let outcome =
                tokio::time::timeout(self.config.request_timeout, self.inner.generate(messages, params))
                    .await;
            let err = match outcome {
                Ok(Ok(completions)) => return Ok(completions),
                Ok(Err(e)) => e,
                Err(_) => format!(
                    "request timed out after {}s",
                    self.config.request_timeout.as_secs_f32()
                ),
            };
            if attempt >= self.config.max_retries {
                return Err(err);
            }
            attempt += 1;
            tracing::warn!(attempt, max = self.config.max_retries, error = %err, "LLM call failed, retrying");
            tokio::time::sleep(self.config.backoff).await;
        }
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyClient {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmClient for FlakyClient {
        async fn generate(
            &self,
            _messages: &[Message],
            _params: GenerationParams,
        ) -> Result<Vec<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err("connection reset".to_string());
            }
            Ok(vec!["ok".to_string()])
        }
    }

    struct StalledClient;

    #[async_trait]
    impl LlmClient for StalledClient {
        async fn generate(
            &self,
            _messages: &[Message],
            _params: GenerationParams,
        ) -> Result<Vec<String>, String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec!["late".to_string()])
        }
    }

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            request_timeout: Duration::from_millis(50),
            max_retries,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failures() {
        let inner = Arc::new(FlakyClient {
            failures_left: AtomicU32::new(2),
            calls: AtomicU32::new(0),
        });
        let client = RetryingLlmClient::new(inner.clone(), fast_config(2));
        let out = client
            .generate(&[], GenerationParams::new(0.5, 10))
            .await
            .unwrap();
        assert_eq!(out, vec!["ok".to_string()]);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_budget() {
        let inner = Arc::new(FlakyClient {
            failures_left: AtomicU32::new(5),
            calls: AtomicU32::new(0),
        });
        let client = RetryingLlmClient::new(inner.clone(), fast_config(1));
        let err = client
            .generate(&[], GenerationParams::new(0.5, 10))
            .await
            .unwrap_err();
        assert!(err.contains("connection reset"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let client = RetryingLlmClient::new(Arc::new(StalledClient), fast_config(0));
        let err = client
            .generate(&[], GenerationParams::new(0.5, 10))
            .await
            .unwrap_err();
        assert!(err.contains("timed out"));
    }
}
