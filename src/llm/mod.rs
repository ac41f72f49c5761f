//! 生成层：客户端抽象与实现（OpenAI 兼容 / Mock / 脚本化测试替身）与超时重试装饰器

pub mod message;
pub mod mock;
pub mod openai;
pub mod retry;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use message::{conversation, Message, Role};
pub use mock::{MockLlmClient, RecordedCall, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use retry::{RetryConfig, RetryingLlmClient};
pub use traits::{first_completion, GenerationParams, LlmClient};

use crate::config::AppConfig;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// 按配置创建生成客户端；真实后端外面套一层 RetryingLlmClient
///
/// - provider = "mock"，或找不到对应 API Key 时，使用 MockLlmClient
/// - provider = "deepseek" 优先读 `DEEPSEEK_API_KEY`，base_url 默认为 DeepSeek 官方端点
/// - 其余按 OpenAI 兼容端点处理，读 `OPENAI_API_KEY`
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let retry = RetryConfig {
        request_timeout: Duration::from_secs(cfg.llm.timeouts.request),
        max_retries: cfg.llm.max_retries,
        ..RetryConfig::default()
    };

    let client: OpenAiClient = match provider.as_str() {
        "mock" => {
            tracing::info!("Using Mock LLM");
            return Arc::new(MockLlmClient);
        }
        "deepseek" => {
            let Some(key) = std::env::var("DEEPSEEK_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            else {
                tracing::warn!("No DEEPSEEK_API_KEY / OPENAI_API_KEY set, using Mock LLM");
                return Arc::new(MockLlmClient);
            };
            let base = cfg.llm.base_url.as_deref().unwrap_or(DEEPSEEK_BASE_URL);
            tracing::info!("Using DeepSeek LLM ({})", cfg.llm.model);
            OpenAiClient::new(Some(base), &cfg.llm.model, Some(key.as_str()))
        }
        _ => {
            let Ok(key) = std::env::var("OPENAI_API_KEY") else {
                tracing::warn!("No OPENAI_API_KEY set, using Mock LLM");
                return Arc::new(MockLlmClient);
            };
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
            OpenAiClient::new(cfg.llm.base_url.as_deref(), &cfg.llm.model, Some(key.as_str()))
        }
    };

    Arc::new(RetryingLlmClient::new(Arc::new(client), retry))
}
