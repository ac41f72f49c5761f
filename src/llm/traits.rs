//! 生成服务抽象
//!
//! 所有后端（OpenAI 兼容 / Mock / 测试脚本）实现 LlmClient：给定对话与采样参数，返回若干候选补全。
//! 流水线始终只读取第一条候选（见 `first_completion`）。

use async_trait::async_trait;

use crate::core::PipelineError;
use crate::llm::Message;

/// 单次调用的采样参数：温度 + 最大生成 token 数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// LLM 客户端 trait：阻塞式请求/响应（一次只有一个未完成调用）
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 生成补全；返回的列表至少应含一条，否则视为响应格式错误
    async fn generate(
        &self,
        messages: &[Message],
        params: GenerationParams,
    ) -> Result<Vec<String>, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

/// 调用生成服务并取第一条候选；传输失败与空候选列表都作为 `PipelineError::Llm` 向上传播
pub async fn first_completion(
    llm: &dyn LlmClient,
    messages: &[Message],
    params: GenerationParams,
) -> Result<String, PipelineError> {
    let completions = llm
        .generate(messages, params)
        .await
        .map_err(PipelineError::Llm)?;
    completions
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::Llm("generator returned no completions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyClient;

    #[async_trait]
    impl LlmClient for EmptyClient {
        async fn generate(
            &self,
            _messages: &[Message],
            _params: GenerationParams,
        ) -> Result<Vec<String>, String> {
            Ok(vec![])
        }
    }

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn generate(
            &self,
            _messages: &[Message],
            _params: GenerationParams,
        ) -> Result<Vec<String>, String> {
            Err("503 Service Unavailable".to_string())
        }
    }

    #[tokio::test]
    async fn test_empty_completion_list_is_error() {
        let res = first_completion(&EmptyClient, &[], GenerationParams::new(0.5, 10)).await;
        assert!(matches!(res, Err(PipelineError::Llm(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let res = first_completion(&FailingClient, &[], GenerationParams::new(0.5, 10)).await;
        match res {
            Err(PipelineError::Llm(msg)) => assert!(msg.contains("503")),
            other => panic!("Expected Llm error, got {:?}", other),
        }
    }
}
