//! 记忆管理：追加规则 + 超阈值摘要
//!
//! token 数按「单词数 × 1.3」粗略估算；超过阈值且启用摘要时，调用 LLM 生成摘要并整体替换记忆。

use std::sync::Arc;

use crate::core::PipelineError;
use crate::llm::{conversation, first_completion, GenerationParams, LlmClient};
use crate::memory::{FactTag, WorkingMemory};
use crate::pipeline::prompts;

/// 英文平均每个单词约 1.3 个 token
const TOKENS_PER_WORD: f64 = 1.3;

/// 估算文本 token 数
pub fn estimate_tokens(text: &str) -> f64 {
    text.split_whitespace().count() as f64 * TOKENS_PER_WORD
}

pub struct MemoryManager {
    llm: Arc<dyn LlmClient>,
    max_tokens: usize,
    enabled: bool,
    params: GenerationParams,
}

impl MemoryManager {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        max_tokens: usize,
        enabled: bool,
        params: GenerationParams,
    ) -> Self {
        Self {
            llm,
            max_tokens,
            enabled,
            params,
        }
    }

    pub fn append(&self, memory: &mut WorkingMemory, statement: &str, tag: FactTag) {
        tracing::debug!(tag = %tag, "memory append: {}", statement);
        memory.append(statement, tag);
    }

    /// 是否需要摘要（不调用 LLM）
    pub fn needs_summary(&self, memory: &WorkingMemory) -> bool {
        self.enabled && estimate_tokens(&memory.render()) > self.max_tokens as f64
    }

    /// 超阈值则摘要并整体替换，返回是否发生了替换；未超阈值或未启用时记忆保持不变
    pub async fn check_and_summarize(
        &self,
        memory: &mut WorkingMemory,
    ) -> Result<bool, PipelineError> {
        if !self.needs_summary(memory) {
            return Ok(false);
        }

        let rendered = memory.render();
        let before = estimate_tokens(&rendered);
        let messages = conversation(prompts::SUMMARY_SYSTEM, prompts::summary_prompt(&rendered));
        let summary = first_completion(self.llm.as_ref(), &messages, self.params).await?;
        memory.replace_with_summary(summary.trim());

        tracing::info!(
            before_tokens = before,
            after_tokens = estimate_tokens(&memory.render()),
            "memory summarized"
        );
        Ok(true)
    }
}
