//! 答案合成：Ready 模式（记忆已足够）与 Best-effort 模式（迭代预算耗尽）

use std::sync::Arc;

use crate::core::PipelineError;
use crate::llm::{conversation, first_completion, GenerationParams, LlmClient};
use crate::memory::WorkingMemory;
use crate::pipeline::prompts;

pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, params: GenerationParams) -> Self {
        Self { llm, params }
    }

    /// Planner 给出 Ready 时调用，prompt 总是带记忆
    pub async fn synthesize_ready(
        &self,
        question: &str,
        memory: &WorkingMemory,
    ) -> Result<String, PipelineError> {
        let prompt = prompts::ready_answer_prompt(question, &memory.render());
        self.answer(prompts::ANSWER_SYSTEM, prompt).await
    }

    /// 迭代耗尽时调用；记忆为空则要求模型凭自身知识作答
    pub async fn synthesize_best_effort(
        &self,
        question: &str,
        memory: &WorkingMemory,
    ) -> Result<String, PipelineError> {
        let prompt = prompts::best_effort_prompt(question, &memory.render());
        self.answer(prompts::BEST_EFFORT_SYSTEM, prompt).await
    }

    async fn answer(&self, system: &str, prompt: String) -> Result<String, PipelineError> {
        let messages = conversation(system, prompt);
        let answer = first_completion(self.llm.as_ref(), &messages, self.params).await?;
        let answer = answer.trim();
        // 空白答案按响应格式错误处理
        if answer.is_empty() {
            return Err(PipelineError::Llm(
                "generator returned an empty answer".to_string(),
            ));
        }
        Ok(answer.to_string())
    }
}
