//! Planner：反思式规划与计划列表解析
//!
//! 调用 LLM 得到下一步推理计划；parse_planner_output 把回复解析为 Ready 或非空的计划列表。

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::core::PipelineError;
use crate::llm::{conversation, first_completion, GenerationParams, LlmClient};
use crate::memory::WorkingMemory;
use crate::pipeline::prompts;

/// Planner 输出：要么记忆已足够（Ready），要么是按顺序待验证的计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutput {
    Ready,
    Plans(Vec<String>),
}

impl PlanOutput {
    pub fn is_ready(&self) -> bool {
        matches!(self, PlanOutput::Ready)
    }
}

/// Ready 序列化为字面标记，计划列表序列化为字符串数组
impl Serialize for PlanOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PlanOutput::Ready => serializer.serialize_str(prompts::ANSWER_READY),
            PlanOutput::Plans(plans) => plans.serialize(serializer),
        }
    }
}

fn numbered_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 匹配 "1. xxx" 或 "1) xxx"
    RE.get_or_init(|| Regex::new(r"^(\d+)[.)]\s*(.+)$").expect("valid plan regex"))
}

/// 解析计划列表，保证非空
///
/// 1. 逐行匹配编号行，取编号后的文本
/// 2. 一行都没匹配上时，退回为所有非空且不以 `#` 开头的行
/// 3. 仍为空则返回单个占位计划
pub fn parse_plans(response: &str) -> Vec<String> {
    let lines: Vec<&str> = response.trim().lines().map(str::trim).collect();

    let mut plans: Vec<String> = lines
        .iter()
        .filter_map(|line| numbered_line().captures(line))
        .filter_map(|caps| caps.get(2).map(|m| m.as_str().trim().to_string()))
        .filter(|plan| !plan.is_empty())
        .collect();

    if plans.is_empty() {
        plans = lines
            .iter()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();
    }

    if plans.is_empty() {
        vec![prompts::UNPARSEABLE_PLAN.to_string()]
    } else {
        plans
    }
}

/// 回复中任何位置出现 ANSWER_READY 即为 Ready，优先于编号内容
pub fn parse_planner_output(response: &str) -> PlanOutput {
    if response.contains(prompts::ANSWER_READY) {
        PlanOutput::Ready
    } else {
        PlanOutput::Plans(parse_plans(response))
    }
}

/// Planner：持有 LLM 与规划调用的采样参数
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, params: GenerationParams) -> Self {
        Self { llm, params }
    }

    pub async fn plan(
        &self,
        question: &str,
        memory: &WorkingMemory,
    ) -> Result<PlanOutput, PipelineError> {
        let prompt = prompts::planner_prompt(question, &memory.render());
        let messages = conversation(prompts::PLANNER_SYSTEM, prompt);
        let response = first_completion(self.llm.as_ref(), &messages, self.params).await?;
        let output = parse_planner_output(response.trim());
        if let PlanOutput::Plans(ref plans) = output {
            tracing::debug!(count = plans.len(), "planner proposed plans");
        }
        Ok(output)
    }
}
