//! 流水线过程事件：用于向 CLI 进度展示或前端推送每轮的规划、验证与记忆变化

use serde::Serialize;

use crate::pipeline::verifier::Verdict;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// 第几轮开始（从 1 开始）
    IterationStarted { iteration: usize, max_iterations: usize },
    /// Planner 给出的计划
    PlansProposed { iteration: usize, plans: Vec<String> },
    /// 单个计划验证完成
    PlanVerified {
        iteration: usize,
        plan: String,
        verdict: Verdict,
        retrieval_attempts: usize,
    },
    /// Contradicted 导致本轮剩余计划被跳过
    ShortCircuited { iteration: usize, skipped: usize },
    /// 记忆被摘要替换
    MemorySummarized { iteration: usize, preview: String },
    /// Planner 判定记忆已足够
    AnswerReady { iteration: usize },
    /// 迭代耗尽，走 best-effort
    BestEffort { iterations: usize },
}
