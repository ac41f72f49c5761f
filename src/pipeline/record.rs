//! 运行记录：每轮迭代一条 IterationRecord，每个问题一个 PipelineResult（创建后不可变）

use serde::Serialize;

use crate::pipeline::planner::PlanOutput;
use crate::pipeline::verifier::VerificationResult;

/// 运行的终止方式，每次运行恰好设置一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalMode {
    /// Planner 给出 ANSWER_READY
    Ready,
    /// 迭代预算耗尽，走 best-effort 回答
    MaxIterations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 从 1 开始
    #[serde(rename = "iteration")]
    pub index: usize,
    pub plans: PlanOutput,
    /// 短路前产生的验证结果；Ready 轮为空
    pub verifications: Vec<VerificationResult>,
    /// 本轮结束（含摘要）后的记忆文本
    #[serde(rename = "updated_memory")]
    pub memory_after: String,
    /// 是否因 Contradicted 提前结束本轮
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub short_circuited: bool,
    /// 仅 Ready 轮携带
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub question: String,
    pub final_answer: String,
    pub iterations: Vec<IterationRecord>,
    pub final_memory: String,
    pub total_retrievals: usize,
    pub terminal_mode: TerminalMode,
}

impl PipelineResult {
    pub fn reached_ready(&self) -> bool {
        self.terminal_mode == TerminalMode::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::verifier::Verdict;

    #[test]
    fn test_iteration_record_json_shape() {
        let rec = IterationRecord {
            index: 2,
            plans: PlanOutput::Plans(vec!["A".into()]),
            verifications: vec![VerificationResult {
                plan: "A".into(),
                verdict: Verdict::Supported,
                corrected_text: "A".into(),
                evidence_text: "doc".into(),
                retrieval_attempts: 1,
            }],
            memory_after: "\nA (verified)".into(),
            short_circuited: false,
            final_answer: None,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["iteration"], 2);
        assert_eq!(v["plans"][0], "A");
        assert_eq!(v["verifications"][0]["verdict"], "supported");
        assert_eq!(v["updated_memory"], "\nA (verified)");
        assert!(v.get("short_circuited").is_none());
        assert!(v.get("final_answer").is_none());
    }

    #[test]
    fn test_ready_record_json_shape() {
        let rec = IterationRecord {
            index: 1,
            plans: PlanOutput::Ready,
            verifications: vec![],
            memory_after: String::new(),
            short_circuited: false,
            final_answer: Some("42".into()),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["plans"], "ANSWER_READY");
        assert_eq!(v["final_answer"], "42");
    }
}
