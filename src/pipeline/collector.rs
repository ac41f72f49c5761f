//! 结果收集与中间数据持久化
//!
//! 流水线本身不保存任何跨问题状态；调用方持有 ResultCollector，批量运行时逐条追加，最后写成 JSONL。

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::PipelineError;
use crate::pipeline::record::{IterationRecord, PipelineResult};

pub const INTERMEDIATE_FILE: &str = "intermediate_data.jsonl";

/// JSONL 中的一行
#[derive(Debug, Serialize)]
pub struct IntermediateRecord<'a> {
    pub question: &'a str,
    pub iterations: &'a [IterationRecord],
    pub final_memory: &'a str,
    pub final_answer: &'a str,
    pub total_retrievals: usize,
}

impl<'a> From<&'a PipelineResult> for IntermediateRecord<'a> {
    fn from(r: &'a PipelineResult) -> Self {
        Self {
            question: &r.question,
            iterations: &r.iterations,
            final_memory: &r.final_memory,
            final_answer: &r.final_answer,
            total_retrievals: r.total_retrievals,
        }
    }
}

/// 追加式结果收集器（按输入顺序）
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Vec<PipelineResult>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: PipelineResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[PipelineResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PipelineResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_retrievals(&self) -> usize {
        self.results.iter().map(|r| r.total_retrievals).sum()
    }

    /// 写入 `<dir>/intermediate_data.jsonl`（覆盖），目录不存在时自动创建；返回文件路径
    pub fn save_jsonl(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PipelineError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(INTERMEDIATE_FILE);
        let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
        for result in &self.results {
            serde_json::to_writer(&mut file, &IntermediateRecord::from(result))?;
            file.write_all(b"\n")?;
        }
        file.flush()?;
        tracing::info!("Intermediate data saved to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::planner::PlanOutput;
    use crate::pipeline::record::TerminalMode;

    fn result(question: &str, retrievals: usize) -> PipelineResult {
        PipelineResult {
            question: question.to_string(),
            final_answer: format!("answer to {question}"),
            iterations: vec![IterationRecord {
                index: 1,
                plans: PlanOutput::Ready,
                verifications: vec![],
                memory_after: String::new(),
                short_circuited: false,
                final_answer: Some(format!("answer to {question}")),
            }],
            final_memory: String::new(),
            total_retrievals: retrievals,
            terminal_mode: TerminalMode::Ready,
        }
    }

    #[test]
    fn test_save_jsonl_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut collector = ResultCollector::new();
        collector.push(result("q1", 2));
        collector.push(result("q2", 3));
        assert_eq!(collector.total_retrievals(), 5);

        let path = collector.save_jsonl(dir.path().join("run")).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["question"], "q1");
        assert_eq!(first["final_answer"], "answer to q1");
        assert_eq!(first["total_retrievals"], 2);
        assert_eq!(first["final_memory"], "");
        assert_eq!(first["iterations"][0]["plans"], "ANSWER_READY");
        // terminal_mode 不属于持久化字段
        assert!(first.get("terminal_mode").is_none());
    }
}
