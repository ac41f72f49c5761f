//! 数据集加载：FlashRAG 风格 JSONL，每行 `{"id": ..., "question": ..., "golden_answers": [...]}`

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// 单条问答样本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaItem {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    #[serde(default)]
    pub golden_answers: Vec<String>,
    /// 运行后回填的预测答案
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pred: Option<String>,
}

impl QaItem {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: None,
            question: question.into(),
            golden_answers: Vec::new(),
            pred: None,
        }
    }
}

/// 解析 JSONL 文本；空行跳过，`limit` 限制最多读取的样本数
pub fn parse_jsonl(content: &str, limit: Option<usize>) -> anyhow::Result<Vec<QaItem>> {
    let mut items = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if limit.is_some_and(|n| items.len() >= n) {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item: QaItem = serde_json::from_str(line)
            .with_context(|| format!("invalid dataset line {}", lineno + 1))?;
        items.push(item);
    }
    Ok(items)
}

pub fn load_jsonl(path: impl AsRef<Path>, limit: Option<usize>) -> anyhow::Result<Vec<QaItem>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_jsonl(&content, limit)
}

/// 把带预测的样本写回 JSONL
pub fn save_jsonl(path: impl AsRef<Path>, items: &[QaItem]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}
