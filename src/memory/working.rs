//! 工作记忆：单个问题运行期间累积的已验证 / 已修正事实
//!
//! 内部以有序条目保存，渲染为文本时与拼接字符串的写法逐字一致：
//! 每条事实渲染为 `"\n<statement> (<tag>)"`；摘要条目原样渲染。
//! 摘要会整体替换所有条目（标签随之丢失），之后的事实继续追加在摘要后面。

use std::fmt;

use serde::{Serialize, Serializer};

/// 事实来源标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactTag {
    /// 检索证据支持原陈述
    Verified,
    /// 检索证据与原陈述矛盾，记录修正后的陈述
    Corrected,
}

impl FactTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactTag::Verified => "verified",
            FactTag::Corrected => "corrected",
        }
    }
}

impl fmt::Display for FactTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryEntry {
    Fact { statement: String, tag: FactTag },
    Summary(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkingMemory {
    entries: Vec<MemoryEntry>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条事实，渲染结果为 `"\n<statement> (<tag>)"`
    pub fn append(&mut self, statement: impl Into<String>, tag: FactTag) {
        self.entries.push(MemoryEntry::Fact {
            statement: statement.into(),
            tag,
        });
    }

    /// 用摘要整体替换当前内容
    pub fn replace_with_summary(&mut self, summary: impl Into<String>) {
        self.entries = vec![MemoryEntry::Summary(summary.into())];
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// 渲染后去掉空白为空即视为空记忆
    pub fn is_empty(&self) -> bool {
        self.render().trim().is_empty()
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        for entry in &self.entries {
            match entry {
                MemoryEntry::Fact { statement, tag } => {
                    s.push('\n');
                    s.push_str(statement);
                    s.push_str(" (");
                    s.push_str(tag.as_str());
                    s.push(')');
                }
                MemoryEntry::Summary(text) => s.push_str(text),
            }
        }
        s
    }
}

impl fmt::Display for WorkingMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for WorkingMemory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_matches_concatenation() {
        let mut mem = WorkingMemory::new();
        assert_eq!(mem.render(), "");
        assert!(mem.is_empty());

        mem.append("Paris is the capital of France", FactTag::Verified);
        mem.append("The Seine flows through Paris", FactTag::Corrected);
        assert_eq!(
            mem.render(),
            "\nParis is the capital of France (verified)\nThe Seine flows through Paris (corrected)"
        );
        assert!(!mem.is_empty());
    }

    #[test]
    fn test_summary_replaces_and_later_facts_append() {
        let mut mem = WorkingMemory::new();
        mem.append("A", FactTag::Verified);
        mem.append("B", FactTag::Verified);
        mem.replace_with_summary("A and B hold.");
        assert_eq!(mem.render(), "A and B hold.");
        assert_eq!(mem.entries().len(), 1);

        mem.append("C", FactTag::Corrected);
        assert_eq!(mem.render(), "A and B hold.\nC (corrected)");
    }

    #[test]
    fn test_whitespace_summary_counts_as_empty() {
        let mut mem = WorkingMemory::new();
        mem.replace_with_summary("   ");
        assert!(mem.is_empty());
    }

    #[test]
    fn test_serializes_as_rendered_text() {
        let mut mem = WorkingMemory::new();
        mem.append("X", FactTag::Verified);
        assert_eq!(serde_json::to_string(&mem).unwrap(), r#""\nX (verified)""#);
    }
}
