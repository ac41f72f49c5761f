//! 记忆层：单个问题的工作记忆与其管理（追加、超阈值摘要）

pub mod manager;
pub mod working;

pub use manager::{estimate_tokens, MemoryManager};
pub use working::{FactTag, MemoryEntry, WorkingMemory};
