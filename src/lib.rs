//! RPVM - 反思式规划-验证-记忆（Reflective Plan-Verify Memory）多跳问答
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **dataset**: JSONL 数据集读写
//! - **eval**: EM / F1 / Acc 评估
//! - **llm**: 生成服务抽象与实现（OpenAI 兼容 / Mock / 脚本化）与超时重试
//! - **memory**: 工作记忆与记忆管理（追加、摘要）
//! - **observability**: 日志初始化
//! - **pipeline**: Planner、Verifier、答案合成、RPVM 主循环、结果收集
//! - **retrieval**: 检索服务抽象与实现（HTTP / 静态）

pub mod config;
pub mod core;
pub mod dataset;
pub mod eval;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod pipeline;
pub mod retrieval;

pub use pipeline::{PipelineResult, RpvmPipeline};
