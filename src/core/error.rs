//! 流水线错误类型
//!
//! 核心循环本身不捕获外部协作方（生成 / 检索）的失败：这些错误原样向上传播，终止当前问题的运行。
//! 解析类问题（Planner 输出、验证输出无法解析）不在此列，它们总是降级为安全默认值。

use thiserror::Error;

/// RPVM 运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 生成服务失败（网络、鉴权、超时）或返回了空的候选列表
    #[error("LLM error: {0}")]
    Llm(String),

    /// 检索服务失败（网络、非 2xx 状态、响应格式不符）
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Llm("rate limited".to_string());
        assert_eq!(err.to_string(), "LLM error: rate limited");

        let err = PipelineError::Retrieval("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_io_error_converts() {
        fn open_missing() -> Result<(), PipelineError> {
            std::fs::read_to_string("/definitely/not/here/rpvm.txt")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(PipelineError::Io(_))));
    }
}
