//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `RPVM__*` 覆盖（双下划线表示嵌套，如 `RPVM__RPVM__MAX_ITER=3`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::PipelineError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub retrieval: RetrievalSection,
    pub rpvm: RpvmSection,
}

/// [app] 段：运行名、输出目录、是否保存中间数据
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 中间数据（intermediate_data.jsonl）输出目录
    pub save_dir: PathBuf,
    pub save_intermediate_data: bool,
    /// 运行标签，会拼进输出子目录名
    pub save_note: Option<String>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            save_dir: PathBuf::from("output"),
            save_intermediate_data: true,
            save_note: None,
        }
    }
}

/// [llm] 段：后端选择、模型、超时与重试
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeouts: LlmTimeoutsSection,
    /// 集成边界上的重试次数（不含首次调用）
    pub max_retries: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [retrieval] 段：检索服务地址
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSection {
    /// http / mock
    pub provider: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            provider: "http".to_string(),
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// [rpvm] 段：迭代预算、检索重试、记忆压缩阈值与各调用点温度
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpvmSection {
    pub max_iter: usize,
    /// 每个 plan 的检索尝试次数（含首次）
    pub max_retrieval_attempts: usize,
    pub retrieval_topk: usize,
    /// 记忆估算 token 数超过此值时触发摘要
    pub memory_max_tokens: usize,
    pub enable_memory_summary: bool,
    pub planner_temperature: f32,
    pub verifier_temperature: f32,
    pub final_answer_temperature: f32,
    pub rewrite_temperature: f32,
    pub summary_temperature: f32,
    pub budgets: TokenBudgets,
}

impl Default for RpvmSection {
    fn default() -> Self {
        Self {
            max_iter: 5,
            max_retrieval_attempts: 2,
            retrieval_topk: 5,
            memory_max_tokens: 3000,
            enable_memory_summary: true,
            planner_temperature: 0.7,
            verifier_temperature: 0.3,
            final_answer_temperature: 0.5,
            rewrite_temperature: 0.5,
            summary_temperature: 0.3,
            budgets: TokenBudgets::default(),
        }
    }
}

impl RpvmSection {
    /// 拒绝会让循环退化的取值（0 次迭代、0 次检索、top-0）
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_iter == 0 {
            return Err(PipelineError::Config("rpvm.max_iter must be >= 1".to_string()));
        }
        if self.max_retrieval_attempts == 0 {
            return Err(PipelineError::Config(
                "rpvm.max_retrieval_attempts must be >= 1".to_string(),
            ));
        }
        if self.retrieval_topk == 0 {
            return Err(PipelineError::Config(
                "rpvm.retrieval_topk must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// [rpvm.budgets] 段：各调用点的最大生成 token 数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenBudgets {
    pub planning: u32,
    pub rewrite: u32,
    pub verification: u32,
    pub summarization: u32,
    pub answer: u32,
}

impl Default for TokenBudgets {
    fn default() -> Self {
        Self {
            planning: 512,
            rewrite: 100,
            verification: 300,
            summarization: 500,
            answer: 200,
        }
    }
}

/// 从 config 目录加载配置，环境变量 RPVM__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 RPVM__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!("config file {} not found, ignoring", path.display());
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("RPVM")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.rpvm.max_iter, 5);
        assert_eq!(cfg.rpvm.max_retrieval_attempts, 2);
        assert_eq!(cfg.rpvm.retrieval_topk, 5);
        assert_eq!(cfg.rpvm.memory_max_tokens, 3000);
        assert!(cfg.rpvm.enable_memory_summary);
        assert_eq!(cfg.rpvm.planner_temperature, 0.7);
        assert_eq!(cfg.rpvm.verifier_temperature, 0.3);
        assert_eq!(cfg.rpvm.final_answer_temperature, 0.5);
        assert_eq!(cfg.rpvm.rewrite_temperature, 0.5);
        assert_eq!(cfg.rpvm.summary_temperature, 0.3);
        assert_eq!(cfg.rpvm.budgets.planning, 512);
        assert_eq!(cfg.rpvm.budgets.rewrite, 100);
        assert_eq!(cfg.rpvm.budgets.verification, 300);
        assert_eq!(cfg.rpvm.budgets.summarization, 500);
        assert_eq!(cfg.rpvm.budgets.answer, 200);
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        let mut rpvm = RpvmSection::default();
        assert!(rpvm.validate().is_ok());
        rpvm.max_iter = 0;
        assert!(matches!(rpvm.validate(), Err(PipelineError::Config(_))));

        let mut rpvm = RpvmSection::default();
        rpvm.max_retrieval_attempts = 0;
        assert!(rpvm.validate().is_err());

        let mut rpvm = RpvmSection::default();
        rpvm.retrieval_topk = 0;
        assert!(rpvm.validate().is_err());
    }

    #[test]
    fn test_load_from_file_overrides_partial_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.toml");
        std::fs::write(
            &path,
            "[rpvm]\nmax_iter = 3\nenable_memory_summary = false\n\n[rpvm.budgets]\nanswer = 64\n",
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.rpvm.max_iter, 3);
        assert!(!cfg.rpvm.enable_memory_summary);
        assert_eq!(cfg.rpvm.budgets.answer, 64);
        // 未出现的键保持默认
        assert_eq!(cfg.rpvm.budgets.planning, 512);
        assert_eq!(cfg.rpvm.retrieval_topk, 5);
    }
}
