//! Verifier：检索证据校验单个计划
//!
//! 1. 检索（无结果时改写查询重试，最多 max_attempts 次，每次尝试都计数）
//! 2. 仍无文档：直接判为 Insufficient，不调用 LLM
//! 3. 有文档：取前 5 篇拼验证 prompt，解析 Verdict / Corrected Statement / Evidence

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::PipelineError;
use crate::llm::{conversation, first_completion, GenerationParams, LlmClient};
use crate::memory::WorkingMemory;
use crate::pipeline::prompts;
use crate::retrieval::{Document, Retriever};

/// 验证结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Supported,
    Contradicted,
    Insufficient,
}

impl Verdict {
    /// 按 Supported -> Contradicted -> Insufficient 的固定顺序做子串匹配，先命中者胜
    pub fn from_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        [
            ("supported", Verdict::Supported),
            ("contradicted", Verdict::Contradicted),
            ("insufficient", Verdict::Insufficient),
        ]
        .into_iter()
        .find(|(token, _)| lower.contains(token))
        .map(|(_, verdict)| verdict)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Supported => "supported",
            Verdict::Contradicted => "contradicted",
            Verdict::Insufficient => "insufficient",
        };
        f.write_str(s)
    }
}

/// 单个计划的验证结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// 被验证的原始计划
    pub plan: String,
    pub verdict: Verdict,
    pub corrected_text: String,
    pub evidence_text: String,
    /// 检索尝试次数（含失败的尝试），至少为 1
    pub retrieval_attempts: usize,
}

/// 解析出的三元组：(verdict, corrected, evidence)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerification {
    pub verdict: Verdict,
    pub corrected_text: String,
    pub evidence_text: String,
}

/// 取第一个冒号后的文本
fn after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("")
}

/// 解析验证回复，永不失败
///
/// - 行首前缀（忽略大小写）：`verdict:` / `corrected statement:` / `evidence:`
/// - 未识别出结论时默认 Insufficient
/// - 修正陈述缺失或为空时退回原计划；证据缺失为空串
pub fn parse_verification_response(response: &str, plan: &str) -> ParsedVerification {
    let mut verdict = Verdict::Insufficient;
    let mut corrected = String::new();
    let mut evidence = String::new();

    for line in response.trim().lines().map(str::trim) {
        let lower = line.to_lowercase();
        if lower.starts_with("verdict:") {
            if let Some(v) = Verdict::from_text(after_colon(line)) {
                verdict = v;
            }
        } else if lower.starts_with("corrected statement:") {
            corrected = after_colon(line).to_string();
        } else if lower.starts_with("evidence:") {
            evidence = after_colon(line).to_string();
        }
    }

    if corrected.is_empty() {
        corrected = plan.to_string();
    }

    ParsedVerification {
        verdict,
        corrected_text: corrected,
        evidence_text: evidence,
    }
}

/// 验证器配置：检索重试次数、top-K 与两个调用点（验证 / 改写）的采样参数
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub max_retrieval_attempts: usize,
    pub top_k: usize,
    pub verify_params: GenerationParams,
    pub rewrite_params: GenerationParams,
}

pub struct Verifier {
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn Retriever>,
    settings: VerifierSettings,
}

impl Verifier {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        retriever: Arc<dyn Retriever>,
        settings: VerifierSettings,
    ) -> Self {
        Self {
            llm,
            retriever,
            settings,
        }
    }

    /// 验证单个计划；只有外部服务失败会返回 Err
    ///
    /// 当前记忆只作为上下文传入，验证 prompt 仅包含计划、问题与检索文档。
    pub async fn verify(
        &self,
        plan: &str,
        question: &str,
        _memory: &WorkingMemory,
    ) -> Result<VerificationResult, PipelineError> {
        let (docs, attempts) = self.retrieve_with_retry(plan).await?;

        if docs.is_empty() {
            tracing::warn!(attempts, "no documents for plan: {}", plan);
            return Ok(VerificationResult {
                plan: plan.to_string(),
                verdict: Verdict::Insufficient,
                corrected_text: plan.to_string(),
                evidence_text: prompts::NO_DOCUMENTS_EVIDENCE.to_string(),
                retrieval_attempts: attempts,
            });
        }

        let parsed = self.verify_with_docs(plan, question, &docs).await?;
        tracing::debug!(verdict = %parsed.verdict, attempts, "plan verified: {}", plan);
        Ok(VerificationResult {
            plan: plan.to_string(),
            verdict: parsed.verdict,
            corrected_text: parsed.corrected_text,
            evidence_text: parsed.evidence_text,
            retrieval_attempts: attempts,
        })
    }

    /// 有界重试：返回 (文档, 实际尝试次数)；最后一次失败后不再改写
    pub async fn retrieve_with_retry(
        &self,
        plan: &str,
    ) -> Result<(Vec<Document>, usize), PipelineError> {
        let max_attempts = self.settings.max_retrieval_attempts;
        let mut current_query = plan.to_string();
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            let results = self
                .retriever
                .batch_search(std::slice::from_ref(&current_query), self.settings.top_k)
                .await
                .map_err(PipelineError::Retrieval)?;
            let docs = results.into_iter().next().unwrap_or_default();
            tracing::debug!(attempt = attempts, hits = docs.len(), "retrieval: {}", current_query);

            if !docs.is_empty() {
                return Ok((docs, attempts));
            }
            if attempts < max_attempts {
                current_query = self.rewrite_query(plan, attempts).await?;
            }
        }

        Ok((Vec::new(), attempts))
    }

    /// 改写查询：回复去掉空白后为空时返回原计划
    pub async fn rewrite_query(&self, plan: &str, attempt: usize) -> Result<String, PipelineError> {
        let messages = conversation(prompts::REWRITE_SYSTEM, prompts::rewrite_prompt(plan, attempt));
        let rewritten =
            first_completion(self.llm.as_ref(), &messages, self.settings.rewrite_params).await?;
        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            tracing::warn!(attempt, "empty rewrite, falling back to plan");
            Ok(plan.to_string())
        } else {
            Ok(rewritten.to_string())
        }
    }

    async fn verify_with_docs(
        &self,
        plan: &str,
        question: &str,
        docs: &[Document],
    ) -> Result<ParsedVerification, PipelineError> {
        let bodies: Vec<&str> = docs
            .iter()
            .take(prompts::MAX_PROMPT_DOCUMENTS)
            .map(Document::body)
            .collect();
        let prompt = prompts::verification_prompt(plan, question, &bodies);
        let messages = conversation(prompts::VERIFIER_SYSTEM, prompt);
        let response =
            first_completion(self.llm.as_ref(), &messages, self.settings.verify_params).await?;
        Ok(parse_verification_response(&response, plan))
    }
}
