//! RPVM 主循环
//!
//! Plan -> Verify（逐个计划，Contradicted 短路本轮）-> 记忆追加 -> 超阈值摘要 -> 下一轮；
//! Planner 给出 ANSWER_READY 时以 Ready 模式回答，预算耗尽时以 best-effort 模式回答。
//! 外部服务失败不在此处捕获，直接向上传播。
//! 可选 event_tx：向 CLI / 前端推送 IterationStarted / PlanVerified / ShortCircuited 等事件。

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::config::{AppConfig, RpvmSection};
use crate::core::PipelineError;
use crate::llm::{create_llm_from_config, GenerationParams, LlmClient};
use crate::memory::{FactTag, MemoryManager, WorkingMemory};
use crate::pipeline::collector::ResultCollector;
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::planner::{PlanOutput, Planner};
use crate::pipeline::record::{IterationRecord, PipelineResult, TerminalMode};
use crate::pipeline::synthesizer::AnswerSynthesizer;
use crate::pipeline::verifier::{Verdict, Verifier, VerifierSettings};
use crate::retrieval::{create_retriever_from_config, Retriever};

/// 记忆摘要事件的预览长度
const MEMORY_PREVIEW_CHARS: usize = 200;

/// 组装好的流水线：各组件共享同一个 LLM 与检索器，本身不持有跨问题状态
pub struct RpvmPipeline {
    planner: Planner,
    verifier: Verifier,
    memory_manager: MemoryManager,
    synthesizer: AnswerSynthesizer,
    llm: Arc<dyn LlmClient>,
    max_iter: usize,
    event_tx: Option<UnboundedSender<PipelineEvent>>,
}

impl RpvmPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        retriever: Arc<dyn Retriever>,
        settings: &RpvmSection,
    ) -> Result<Self, PipelineError> {
        settings.validate()?;
        let budgets = &settings.budgets;

        let planner = Planner::new(
            llm.clone(),
            GenerationParams::new(settings.planner_temperature, budgets.planning),
        );
        let verifier = Verifier::new(
            llm.clone(),
            retriever,
            VerifierSettings {
                max_retrieval_attempts: settings.max_retrieval_attempts,
                top_k: settings.retrieval_topk,
                verify_params: GenerationParams::new(
                    settings.verifier_temperature,
                    budgets.verification,
                ),
                rewrite_params: GenerationParams::new(settings.rewrite_temperature, budgets.rewrite),
            },
        );
        let memory_manager = MemoryManager::new(
            llm.clone(),
            settings.memory_max_tokens,
            settings.enable_memory_summary,
            GenerationParams::new(settings.summary_temperature, budgets.summarization),
        );
        let synthesizer = AnswerSynthesizer::new(
            llm.clone(),
            GenerationParams::new(settings.final_answer_temperature, budgets.answer),
        );

        Ok(Self {
            planner,
            verifier,
            memory_manager,
            synthesizer,
            llm,
            max_iter: settings.max_iter,
            event_tx: None,
        })
    }

    /// 按应用配置创建 LLM 与检索器并组装流水线
    pub fn from_config(cfg: &AppConfig) -> Result<Self, PipelineError> {
        let llm = create_llm_from_config(cfg);
        let retriever = create_retriever_from_config(cfg).map_err(PipelineError::Retrieval)?;
        Self::new(llm, retriever, &cfg.rpvm)
    }

    pub fn with_event_tx(mut self, tx: UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// 共享 LLM 的累计 token 用量：(prompt, completion, total)
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    fn send_event(&self, ev: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(ev);
        }
    }

    /// 对单个问题运行完整流程
    pub async fn run_single_question(
        &self,
        question: &str,
    ) -> Result<PipelineResult, PipelineError> {
        let mut memory = WorkingMemory::new();
        let mut iterations: Vec<IterationRecord> = Vec::new();
        let mut total_retrievals = 0;

        for index in 1..=self.max_iter {
            tracing::info!(iteration = index, max = self.max_iter, "planning");
            self.send_event(PipelineEvent::IterationStarted {
                iteration: index,
                max_iterations: self.max_iter,
            });

            let plans = match self.planner.plan(question, &memory).await? {
                PlanOutput::Ready => {
                    tracing::info!(iteration = index, "planner reports memory sufficient");
                    self.send_event(PipelineEvent::AnswerReady { iteration: index });
                    let answer = self.synthesizer.synthesize_ready(question, &memory).await?;
                    iterations.push(IterationRecord {
                        index,
                        plans: PlanOutput::Ready,
                        verifications: Vec::new(),
                        memory_after: memory.render(),
                        short_circuited: false,
                        final_answer: Some(answer.clone()),
                    });
                    return Ok(PipelineResult {
                        question: question.to_string(),
                        final_answer: answer,
                        iterations,
                        final_memory: memory.render(),
                        total_retrievals,
                        terminal_mode: TerminalMode::Ready,
                    });
                }
                PlanOutput::Plans(plans) => plans,
            };

            self.send_event(PipelineEvent::PlansProposed {
                iteration: index,
                plans: plans.clone(),
            });

            let mut verifications = Vec::with_capacity(plans.len());
            let mut short_circuited = false;
            for plan in &plans {
                let result = self.verifier.verify(plan, question, &memory).await?;
                total_retrievals += result.retrieval_attempts;
                self.send_event(PipelineEvent::PlanVerified {
                    iteration: index,
                    plan: plan.clone(),
                    verdict: result.verdict,
                    retrieval_attempts: result.retrieval_attempts,
                });

                match result.verdict {
                    Verdict::Supported => {
                        self.memory_manager
                            .append(&mut memory, &result.corrected_text, FactTag::Verified);
                    }
                    Verdict::Contradicted => {
                        self.memory_manager
                            .append(&mut memory, &result.corrected_text, FactTag::Corrected);
                        short_circuited = true;
                    }
                    Verdict::Insufficient => {}
                }
                verifications.push(result);

                // Contradicted 之后本轮剩余计划不再验证
                if short_circuited {
                    let skipped = plans.len() - verifications.len();
                    tracing::info!(iteration = index, skipped, "contradiction, short-circuiting");
                    self.send_event(PipelineEvent::ShortCircuited {
                        iteration: index,
                        skipped,
                    });
                    break;
                }
            }

            if self.memory_manager.check_and_summarize(&mut memory).await? {
                self.send_event(PipelineEvent::MemorySummarized {
                    iteration: index,
                    preview: memory.render().chars().take(MEMORY_PREVIEW_CHARS).collect(),
                });
            }

            iterations.push(IterationRecord {
                index,
                plans: PlanOutput::Plans(plans),
                verifications,
                memory_after: memory.render(),
                short_circuited,
                final_answer: None,
            });
        }

        tracing::info!(iterations = self.max_iter, "iteration budget exhausted, best-effort answer");
        self.send_event(PipelineEvent::BestEffort {
            iterations: self.max_iter,
        });
        let answer = self
            .synthesizer
            .synthesize_best_effort(question, &memory)
            .await?;

        Ok(PipelineResult {
            question: question.to_string(),
            final_answer: answer,
            iterations,
            final_memory: memory.render(),
            total_retrievals,
            terminal_mode: TerminalMode::MaxIterations,
        })
    }

    /// 顺序运行一批问题，结果与输入同序；任一问题的外部服务失败会中止整批
    pub async fn run_batch<S: AsRef<str>>(
        &self,
        questions: &[S],
    ) -> Result<Vec<PipelineResult>, PipelineError> {
        let mut collector = ResultCollector::new();
        self.run_batch_into(questions, &mut collector).await?;
        Ok(collector.into_results())
    }

    /// 同 run_batch，但结果追加到调用方持有的收集器中（失败前已完成的结果保留）
    pub async fn run_batch_into<S: AsRef<str>>(
        &self,
        questions: &[S],
        collector: &mut ResultCollector,
    ) -> Result<(), PipelineError> {
        let total = questions.len();
        for (idx, question) in questions.iter().enumerate() {
            tracing::info!("[{}/{}] {}", idx + 1, total, question.as_ref());
            let result = self.run_single_question(question.as_ref()).await?;
            tracing::info!(
                index = idx + 1,
                total,
                mode = ?result.terminal_mode,
                retrievals = result.total_retrievals,
                "question finished"
            );
            collector.push(result);
        }
        Ok(())
    }
}
