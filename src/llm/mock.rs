//! Mock / 脚本化 LLM 客户端（用于离线运行与测试，无需 API）
//!
//! - MockLlmClient：按调用点（system prompt）返回固定回复，Planner 永远直接回答 ANSWER_READY，便于本地跑通流程。
//! - ScriptedLlmClient：由闭包决定回复，并记录每次调用的对话与采样参数，供测试断言。

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{GenerationParams, LlmClient, Message, Role};
use crate::pipeline::prompts;

/// Mock 客户端：离线可用的确定性回复
#[derive(Debug, Default)]
pub struct MockLlmClient;

fn system_of(messages: &[Message]) -> &str {
    messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

fn last_user(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("(no input)")
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(
        &self,
        messages: &[Message],
        _params: GenerationParams,
    ) -> Result<Vec<String>, String> {
        let system = system_of(messages);
        let reply = if system == prompts::PLANNER_SYSTEM {
            prompts::ANSWER_READY.to_string()
        } else if system == prompts::VERIFIER_SYSTEM {
            "Verdict: INSUFFICIENT\nCorrected Statement:\nEvidence: mock backend".to_string()
        } else if system == prompts::REWRITE_SYSTEM {
            String::new()
        } else if system == prompts::SUMMARY_SYSTEM {
            last_user(messages)
                .split_whitespace()
                .take(50)
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            "Mock answer".to_string()
        };
        Ok(vec![reply])
    }
}

/// 一次被记录的调用
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub params: GenerationParams,
}

impl RecordedCall {
    pub fn system(&self) -> &str {
        system_of(&self.messages)
    }

    pub fn prompt(&self) -> &str {
        last_user(&self.messages)
    }
}

type Responder = dyn Fn(&[Message], GenerationParams) -> String + Send + Sync;

/// 脚本化客户端：闭包决定回复内容
pub struct ScriptedLlmClient {
    responder: Box<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlmClient {
    pub fn new(
        responder: impl Fn(&[Message], GenerationParams) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 已记录调用的快照（按调用顺序）
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// 统计 system prompt 为指定值的调用次数
    pub fn count_calls(&self, system: &str) -> usize {
        self.calls().iter().filter(|c| c.system() == system).count()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn generate(
        &self,
        messages: &[Message],
        params: GenerationParams,
    ) -> Result<Vec<String>, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                messages: messages.to_vec(),
                params,
            });
        }
        Ok(vec![(self.responder)(messages, params)])
    }
}
