//! 检索层：稠密检索服务的抽象（批量查询 -> 每个查询的文档列表）
//!
//! 流水线只发送单查询批次；空的内层列表表示该查询没有结果。

pub mod http;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpRetriever;
pub use mock::StaticRetriever;

use crate::config::AppConfig;

/// 检索返回的文档：正文优先取 `contents`，缺失时退回 `text`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Document {
    pub fn from_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            ..Self::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// 用于拼 prompt 的正文
    pub fn body(&self) -> &str {
        self.contents
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or("")
    }
}

/// 检索能力
#[async_trait]
pub trait Retriever: Send + Sync {
    /// 对每个查询返回 top_k 篇文档，外层顺序与 queries 一致
    async fn batch_search(
        &self,
        queries: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<Document>>, String>;
}

/// 按配置创建检索客户端：http（默认）或 mock（空检索器，所有查询都无结果）
pub fn create_retriever_from_config(cfg: &AppConfig) -> Result<Arc<dyn Retriever>, String> {
    match cfg.retrieval.provider.to_lowercase().as_str() {
        "mock" => {
            tracing::warn!("Using mock retriever: every query returns no documents");
            Ok(Arc::new(StaticRetriever::empty()))
        }
        _ => {
            tracing::info!("Using HTTP retriever at {}", cfg.retrieval.base_url);
            let retriever = HttpRetriever::new(
                &cfg.retrieval.base_url,
                Duration::from_secs(cfg.retrieval.timeout_secs),
            )?;
            Ok(Arc::new(retriever))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_prefers_contents() {
        let doc = Document {
            contents: Some("primary".into()),
            text: Some("fallback".into()),
            ..Document::default()
        };
        assert_eq!(doc.body(), "primary");
        assert_eq!(Document::from_text("fallback").body(), "fallback");
        assert_eq!(Document::default().body(), "");
    }

    #[test]
    fn test_document_deserializes_partial_fields() {
        let doc: Document = serde_json::from_str(r#"{"id": "12", "contents": "Paris\nCapital of France"}"#).unwrap();
        assert_eq!(doc.id.as_deref(), Some("12"));
        assert!(doc.text.is_none());
        assert!(doc.body().starts_with("Paris"));
    }
}
