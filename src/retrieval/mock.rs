//! 静态检索器：按查询文本返回预设文档，未命中时返回默认结果（离线运行与测试使用）

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::retrieval::{Document, Retriever};

#[derive(Debug, Default)]
pub struct StaticRetriever {
    responses: HashMap<String, Vec<Document>>,
    default: Vec<Document>,
    queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    /// 所有查询都没有结果
    pub fn empty() -> Self {
        Self::default()
    }

    /// 所有查询都返回同一组文档
    pub fn always(docs: Vec<Document>) -> Self {
        Self {
            default: docs,
            ..Self::default()
        }
    }

    pub fn with_response(mut self, query: impl Into<String>, docs: Vec<Document>) -> Self {
        self.responses.insert(query.into(), docs);
        self
    }

    /// 收到过的查询（按顺序）
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn batch_search(
        &self,
        queries: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<Document>>, String> {
        if let Ok(mut seen) = self.queries.lock() {
            seen.extend(queries.iter().cloned());
        }
        Ok(queries
            .iter()
            .map(|q| {
                let docs = self.responses.get(q).unwrap_or(&self.default);
                docs.iter().take(top_k).cloned().collect()
            })
            .collect())
    }
}
