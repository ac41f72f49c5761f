//! HTTP 检索客户端：对接独立部署的检索服务
//!
//! `POST {base_url}/batch_search`，请求体 `{"query": [...], "top_n": k}`，响应为 `[[Document, ...], ...]`。

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::retrieval::{Document, Retriever};

#[derive(Serialize)]
struct BatchSearchRequest<'a> {
    query: &'a [String],
    top_n: usize,
}

pub struct HttpRetriever {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRetriever {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            client,
            endpoint: format!("{}/batch_search", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn batch_search(
        &self,
        queries: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<Document>>, String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&BatchSearchRequest {
                query: queries,
                top_n: top_k,
            })
            .send()
            .await
            .map_err(|e| format!("retrieval request failed: {}", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("retrieval server returned {}: {}", status, body));
        }

        resp.json::<Vec<Vec<Document>>>()
            .await
            .map_err(|e| format!("malformed retrieval response: {}", e))
    }
}
