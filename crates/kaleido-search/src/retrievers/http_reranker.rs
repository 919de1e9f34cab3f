use anyhow::{Context, Result};
use async_trait::async_trait;
use kaleido_types::RetrievedDocument;
use serde::{Deserialize, Serialize};

use super::Reranker;

/// Cross-encoder served over HTTP with the text-embeddings-inference
/// `/rerank` contract.
pub struct HttpReranker {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: Vec<&'a str>,
}

#[derive(Deserialize)]
struct RerankScore {
    index: usize,
    score: f32,
}

impl HttpReranker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Reranker for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: Vec<RetrievedDocument>,
        top_n: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let request = RerankRequest {
            query,
            texts: documents.iter().map(|d| d.content.as_str()).collect(),
        };

        let response = self
            .http_client
            .post(format!("{}/rerank", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send rerank request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Reranker error ({}): {}", status, error_text);
        }

        let mut scores: Vec<RerankScore> = response
            .json()
            .await
            .context("Failed to parse rerank response")?;
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut slots: Vec<Option<RetrievedDocument>> = documents.into_iter().map(Some).collect();
        Ok(scores
            .into_iter()
            .filter_map(|s| slots.get_mut(s.index).and_then(Option::take))
            .take(top_n)
            .collect())
    }
}
