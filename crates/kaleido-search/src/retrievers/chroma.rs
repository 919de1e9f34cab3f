use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use kaleido_llm::{EmbeddingClient, EmbeddingRequest};
use kaleido_types::RetrievedDocument;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{Retriever, DEFAULT_K};

/// Similarity search against a Chroma collection over its REST API.
///
/// The query is embedded client-side, so the collection must have been
/// built with the same embedding model.
pub struct ChromaRetriever {
    http_client: reqwest::Client,
    base_url: String,
    collection: String,
    collection_id: OnceCell<String>,
    embeddings: Arc<dyn EmbeddingClient>,
    embedding_model: String,
    k: usize,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<Map<String, Value>>>>,
}

impl ChromaRetriever {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        embeddings: Arc<dyn EmbeddingClient>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            collection_id: OnceCell::new(),
            embeddings,
            embedding_model: embedding_model.into(),
            k: DEFAULT_K,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| self.fetch_collection_id())
            .await?;
        Ok(id.as_str())
    }

    async fn fetch_collection_id(&self) -> Result<String> {
        let response = self
            .http_client
            .get(format!("{}/api/v1/collections/{}", self.base_url, self.collection))
            .send()
            .await
            .context("Failed to reach Chroma")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Chroma collection '{}' unavailable ({})", self.collection, status);
        }

        let info: CollectionInfo = response
            .json()
            .await
            .context("Failed to parse Chroma collection")?;
        tracing::debug!(collection = %self.collection, id = %info.id, "resolved Chroma collection");
        Ok(info.id)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embeddings
            .embed(EmbeddingRequest::new(self.embedding_model.clone(), vec![query.to_string()]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedding response was empty"))
    }
}

fn ref_id(metadata: &Map<String, Value>) -> Option<i64> {
    match metadata.get("ref_id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Retriever for ChromaRetriever {
    async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let embedding = self.embed_query(query).await?;
        let collection_id = self.collection_id().await?;

        let response = self
            .http_client
            .post(format!("{}/api/v1/collections/{}/query", self.base_url, collection_id))
            .json(&json!({
                "query_embeddings": [embedding],
                "n_results": self.k,
                "include": ["documents", "metadatas"],
            }))
            .send()
            .await
            .context("Failed to send Chroma query")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chroma query error ({}): {}", status, error_text);
        }

        let result: QueryResponse = response
            .json()
            .await
            .context("Failed to parse Chroma query response")?;

        // One query embedding in, so one row of results out
        let documents = result.documents.into_iter().next().unwrap_or_default();
        let metadatas = result.metadatas.into_iter().next().unwrap_or_default();

        let mut retrieved = Vec::with_capacity(documents.len());
        for (content, metadata) in documents.into_iter().zip(metadatas) {
            match (content, metadata.as_ref().and_then(ref_id)) {
                (Some(content), Some(ref_id)) => {
                    retrieved.push(RetrievedDocument::new(ref_id, content))
                }
                _ => tracing::warn!(collection = %self.collection, "skipping Chroma result without content or ref_id"),
            }
        }
        Ok(retrieved)
    }
}
