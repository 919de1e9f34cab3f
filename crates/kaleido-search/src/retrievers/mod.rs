//! Similarity search collaborators used by the retrieve and rerank stages.

mod chroma;
mod http_reranker;

pub use chroma::ChromaRetriever;
pub use http_reranker::HttpReranker;

use anyhow::Result;
use async_trait::async_trait;
use kaleido_types::RetrievedDocument;
use std::sync::Arc;

pub const DEFAULT_K: usize = 4;
pub const DEFAULT_RERANK_CANDIDATES: usize = 20;
pub const DEFAULT_RERANK_TOP_N: usize = 4;

/// Nearest-neighbour search over the product documents.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Documents closest to `query`, best match first
    async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>>;
}

/// Cross-encoder style scoring of (query, document) pairs.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// The `top_n` best documents, best first
    async fn rerank(
        &self,
        query: &str,
        documents: Vec<RetrievedDocument>,
        top_n: usize,
    ) -> Result<Vec<RetrievedDocument>>;
}

/// Retrieves a broad candidate pool from `base` and keeps the reranker's top N.
///
/// `base` is expected to be configured with a larger k than the plain
/// retriever, e.g. [`DEFAULT_RERANK_CANDIDATES`].
pub struct RerankRetriever {
    base: Arc<dyn Retriever>,
    reranker: Arc<dyn Reranker>,
    top_n: usize,
}

impl RerankRetriever {
    pub fn new(base: Arc<dyn Retriever>, reranker: Arc<dyn Reranker>) -> Self {
        Self {
            base,
            reranker,
            top_n: DEFAULT_RERANK_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

#[async_trait]
impl Retriever for RerankRetriever {
    async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let candidates = self.base.search(query).await?;
        if candidates.is_empty() {
            return Ok(candidates);
        }
        let count = candidates.len();
        let ranked = self.reranker.rerank(query, candidates, self.top_n).await?;
        tracing::debug!(candidates = count, kept = ranked.len(), "reranked candidates");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRetriever(Vec<RetrievedDocument>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn search(&self, _query: &str) -> Result<Vec<RetrievedDocument>> {
            Ok(self.0.clone())
        }
    }

    /// Ranks by descending ref_id
    struct ReverseReranker;

    #[async_trait]
    impl Reranker for ReverseReranker {
        async fn rerank(
            &self,
            _query: &str,
            mut documents: Vec<RetrievedDocument>,
            top_n: usize,
        ) -> Result<Vec<RetrievedDocument>> {
            documents.sort_by(|a, b| b.ref_id.cmp(&a.ref_id));
            documents.truncate(top_n);
            Ok(documents)
        }
    }

    #[tokio::test]
    async fn test_rerank_retriever_keeps_top_n() {
        let docs = (1..=20).map(|i| RetrievedDocument::new(i, "doc")).collect();
        let retriever = RerankRetriever::new(Arc::new(FixedRetriever(docs)), Arc::new(ReverseReranker));

        let result = retriever.search("laptop").await.unwrap();

        let ids: Vec<i64> = result.iter().map(|d| d.ref_id).collect();
        assert_eq!(ids, vec![20, 19, 18, 17]);
    }

    #[tokio::test]
    async fn test_rerank_retriever_skips_empty_pool() {
        let retriever = RerankRetriever::new(Arc::new(FixedRetriever(vec![])), Arc::new(ReverseReranker))
            .with_top_n(2);

        assert!(retriever.search("laptop").await.unwrap().is_empty());
    }
}
