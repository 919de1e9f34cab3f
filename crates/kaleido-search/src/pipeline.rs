use kaleido_types::RetrievedDocument;
use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::node::{Node, NodeType};
use crate::nodes::{FilterNode, RetrieveNode, SummarizeNode};
use crate::oracle::Oracle;
use crate::retrievers::Retriever;
use crate::router::{NextNode, RetrieveRouter, Router};
use crate::types::{PipelineConfig, PipelineState, RetrievalRequest};

/// Retrieve (or rerank), filter, then summarize when anything survived the
/// filter. Runs are stateless; each call builds its own [`PipelineState`].
pub struct RetrievalPipeline {
    retrieve: RetrieveNode,
    rerank: Option<RetrieveNode>,
    filter: FilterNode,
    summarize: SummarizeNode,
    router: RetrieveRouter,
    config: PipelineConfig,
}

impl RetrievalPipeline {
    pub fn new(retriever: Arc<dyn Retriever>, oracle: Arc<dyn Oracle>, config: PipelineConfig) -> Self {
        Self {
            retrieve: RetrieveNode::plain(retriever),
            rerank: None,
            filter: FilterNode::new(Arc::clone(&oracle)),
            summarize: SummarizeNode::new(oracle),
            router: RetrieveRouter::new(config.summarize),
            config,
        }
    }

    /// Retriever used when a request asks for reranking
    pub fn with_rerank_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.rerank = Some(RetrieveNode::reranking(retriever));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, request: RetrievalRequest) -> Result<Vec<RetrievedDocument>> {
        let start_time = Instant::now();
        let mut state = PipelineState::from_request(request, &self.config);

        if state.rerank && self.rerank.is_none() {
            tracing::warn!("rerank requested but no rerank retriever configured, using plain retrieval");
            state.rerank = false;
        }

        let mut current = self.router.entry(&state);
        loop {
            let node_start = Instant::now();
            let node = self.node(current);
            node.execute(&mut state).await?;
            tracing::debug!(
                stage = node.node_type().as_str(),
                documents = state.documents.len(),
                duration_ms = node_start.elapsed().as_millis() as u64,
                "pipeline stage finished"
            );

            match self.router.next(&state, current) {
                NextNode::Filter => current = NodeType::Filter,
                NextNode::Summarize => current = NodeType::Summarize,
                NextNode::End => break,
            }
        }

        tracing::info!(
            documents = state.documents.len(),
            rerank = state.rerank,
            total_duration_ms = start_time.elapsed().as_millis() as u64,
            "retrieval pipeline finished"
        );
        Ok(state.documents)
    }

    fn node(&self, node_type: NodeType) -> &dyn Node {
        match node_type {
            NodeType::Retrieve => &self.retrieve,
            NodeType::Rerank => self.rerank.as_ref().unwrap_or(&self.retrieve),
            NodeType::Filter => &self.filter,
            NodeType::Summarize => &self.summarize,
        }
    }
}
