use anyhow::{anyhow, Result};
use kaleido_persist::{CheckpointStore, ProductLookup, ThreadStore};
use std::sync::Arc;

use crate::engine::QueryEvaluationEngine;
use crate::oracle::Oracle;
use crate::orchestrator::SearchOrchestrator;
use crate::pipeline::RetrievalPipeline;
use crate::retrievers::Retriever;
use crate::types::PipelineConfig;

/// Builder for wiring a [`SearchOrchestrator`] from its collaborators
pub struct OrchestratorBuilder {
    oracle: Option<Arc<dyn Oracle>>,
    threads: Option<Arc<dyn ThreadStore>>,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
    products: Option<Arc<dyn ProductLookup>>,
    retriever: Option<Arc<dyn Retriever>>,
    rerank_retriever: Option<Arc<dyn Retriever>>,
    config: PipelineConfig,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            oracle: None,
            threads: None,
            checkpoints: None,
            products: None,
            retriever: None,
            rerank_retriever: None,
            config: PipelineConfig::default(),
        }
    }

    pub fn oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn thread_store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.threads = Some(store);
        self
    }

    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }

    pub fn product_lookup(mut self, lookup: Arc<dyn ProductLookup>) -> Self {
        self.products = Some(lookup);
        self
    }

    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Retriever used for `rerank=true` requests
    pub fn rerank_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.rerank_retriever = Some(retriever);
        self
    }

    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<SearchOrchestrator> {
        let oracle = self.oracle.ok_or_else(|| anyhow!("Oracle is required"))?;
        let threads = self.threads.ok_or_else(|| anyhow!("Thread store is required"))?;
        let checkpoints = self
            .checkpoints
            .ok_or_else(|| anyhow!("Checkpoint store is required"))?;
        let products = self
            .products
            .ok_or_else(|| anyhow!("Product lookup is required"))?;
        let retriever = self.retriever.ok_or_else(|| anyhow!("Retriever is required"))?;

        let engine = QueryEvaluationEngine::new(Arc::clone(&oracle), checkpoints);
        let mut pipeline = RetrievalPipeline::new(retriever, oracle, self.config);
        if let Some(rerank) = self.rerank_retriever {
            pipeline = pipeline.with_rerank_retriever(rerank);
        }

        Ok(SearchOrchestrator::new(threads, products, engine, pipeline))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
