use kaleido_persist::{ProductLookup, ThreadStore};
use kaleido_types::{
    ProductRecommendation, QueryEvaluation, QueryEvaluationOut, RetrievedDocument, Thread,
    UserSearch,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::QueryEvaluationEngine;
use crate::error::{Result, SearchError};
use crate::pipeline::RetrievalPipeline;
use crate::types::RetrievalRequest;

/// Entry point for the search flows: owns thread lifecycle and access
/// checks, delegates refinement to the engine and retrieval to the pipeline.
pub struct SearchOrchestrator {
    threads: Arc<dyn ThreadStore>,
    products: Arc<dyn ProductLookup>,
    engine: QueryEvaluationEngine,
    pipeline: RetrievalPipeline,
}

impl SearchOrchestrator {
    pub fn new(
        threads: Arc<dyn ThreadStore>,
        products: Arc<dyn ProductLookup>,
        engine: QueryEvaluationEngine,
        pipeline: RetrievalPipeline,
    ) -> Self {
        Self {
            threads,
            products,
            engine,
            pipeline,
        }
    }

    pub fn builder() -> crate::builder::OrchestratorBuilder {
        crate::builder::OrchestratorBuilder::new()
    }

    /// Evaluates a shopper turn. Without a thread id a new thread is created
    /// first and deleted again if the turn fails.
    pub async fn evaluate(
        &self,
        user_id: &str,
        search: &UserSearch,
        thread_id: Option<&str>,
    ) -> Result<QueryEvaluationOut> {
        if let Some(thread_id) = thread_id {
            self.authorize(user_id, thread_id).await?;
            return self.evaluate_in_thread(thread_id, search).await;
        }

        let thread = self.threads.create_thread(user_id).await?;
        tracing::info!(thread_id = %thread.id, user_id, "created thread");

        match self.evaluate_in_thread(&thread.id, search).await {
            Ok(out) => Ok(out),
            Err(err) => {
                if let Err(cleanup) = self.threads.delete_thread(&thread.id).await {
                    tracing::warn!(
                        thread_id = %thread.id,
                        error = %cleanup,
                        "failed to remove thread after failed evaluation"
                    );
                }
                Err(err)
            }
        }
    }

    async fn evaluate_in_thread(
        &self,
        thread_id: &str,
        search: &UserSearch,
    ) -> Result<QueryEvaluationOut> {
        let out = self.engine.evaluate(thread_id, search).await?;
        self.threads.touch_thread(thread_id).await?;
        Ok(out)
    }

    /// Creates a thread without running a turn.
    pub async fn create_thread(&self, user_id: &str) -> Result<QueryEvaluationOut> {
        let thread = self.threads.create_thread(user_id).await?;
        tracing::info!(thread_id = %thread.id, user_id, "created empty thread");
        Ok(QueryEvaluationOut::new(thread.id, QueryEvaluation::default()))
    }

    pub async fn get_evaluation(&self, user_id: &str, thread_id: &str) -> Result<QueryEvaluationOut> {
        self.authorize(user_id, thread_id).await?;
        let evaluation = self.engine.get_evaluation(thread_id).await?;
        Ok(QueryEvaluationOut::new(thread_id, evaluation))
    }

    /// Products matching the thread's cleaned query, in pipeline order.
    pub async fn recommend(
        &self,
        user_id: &str,
        thread_id: &str,
        rerank: bool,
    ) -> Result<Vec<ProductRecommendation>> {
        self.authorize(user_id, thread_id).await?;

        let evaluation = self.engine.get_evaluation(thread_id).await?;
        let query = evaluation.search_query().ok_or(SearchError::NeedsRefinement)?;

        let documents = self
            .pipeline
            .run(RetrievalRequest::new(query).rerank(rerank))
            .await?;
        self.map_documents_to_products(documents).await
    }

    pub async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>> {
        Ok(self.threads.list_threads(user_id).await?)
    }

    pub async fn delete_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        self.authorize(user_id, thread_id).await?;
        self.threads.delete_thread(thread_id).await?;
        tracing::info!(thread_id, user_id, "deleted thread");
        Ok(())
    }

    async fn authorize(&self, user_id: &str, thread_id: &str) -> Result<()> {
        match self.threads.find_thread(thread_id).await? {
            None => Err(SearchError::NotFound(thread_id.to_string())),
            Some(thread) if thread.user_id != user_id => {
                Err(SearchError::AccessDenied(thread_id.to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    async fn map_documents_to_products(
        &self,
        documents: Vec<RetrievedDocument>,
    ) -> Result<Vec<ProductRecommendation>> {
        let ids: Vec<i64> = documents.iter().map(|d| d.ref_id).collect();
        let products: HashMap<i64, _> = self
            .products
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(documents
            .into_iter()
            .filter_map(|doc| match products.get(&doc.ref_id) {
                Some(product) => Some(ProductRecommendation::new(product.clone(), doc)),
                None => {
                    tracing::debug!(ref_id = doc.ref_id, "dropping document without product");
                    None
                }
            })
            .collect())
    }
}
