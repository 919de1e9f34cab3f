use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::node::{Node, NodeType};
use crate::retrievers::Retriever;
use crate::types::PipelineState;

/// Fills the state with candidates from a retriever. The same node serves
/// the plain and the reranking entry point; only the retriever differs.
pub struct RetrieveNode {
    retriever: Arc<dyn Retriever>,
    node_type: NodeType,
}

impl RetrieveNode {
    pub fn plain(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            node_type: NodeType::Retrieve,
        }
    }

    pub fn reranking(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            node_type: NodeType::Rerank,
        }
    }
}

#[async_trait]
impl Node for RetrieveNode {
    async fn execute(&self, state: &mut PipelineState) -> Result<()> {
        state.documents = self
            .retriever
            .search(&state.query)
            .await
            .map_err(SearchError::Retrieval)?;
        Ok(())
    }

    fn node_type(&self) -> NodeType {
        self.node_type
    }
}
