use async_trait::async_trait;

use crate::error::Result;
use crate::types::PipelineState;

/// One stage of the retrieval pipeline.
#[async_trait]
pub trait Node: Send + Sync {
    /// Runs the stage, narrowing or rewriting `state.documents`
    async fn execute(&self, state: &mut PipelineState) -> Result<()>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Retrieve,
    Rerank,
    Filter,
    Summarize,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Rerank => "rerank",
            Self::Filter => "filter",
            Self::Summarize => "summarize",
        }
    }
}
