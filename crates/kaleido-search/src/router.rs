use crate::node::NodeType;
use crate::types::PipelineState;

/// Decides which stage runs next based on current state
pub trait Router: Send + Sync {
    /// First stage of a run
    fn entry(&self, state: &PipelineState) -> NodeType;

    fn next(&self, state: &PipelineState, current: NodeType) -> NextNode;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextNode {
    Filter,
    Summarize,
    End,
}

/// (retrieve | rerank) -> filter -> summarize, where summarize only runs
/// when filtering kept at least one document.
pub struct RetrieveRouter {
    summarize: bool,
}

impl RetrieveRouter {
    pub fn new(summarize: bool) -> Self {
        Self { summarize }
    }
}

impl Router for RetrieveRouter {
    fn entry(&self, state: &PipelineState) -> NodeType {
        if state.rerank {
            NodeType::Rerank
        } else {
            NodeType::Retrieve
        }
    }

    fn next(&self, state: &PipelineState, current: NodeType) -> NextNode {
        match current {
            NodeType::Retrieve | NodeType::Rerank => NextNode::Filter,
            NodeType::Filter if self.summarize && state.has_documents() => NextNode::Summarize,
            NodeType::Filter | NodeType::Summarize => NextNode::End,
        }
    }
}
