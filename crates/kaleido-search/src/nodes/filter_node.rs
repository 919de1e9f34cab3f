use async_trait::async_trait;
use kaleido_llm::Message;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::node::{Node, NodeType};
use crate::oracle::{Oracle, OutputSchema};
use crate::prompts::filter_documents_prompt;
use crate::types::PipelineState;

/// Keeps only the documents the oracle judges relevant, in their original
/// order. All documents are graded in one call.
pub struct FilterNode {
    oracle: Arc<dyn Oracle>,
}

impl FilterNode {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl Node for FilterNode {
    async fn execute(&self, state: &mut PipelineState) -> Result<()> {
        if state.documents.is_empty() {
            return Ok(());
        }

        let prompt = filter_documents_prompt(&state.query, &state.documents);
        let verdicts = self
            .oracle
            .invoke_structured(&[Message::human(prompt)], OutputSchema::RelevanceVerdicts)
            .await?
            .into_relevance_verdicts()?;

        // Last verdict per id wins; ids outside the batch are never added
        let relevant: HashMap<i64, bool> = verdicts
            .verdicts
            .into_iter()
            .map(|v| (v.id, v.relevant))
            .collect();

        let before = state.documents.len();
        state
            .documents
            .retain(|doc| relevant.get(&doc.ref_id).copied().unwrap_or(false));
        tracing::debug!(before, after = state.documents.len(), "filtered documents");
        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Filter
    }
}
