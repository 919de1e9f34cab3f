use async_trait::async_trait;
use kaleido_llm::Message;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::node::{Node, NodeType};
use crate::oracle::{Oracle, OutputSchema};
use crate::prompts::summarize_documents_prompt;
use crate::types::{PipelineState, SummarizedContent};

/// Rewrites each document's content and title in one batched call.
/// Documents the oracle leaves out keep their original content.
pub struct SummarizeNode {
    oracle: Arc<dyn Oracle>,
}

impl SummarizeNode {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl Node for SummarizeNode {
    async fn execute(&self, state: &mut PipelineState) -> Result<()> {
        if state.documents.is_empty() {
            return Ok(());
        }

        let prompt =
            summarize_documents_prompt(&state.documents, state.title_length, state.summary_length);
        let summaries = self
            .oracle
            .invoke_structured(&[Message::human(prompt)], OutputSchema::Summaries)
            .await?
            .into_summaries()?;

        let mut by_id: HashMap<i64, SummarizedContent> = summaries
            .summaries
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        for doc in state.documents.iter_mut() {
            if let Some(summary) = by_id.remove(&doc.ref_id) {
                // Blank fields keep the retrieved text
                if !summary.description.trim().is_empty() {
                    doc.content = summary.description;
                }
                if !summary.title.trim().is_empty() {
                    doc.ai_title = Some(summary.title);
                }
            }
        }
        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Summarize
    }
}
