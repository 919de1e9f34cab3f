use kaleido_types::RetrievedDocument;

use crate::types::config::{PipelineConfig, RetrievalRequest};

/// Working state of one pipeline run. Lives only for the duration of the run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub query: String,
    pub rerank: bool,
    pub title_length: usize,
    pub summary_length: usize,
    pub documents: Vec<RetrievedDocument>,
}

impl PipelineState {
    pub fn from_request(request: RetrievalRequest, config: &PipelineConfig) -> Self {
        Self {
            query: request.query,
            rerank: request.rerank,
            title_length: request.title_length.unwrap_or(config.title_length),
            summary_length: request.summary_length.unwrap_or(config.summary_length),
            documents: Vec::new(),
        }
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }
}
