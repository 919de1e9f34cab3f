use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE_LENGTH: usize = 7;
pub const DEFAULT_SUMMARY_LENGTH: usize = 100;

/// Pipeline-wide settings, fixed at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rewrite relevant documents before returning them
    pub summarize: bool,
    /// Target title length, in words
    pub title_length: usize,
    /// Target description length, in words
    pub summary_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            summarize: true,
            title_length: DEFAULT_TITLE_LENGTH,
            summary_length: DEFAULT_SUMMARY_LENGTH,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summarize(mut self, enabled: bool) -> Self {
        self.summarize = enabled;
        self
    }

    pub fn with_title_length(mut self, words: usize) -> Self {
        self.title_length = words;
        self
    }

    pub fn with_summary_length(mut self, words: usize) -> Self {
        self.summary_length = words;
        self
    }
}

/// A single pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalRequest {
    pub query: String,
    pub rerank: bool,
    /// Overrides [`PipelineConfig::title_length`]
    pub title_length: Option<usize>,
    /// Overrides [`PipelineConfig::summary_length`]
    pub summary_length: Option<usize>,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            rerank: false,
            title_length: None,
            summary_length: None,
        }
    }

    pub fn rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }

    pub fn title_length(mut self, words: usize) -> Self {
        self.title_length = Some(words);
        self
    }

    pub fn summary_length(mut self, words: usize) -> Self {
        self.summary_length = Some(words);
        self
    }
}
