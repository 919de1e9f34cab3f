use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Relevance judgment for one retrieved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelevanceVerdict {
    /// Document ID as given in the prompt
    pub id: i64,
    /// Whether the document matches the shopper's query
    pub relevant: bool,
}

/// One verdict per document in the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelevanceVerdictList {
    pub verdicts: Vec<RelevanceVerdict>,
}

/// Rewritten title and description for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SummarizedContent {
    /// Document ID as given in the prompt
    pub id: i64,
    /// Short product title
    pub title: String,
    /// Product description tailored to the shopper's query
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryList {
    pub summaries: Vec<SummarizedContent>,
}
