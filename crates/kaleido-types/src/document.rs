use serde::{Deserialize, Serialize};

/// A document returned by similarity search. `ref_id` points at the product
/// the document was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub ref_id: i64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_title: Option<String>,
}

impl RetrievedDocument {
    pub fn new(ref_id: i64, content: impl Into<String>) -> Self {
        Self {
            ref_id,
            content: content.into(),
            ai_title: None,
        }
    }
}
