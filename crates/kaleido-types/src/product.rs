use serde::{Deserialize, Serialize};

use crate::document::RetrievedDocument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub shop: Shop,
}

/// A product paired with the text the pipeline produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    #[serde(flatten)]
    pub product: Product,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_title: Option<String>,
}

impl ProductRecommendation {
    pub fn new(product: Product, document: RetrievedDocument) -> Self {
        Self {
            product,
            description: document.content,
            ai_title: document.ai_title,
        }
    }
}
