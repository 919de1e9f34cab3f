use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use kaleido_llm::Message;
use kaleido_types::{ConversationCheckpoint, Product, QueryEvaluation, Shop, Thread};
use serde::{Deserialize, Serialize};

/// Thread document. The checkpoint is embedded so that deleting the thread
/// removes it in the same write, and a checkpoint write for a missing
/// thread matches nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<MongoCheckpoint>,
    /// Bumped with `$inc` on every checkpoint write
    #[serde(default)]
    pub checkpoint_version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCheckpoint {
    pub transcript: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<QueryEvaluation>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoProduct {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub shop: MongoShop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoShop {
    pub name: String,
    pub url: String,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id.to_hex(),
            user_id: thread.user_id,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl MongoThread {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
            checkpoint: None,
            checkpoint_version: 0,
        }
    }

    /// Embedded checkpoint, stamped with the thread's write counter
    pub fn into_checkpoint(self) -> Option<ConversationCheckpoint> {
        let version = u64::try_from(self.checkpoint_version).unwrap_or_default();
        self.checkpoint.map(|c| ConversationCheckpoint {
            transcript: c.transcript,
            evaluation: c.evaluation,
            version,
            updated_at: c.updated_at,
        })
    }
}

impl From<ConversationCheckpoint> for MongoCheckpoint {
    fn from(checkpoint: ConversationCheckpoint) -> Self {
        Self {
            transcript: checkpoint.transcript,
            evaluation: checkpoint.evaluation,
            updated_at: Utc::now(),
        }
    }
}

impl From<MongoProduct> for Product {
    fn from(product: MongoProduct) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            url: product.url,
            thumbnail_url: product.thumbnail_url,
            shop: Shop {
                name: product.shop.name,
                url: product.shop.url,
            },
        }
    }
}
