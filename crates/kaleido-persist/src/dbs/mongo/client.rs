use async_trait::async_trait;
use bson::oid::ObjectId;
use kaleido_types::{ConversationCheckpoint, Product, Thread};
use mongodb::Client;

use crate::dbs::mongo::repositories::{MongoProductRepository, MongoThreadRepository};
use crate::error::{PersistError, Result};
use crate::trait_client::{CheckpointStore, ProductLookup, ThreadStore};

/// MongoDB-backed implementation of every store contract.
pub struct MongoStore {
    thread_repo: MongoThreadRepository,
    product_repo: MongoProductRepository,
}

impl MongoStore {
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database, "connected to MongoDB");

        Ok(Self {
            thread_repo: MongoThreadRepository::new(&client, database),
            product_repo: MongoProductRepository::new(&client, database),
        })
    }
}

/// A string that is not an ObjectId cannot name a stored thread.
fn parse_thread_id(thread_id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(thread_id).map_err(|_| PersistError::ThreadNotFound(thread_id.to_string()))
}

#[async_trait]
impl ThreadStore for MongoStore {
    async fn create_thread(&self, user_id: &str) -> Result<Thread> {
        let thread = self.thread_repo.create_thread(user_id).await?;
        Ok(thread.into())
    }

    async fn find_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let Ok(object_id) = ObjectId::parse_str(thread_id) else {
            return Ok(None);
        };
        let thread = self.thread_repo.get_thread(object_id).await?;
        Ok(thread.map(Into::into))
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.thread_repo
            .delete_thread(parse_thread_id(thread_id)?)
            .await
    }

    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        self.thread_repo.touch(parse_thread_id(thread_id)?).await
    }

    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>> {
        let threads = self.thread_repo.list_threads(user_id).await?;
        Ok(threads.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CheckpointStore for MongoStore {
    async fn get_checkpoint(&self, thread_id: &str) -> Result<Option<ConversationCheckpoint>> {
        let Ok(object_id) = ObjectId::parse_str(thread_id) else {
            return Ok(None);
        };
        let thread = self.thread_repo.get_thread(object_id).await?;
        Ok(thread.and_then(|t| t.into_checkpoint()))
    }

    async fn put_checkpoint(
        &self,
        thread_id: &str,
        checkpoint: ConversationCheckpoint,
    ) -> Result<ConversationCheckpoint> {
        let written = self
            .thread_repo
            .put_checkpoint(parse_thread_id(thread_id)?, checkpoint.into())
            .await?;

        written
            .into_checkpoint()
            .ok_or_else(|| PersistError::Internal(format!("checkpoint missing after write to {}", thread_id)))
    }
}

#[async_trait]
impl ProductLookup for MongoStore {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = self.product_repo.find_by_ids(ids).await?;
        Ok(products.into_iter().map(Into::into).collect())
    }
}
