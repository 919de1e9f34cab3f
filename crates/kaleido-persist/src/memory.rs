use async_trait::async_trait;
use chrono::Utc;
use kaleido_types::{ConversationCheckpoint, Product, Thread};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PersistError, Result};
use crate::trait_client::{CheckpointStore, ProductLookup, ThreadStore};

#[derive(Default)]
struct Tables {
    threads: HashMap<String, Thread>,
    checkpoints: HashMap<String, ConversationCheckpoint>,
    products: HashMap<i64, Product>,
}

/// Process-local store. Threads, checkpoints and products sit behind one
/// lock, so deleting a thread and its checkpoint is a single write.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let tables = Tables {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            ..Default::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub async fn insert_product(&self, product: Product) {
        self.tables.write().await.products.insert(product.id, product);
    }

    pub async fn thread_count(&self) -> usize {
        self.tables.read().await.threads.len()
    }
}

#[async_trait]
impl ThreadStore for InMemoryStore {
    async fn create_thread(&self, user_id: &str) -> Result<Thread> {
        let thread = Thread::new(Uuid::new_v4().to_string(), user_id);
        self.tables
            .write()
            .await
            .threads
            .insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn find_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.tables.read().await.threads.get(thread_id).cloned())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.checkpoints.remove(thread_id);
        tables
            .threads
            .remove(thread_id)
            .map(|_| ())
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn touch_thread(&self, thread_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let thread = tables
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        thread.updated_at = Utc::now();
        Ok(())
    }

    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>> {
        let tables = self.tables.read().await;
        let mut threads: Vec<Thread> = tables
            .threads
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }
}

#[async_trait]
impl CheckpointStore for InMemoryStore {
    async fn get_checkpoint(&self, thread_id: &str) -> Result<Option<ConversationCheckpoint>> {
        Ok(self.tables.read().await.checkpoints.get(thread_id).cloned())
    }

    async fn put_checkpoint(
        &self,
        thread_id: &str,
        mut checkpoint: ConversationCheckpoint,
    ) -> Result<ConversationCheckpoint> {
        let mut tables = self.tables.write().await;
        if !tables.threads.contains_key(thread_id) {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }

        let previous = tables.checkpoints.get(thread_id).map_or(0, |c| c.version);
        checkpoint.version = previous + 1;
        checkpoint.updated_at = Utc::now();
        tables
            .checkpoints
            .insert(thread_id.to_string(), checkpoint.clone());
        Ok(checkpoint)
    }
}

#[async_trait]
impl ProductLookup for InMemoryStore {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.get(id).cloned())
            .collect())
    }
}
