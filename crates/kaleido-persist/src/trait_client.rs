use async_trait::async_trait;
use kaleido_types::{ConversationCheckpoint, Product, Thread};

use crate::error::Result;

/// Thread lifecycle.
///
/// Deleting a thread must remove its checkpoint in the same unit of work.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn create_thread(&self, user_id: &str) -> Result<Thread>;

    async fn find_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Deletes the thread and its checkpoint. Fails with `ThreadNotFound`
    /// if there was nothing to delete.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Bumps `updated_at`
    async fn touch_thread(&self, thread_id: &str) -> Result<()>;

    /// Threads owned by `user_id`, most recently updated first
    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>>;

    async fn has_access(&self, user_id: &str, thread_id: &str) -> Result<bool> {
        Ok(self
            .find_thread(thread_id)
            .await?
            .is_some_and(|thread| thread.user_id == user_id))
    }
}

/// Latest conversation snapshot per thread.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get_checkpoint(&self, thread_id: &str) -> Result<Option<ConversationCheckpoint>>;

    /// Replaces the snapshot and returns it with the store-assigned version.
    /// Writing to a thread that no longer exists fails with `ThreadNotFound`.
    async fn put_checkpoint(
        &self,
        thread_id: &str,
        checkpoint: ConversationCheckpoint,
    ) -> Result<ConversationCheckpoint>;
}

/// Read access to the product catalogue.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Products for the ids that still exist, in no particular order
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>>;
}
