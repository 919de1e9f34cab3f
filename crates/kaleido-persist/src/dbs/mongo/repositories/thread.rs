use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{options::ReturnDocument, Client, Collection};

use crate::dbs::mongo::models::{MongoCheckpoint, MongoThread};
use crate::error::{PersistError, Result};

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn create_thread(&self, user_id: &str) -> Result<MongoThread> {
        let thread = MongoThread::new(user_id);
        self.collection.insert_one(&thread).await?;
        Ok(thread)
    }

    pub async fn get_thread(&self, thread_id: ObjectId) -> Result<Option<MongoThread>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn list_threads(&self, user_id: &str) -> Result<Vec<MongoThread>> {
        let filter = doc! { "user_id": user_id };
        let threads = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .projection(doc! { "checkpoint": 0 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn touch(&self, thread_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": thread_id };
        let update = doc! { "$set": { "updated_at": bson::DateTime::now() } };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_hex()));
        }
        Ok(())
    }

    /// Replaces the embedded checkpoint and bumps its version in one
    /// document update. Returns the thread as written.
    pub async fn put_checkpoint(
        &self,
        thread_id: ObjectId,
        checkpoint: MongoCheckpoint,
    ) -> Result<MongoThread> {
        let filter = doc! { "_id": thread_id };
        let update = doc! {
            "$set": { "checkpoint": bson::to_bson(&checkpoint)? },
            "$inc": { "checkpoint_version": 1_i64 },
        };

        self.collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_hex()))
    }

    /// Removes the thread document, and with it the embedded checkpoint
    pub async fn delete_thread(&self, thread_id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": thread_id };
        let result = self.collection.delete_one(filter).await?;
        if result.deleted_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_hex()));
        }
        Ok(())
    }
}
