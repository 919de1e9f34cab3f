use bson::doc;
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoProduct;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<MongoProduct>,
}

impl MongoProductRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("products");
        Self { collection }
    }

    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<MongoProduct>> {
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let products = self.collection.find(filter).await?.try_collect().await?;
        Ok(products)
    }
}
