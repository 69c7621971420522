use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use log::{info, warn};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use std::sync::Arc;
use std::time::Duration;

use super::store::{parse_id, stringify_id, DocumentStore, Push, StoreError};
use super::UNIQUE_FIELDS;

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, mongodb::error::Error> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.app_name = Some("globetrotter-api".to_string());
    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal; requests will surface store errors instead.
    match client.database("admin").run_command(doc! {"ping": 1}).await {
        Ok(_) => info!("Connected to MongoDB and verified with ping"),
        Err(e) => warn!("Connected to MongoDB but ping failed: {}", e),
    }

    Ok(Arc::new(client))
}

#[derive(Clone)]
pub struct MongoStore {
    client: Arc<Client>,
    database: String,
}

impl MongoStore {
    pub fn new(client: Arc<Client>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    /// Creates the unique indexes the handlers rely on to reject duplicates
    /// that slip past their existence checks. Idempotent.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for (collection, field) in UNIQUE_FIELDS {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection(collection).create_index(index).await?;
            info!("Ensured unique index on {}.{}", collection, field);
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.database).collection(name)
    }
}

fn field_filter(field: &str, value: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(field, value);
    filter
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! {"ping": 1})
            .await?;
        Ok(())
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        doc.remove("_id");
        let result = self.collection(collection).insert_one(doc).await?;
        result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| StoreError::Backend("Inserted id is not an ObjectId".to_string()))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let oid = parse_id(id)?;
        let found = self.collection(collection).find_one(doc! { "_id": oid }).await?;
        Ok(found.map(stringify_id))
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        let found = self
            .collection(collection)
            .find_one(field_filter(field, value))
            .await?;
        Ok(found.map(stringify_id))
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        mut fields: Document,
    ) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        fields.remove("_id");

        // An empty $set is rejected by the server.
        if fields.is_empty() {
            let found = self.collection(collection).find_one(doc! { "_id": oid }).await?;
            return Ok(found.is_some());
        }

        let result = self
            .collection(collection)
            .update_one(doc! { "_id": oid }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn push(&self, collection: &str, id: &str, push: Push) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;

        // Without this guard the server would create the missing parent
        // (or pad an array with nulls) instead of reporting no match.
        let mut filter = doc! { "_id": oid };
        if let Some(parent) = push.parent_path() {
            filter.insert(parent, doc! { "$exists": true });
        }

        let mut appended = Document::new();
        appended.insert(push.path, push.value);
        let mut update = doc! { "$push": appended };
        if !push.set.is_empty() {
            update.insert("$set", push.set);
        }
        if !push.inc.is_empty() {
            update.insert("$inc", push.inc);
        }

        let result = self.collection(collection).update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let result = self.collection(collection).delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_by_owner(
        &self,
        collection: &str,
        owner_field: &str,
        owner_id: &str,
    ) -> Result<Vec<Document>, StoreError> {
        // ObjectIds lead with their creation timestamp.
        let cursor = self
            .collection(collection)
            .find(field_filter(owner_field, owner_id))
            .sort(doc! { "_id": -1 })
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(stringify_id).collect())
    }
}
