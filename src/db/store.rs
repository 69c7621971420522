use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Duplicate value for unique field '{0}'")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Backend(String),
}

const DUPLICATE_KEY: i32 = 11000;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => {
                StoreError::Duplicate(e.message.clone())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// A single-document append: `value` goes onto the array at the dotted
/// `path`, and the `set`/`inc` fields are applied in the same write.
///
/// The document must already contain whatever `path` indexes into
/// (`destinations.2.activities` needs a third destination), otherwise
/// nothing is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Push {
    pub path: String,
    pub value: Bson,
    pub set: Document,
    pub inc: Document,
}

impl Push {
    pub fn new(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            set: Document::new(),
            inc: Document::new(),
        }
    }

    pub fn set_all(mut self, fields: Document) -> Self {
        for (key, value) in fields {
            self.set.insert(key, value);
        }
        self
    }

    pub fn inc(mut self, path: impl Into<String>, by: f64) -> Self {
        self.inc.insert(path.into(), by);
        self
    }

    /// Dotted path of the container the array lives in, if it is nested.
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(parent, _)| parent)
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Persistence capabilities shared by every backend.
///
/// Ids cross this boundary as 24-digit hex strings and documents come back
/// with `_id` rendered the same way, whatever the backend stores natively.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Round-trip to the backend, used by the health check.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Inserts a document (any `_id` it carries is replaced) and returns the new id.
    async fn insert(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Sets the given top-level fields. Returns false when no document matched.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError>;

    /// Appends atomically with respect to other writers of the same document.
    /// Returns false when no document matched.
    async fn push(&self, collection: &str, id: &str, push: Push) -> Result<bool, StoreError>;

    /// Returns false when no document matched.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Documents whose `owner_field` equals `owner_id`, newest first.
    async fn list_by_owner(
        &self,
        collection: &str,
        owner_field: &str,
        owner_id: &str,
    ) -> Result<Vec<Document>, StoreError>;
}

pub fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    let mut doc = bson::to_document(value)?;
    doc.remove("_id");
    Ok(doc)
}

pub fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(bson::from_document(doc)?)
}

/// Rewrites a native ObjectId `_id` as its hex string.
pub(crate) fn stringify_id(mut doc: Document) -> Document {
    if let Ok(oid) = doc.get_object_id("_id") {
        doc.insert("_id", oid.to_hex());
    }
    doc
}
