use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::store::{parse_id, DocumentStore, Push, StoreError};
use super::UNIQUE_FIELDS;

/// Process-local backend for development and tests.
///
/// Collections keep insertion order, which doubles as creation order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn has_id(doc: &Document, id: &str) -> bool {
    matches!(doc.get_str("_id"), Ok(existing) if existing == id)
}

fn field_matches(doc: &Document, field: &str, value: &str) -> bool {
    match doc.get(field) {
        Some(Bson::String(s)) => s == value,
        Some(Bson::ObjectId(oid)) => oid.to_hex() == value,
        _ => false,
    }
}

fn duplicate_field(collection: &str, docs: &[Document], doc: &Document) -> Option<String> {
    UNIQUE_FIELDS
        .iter()
        .filter(|(name, _)| *name == collection)
        .map(|(_, field)| *field)
        .find(|field| {
            doc.get(*field)
                .is_some_and(|value| docs.iter().any(|other| other.get(*field) == Some(value)))
        })
        .map(str::to_string)
}

fn child_mut<'a>(node: &'a mut Bson, segment: &str) -> Option<&'a mut Bson> {
    match node {
        Bson::Document(doc) => doc.get_mut(segment),
        Bson::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

/// Resolves the document holding the last segment of a dotted path, along
/// with that segment. Array elements are addressed by index.
fn container_mut<'d, 'p>(doc: &'d mut Document, path: &'p str) -> Option<(&'d mut Document, &'p str)> {
    let Some((parent, key)) = path.rsplit_once('.') else {
        return Some((doc, path));
    };
    let mut segments = parent.split('.');
    let mut node = doc.get_mut(segments.next()?)?;
    for segment in segments {
        node = child_mut(node, segment)?;
    }
    match node {
        Bson::Document(inner) => Some((inner, key)),
        _ => None,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(n) => Some(*n),
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        _ => None,
    }
}

fn apply_push(doc: &mut Document, push: Push) -> Result<bool, StoreError> {
    let Some((container, key)) = container_mut(doc, &push.path) else {
        return Ok(false);
    };
    if !container.contains_key(key) {
        container.insert(key, Bson::Array(Vec::new()));
    }
    match container.get_mut(key) {
        Some(Bson::Array(items)) => items.push(push.value),
        _ => return Err(StoreError::Backend(format!("'{}' is not an array", push.path))),
    }

    for (path, by) in push.inc {
        let by = as_number(&by).unwrap_or(0.0);
        if let Some((container, key)) = container_mut(doc, &path) {
            let current = container.get(key).and_then(as_number).unwrap_or(0.0);
            container.insert(key, current + by);
        }
    }
    for (key, value) in push.set {
        doc.insert(key, value);
    }
    Ok(true)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = ObjectId::new().to_hex();
        doc.insert("_id", id.clone());
        let mut collections = self.write()?;
        let docs = collections.entry(collection.to_string()).or_default();
        if let Some(field) = duplicate_field(collection, docs, &doc) {
            return Err(StoreError::Duplicate(field));
        }
        docs.push(doc);
        Ok(id)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        parse_id(id)?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| has_id(doc, id)))
            .cloned())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| field_matches(doc, field, value)))
            .cloned())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        mut fields: Document,
    ) -> Result<bool, StoreError> {
        parse_id(id)?;
        fields.remove("_id");
        let mut collections = self.write()?;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)))
        else {
            return Ok(false);
        };
        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(true)
    }

    async fn push(&self, collection: &str, id: &str, push: Push) -> Result<bool, StoreError> {
        parse_id(id)?;
        let mut collections = self.write()?;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)))
        else {
            return Ok(false);
        };
        apply_push(doc, push)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        parse_id(id)?;
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| !has_id(doc, id));
        Ok(docs.len() < before)
    }

    async fn list_by_owner(
        &self,
        collection: &str,
        owner_field: &str,
        owner_id: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .rev()
                    .filter(|doc| field_matches(doc, owner_field, owner_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
