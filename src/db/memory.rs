//! In-process document store.
//!
//! Keeps insertion order per collection and counts writes, which makes it
//! the test double for every handler and for the seeder.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{generate_id, Collection, DatabaseError, Document, DocumentStore, Fields};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a collection without counting writes.
    pub fn with_documents(self, collection: Collection, docs: Vec<Document>) -> Self {
        if let Ok(mut guard) = self.collections.write() {
            guard.entry(collection).or_default().extend(docs);
        }
        self
    }

    /// Number of successful writes since construction.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Document>, DatabaseError> {
        let guard = self
            .collections
            .read()
            .map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    async fn is_empty(&self, collection: Collection) -> Result<bool, DatabaseError> {
        let guard = self
            .collections
            .read()
            .map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(guard.get(&collection).map_or(true, Vec::is_empty))
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, DatabaseError> {
        let id = generate_id();
        let mut guard = self
            .collections
            .write()
            .map_err(|_| DatabaseError::LockPoisoned)?;
        guard
            .entry(collection)
            .or_default()
            .push(Document::new(id.clone(), fields));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, DatabaseError> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| DatabaseError::LockPoisoned)?;
        let docs = guard.entry(collection).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Ok(false);
        }
        docs.push(Document::new(id, fields));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_then_read_preserves_order() {
        let store = MemoryStore::new();
        let first = store
            .insert(Collection::Patients, fields(json!({"name": "Asha"})))
            .await
            .unwrap();
        let second = store
            .insert(Collection::Patients, fields(json!({"name": "Ravi"})))
            .await
            .unwrap();

        let docs = store.read_all(Collection::Patients).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, first);
        assert_eq!(docs[1].id, second);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Doctors, fields(json!({"name": "Dr. Rao"})))
            .await
            .unwrap();
        assert!(store.read_all(Collection::Patients).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_existing() {
        let store = MemoryStore::new();
        let written = store
            .insert_if_absent(Collection::Inventory, "Gloves", fields(json!({"quantity": 1500})))
            .await
            .unwrap();
        let again = store
            .insert_if_absent(Collection::Inventory, "Gloves", fields(json!({"quantity": 1})))
            .await
            .unwrap();

        assert!(written);
        assert!(!again);
        let docs = store.read_all(Collection::Inventory).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["quantity"], 1500);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn is_empty_tracks_each_collection() {
        let store = MemoryStore::new();
        assert!(store.is_empty(Collection::Inventory).await.unwrap());
        store
            .insert(Collection::Inventory, fields(json!({"quantity": 1})))
            .await
            .unwrap();
        assert!(!store.is_empty(Collection::Inventory).await.unwrap());
        assert!(store.is_empty(Collection::Doctors).await.unwrap());
    }

    #[tokio::test]
    async fn preloaded_documents_are_not_counted() {
        let store = MemoryStore::new().with_documents(
            Collection::Inventory,
            vec![Document::new("Masks", fields(json!({"quantity": 2000})))],
        );
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.read_all(Collection::Inventory).await.unwrap().len(), 1);
    }
}
