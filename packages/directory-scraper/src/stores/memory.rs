//! In-memory record store for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// Documents keyed by `(collection, slug)`, merged on upsert.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<(String, String), Map<String, Value>>>,
    upserts: RwLock<usize>,
    unavailable: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following upsert fail, as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().unwrap() = unavailable;
    }

    pub fn get(&self, collection: &str, slug: &str) -> Option<Map<String, Value>> {
        self.documents
            .read()
            .unwrap()
            .get(&(collection.to_string(), slug.to_string()))
            .cloned()
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.documents
            .read()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    /// Total upsert calls, including repeats.
    pub fn upsert_count(&self) -> usize {
        *self.upserts.read().unwrap()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, collection: &str, slug: &str, data: &Map<String, Value>) -> StoreResult<()> {
        if *self.unavailable.read().unwrap() {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        if slug.is_empty() {
            return Err(StoreError::MissingSlug {
                collection: collection.to_string(),
            });
        }

        *self.upserts.write().unwrap() += 1;
        let mut documents = self.documents.write().unwrap();
        let document = documents
            .entry((collection.to_string(), slug.to_string()))
            .or_default();
        for (key, value) in data {
            document.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_merges_fields() {
        let store = MemoryStore::new();
        store
            .upsert("consultancies", "acme", &map(json!({"slug": "acme", "name": "Acme", "logo": "/a.png"})))
            .await
            .unwrap();
        store
            .upsert("consultancies", "acme", &map(json!({"slug": "acme", "name": "Acme SA"})))
            .await
            .unwrap();

        let doc = store.get("consultancies", "acme").unwrap();
        assert_eq!(doc["name"], "Acme SA");
        assert_eq!(doc["logo"], "/a.png");
        assert_eq!(store.count("consultancies"), 1);
        assert_eq!(store.upsert_count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = store
            .upsert("articles", "a", &map(json!({"slug": "a"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
