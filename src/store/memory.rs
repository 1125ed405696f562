use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Document, DocumentStore};
use crate::error::AppError;

type Collections = BTreeMap<String, BTreeMap<String, Map<String, Value>>>;

/// Process-local store. Documents list in key order.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put`/`delete` fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Collections>, AppError> {
        self.collections
            .lock()
            .map_err(|_| AppError::InternalServerError)
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), AppError> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Remote {
                status: 503,
                body: format!("{} rejected by memory store", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), AppError> {
        self.check(&self.fail_writes, "put")?;
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields.clone());
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        self.check(&self.fail_reads, "list")?;
        Ok(self
            .lock()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.check(&self.fail_writes, "delete")?;
        if let Some(docs) = self.lock()?.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_replaces_whole_document() {
        let store = MemoryStore::new();
        let mut first = Map::new();
        first.insert("a".to_string(), Value::from(1));
        first.insert("b".to_string(), Value::from(2));
        store.put("c", "x", &first).await.unwrap();

        let mut second = Map::new();
        second.insert("a".to_string(), Value::from(3));
        store.put("c", "x", &second).await.unwrap();

        let docs = store.list("c").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields, second);
    }

    #[tokio::test]
    async fn delete_missing_document_is_ok() {
        let store = MemoryStore::new();
        store.delete("c", "nope").await.unwrap();
        assert!(store.list("c").await.unwrap().is_empty());
    }
}
