use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use super::{Document, DocumentStore};
use crate::db::repository;
use crate::error::AppError;

/// Documents kept in a local SQLite table, one row per (collection, id).
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn put(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), AppError> {
        repository::upsert_document(&self.db, collection, id, fields).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        repository::fetch_documents(&self.db, collection).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        repository::delete_document(&self.db, collection, id).await?;
        Ok(())
    }
}
