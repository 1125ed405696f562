pub mod dto;
pub mod firestore;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::AppError;

pub use firestore::{FirestoreClient, FirestoreConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const SUBJECTS: &str = "student-schedule-subjects";
pub const ASSIGNMENTS: &str = "student-schedule-assignments";
pub const CONNECTION_TEST: &str = "test";

/// A stored document: its key plus the JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// Collections of keyed JSON documents. Every call is a single round trip.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the document or replaces it wholesale.
    async fn put(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), AppError>;
    async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError>;
    /// Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError>;
}

/// Writes, reads back and removes a throwaway document.
pub async fn check_connection(store: &dyn DocumentStore) -> Result<(), AppError> {
    let now = Utc::now();
    let test_id = format!("connection-test-{}", now.timestamp_millis());

    let mut doc = Map::new();
    doc.insert("test".to_string(), Value::Bool(true));
    doc.insert("timestamp".to_string(), Value::String(now.to_rfc3339()));
    doc.insert("message".to_string(), Value::String("Connection test".to_string()));

    let unavailable = |e: AppError| AppError::Unavailable(e.to_string());

    store.put(CONNECTION_TEST, &test_id, &doc).await.map_err(unavailable)?;
    debug!("connection test write ok");

    let found = store.list(CONNECTION_TEST).await.map_err(unavailable)?;
    debug!("connection test read ok, {} test documents", found.len());

    store.delete(CONNECTION_TEST, &test_id).await.map_err(unavailable)?;
    info!("document store connection test passed");
    Ok(())
}
