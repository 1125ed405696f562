use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;
use crate::store::Document;

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    body: String,
}

pub async fn fetch_documents(db: &SqlitePool, collection: &str) -> Result<Vec<Document>, AppError> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT id, body FROM documents WHERE collection = ? ORDER BY id"
    )
    .bind(collection)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<Document, AppError> {
            let fields: Map<String, Value> = serde_json::from_str(&row.body)?;
            Ok(Document { id: row.id, fields })
        })
        .collect()
}

pub async fn upsert_document(
    db: &SqlitePool,
    collection: &str,
    id: &str,
    fields: &Map<String, Value>,
) -> Result<(), AppError> {
    let body = serde_json::to_string(fields)?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO documents (collection, id, body, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (collection, id) DO UPDATE SET
            body = excluded.body,
            updated_at = excluded.updated_at
        "#
    )
    .bind(collection)
    .bind(id)
    .bind(body)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_document(db: &SqlitePool, collection: &str, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
        .bind(collection)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
