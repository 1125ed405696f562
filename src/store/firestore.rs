use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::dto::{self, FirestoreDocument, ListDocumentsResponse};
use super::{Document, DocumentStore};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

#[derive(Clone, Debug)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: String,
    pub database: String,
    pub base_url: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            database: "(default)".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }
}

/// Firestore REST v1 client keyed by API key.
pub struct FirestoreClient {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.config.documents_url(), collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.config.documents_url(), collection, id)
    }

    fn with_params(&self, url: &str, extra: &[(&str, &str)]) -> Result<Url, AppError> {
        let mut params = vec![("key", self.config.api_key.as_str())];
        params.extend_from_slice(extra);
        Url::parse_with_params(url, &params)
            .map_err(|e| AppError::Config(format!("invalid Firestore url {}: {}", url, e)))
    }

    async fn check_status(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn put(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), AppError> {
        let body = FirestoreDocument {
            name: None,
            fields: dto::encode_fields(fields),
            update_time: None,
        };

        // PATCH without an update mask replaces the whole document, creating it if absent.
        let response = self
            .client
            .patch(self.with_params(&self.document_url(collection, id), &[])?)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        debug!("firestore put {}/{}", collection, id);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = PAGE_SIZE.to_string();
            let mut params = vec![("pageSize", page_size.as_str())];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.as_str()));
            }
            let url = self.with_params(&self.collection_url(collection), &params)?;

            let response = self.client.get(url).send().await?;
            let page: ListDocumentsResponse = Self::check_status(response).await?.json().await?;

            for doc in page.documents {
                match doc.id().map(str::to_string) {
                    Some(id) => documents.push(Document {
                        id,
                        fields: dto::decode_fields(doc.fields),
                    }),
                    None => warn!("skipping unnamed document in {}", collection),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("firestore list {} -> {} documents", collection, documents.len());
        Ok(documents)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.with_params(&self.document_url(collection, id), &[])?)
            .send()
            .await?;
        Self::check_status(response).await?;
        debug!("firestore delete {}/{}", collection, id);
        Ok(())
    }
}
