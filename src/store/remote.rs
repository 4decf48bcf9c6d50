//! Remote document store client (Appwrite-style REST)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::PersistenceConfig;
use crate::error::{AppError, Result};
use crate::store::traits::{Document, DocumentStore, Filter, Page, Query};

/// HTTP client for a hosted document-store collaborator. Collection CRUD plus
/// filtered listing map onto its REST surface; every failure is normalized to
/// a `Persistence` error with the provider detail kept in the logs.
pub struct RemoteStore {
    client: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
}

impl RemoteStore {
    pub fn new(config: &PersistenceConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| AppError::Persistence("remote endpoint not configured".to_string()))?;

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    /// Render a filter in the collaborator's query-string syntax
    fn filter_param(filter: &Filter) -> String {
        match filter {
            Filter::Equal(field, value) => {
                format!("equal(\"{}\", [{}])", field, value)
            }
            Filter::AnyOf(field, values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("equal(\"{}\", [{}])", field, rendered.join(","))
            }
            Filter::Contains(field, text) => {
                format!("search(\"{}\", [{}])", field, Value::from(text.as_str()))
            }
        }
    }

    fn query_params(query: &Query) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = query
            .filters
            .iter()
            .map(|f| ("queries[]".to_string(), Self::filter_param(f)))
            .collect();

        if query.newest_first {
            params.push(("queries[]".to_string(), "orderDesc(\"$createdAt\")".to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("queries[]".to_string(), format!("limit({})", limit)));
        }
        if query.offset > 0 {
            params.push(("queries[]".to_string(), format!("offset({})", query.offset)));
        }
        params
    }

    async fn send(&self, builder: reqwest::RequestBuilder, context: &str) -> Result<Value> {
        let response = self.request(builder).send().await.map_err(|e| {
            error!(error = %e, context, "Document store request failed");
            AppError::Persistence(format!("{} failed", context))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, context, "Document store returned an error");
            return Err(AppError::Persistence(format!(
                "{} failed with status {}",
                context, status
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            error!(error = %e, context, "Failed to parse document store response");
            AppError::Persistence(format!("{} returned a malformed body", context))
        })
    }

    /// Split a raw response document into identity metadata and payload
    fn parse_document(raw: &Value) -> Result<Document> {
        let object = raw
            .as_object()
            .ok_or_else(|| AppError::Persistence("document is not an object".to_string()))?;

        let id = object
            .get("$id")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Persistence("document is missing '$id'".to_string()))?
            .to_string();

        let created_at = Self::parse_timestamp(object, "$createdAt")?;
        let updated_at = Self::parse_timestamp(object, "$updatedAt")?;

        let data: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| !key.starts_with('$'))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Document {
            id,
            created_at,
            updated_at,
            data: Value::Object(data),
        })
    }

    fn parse_timestamp(object: &Map<String, Value>, key: &str) -> Result<DateTime<Utc>> {
        object
            .get(key)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::Persistence(format!("document is missing '{}'", key)))
    }
}

#[async_trait]
impl DocumentStore for RemoteStore {
    async fn create(&self, collection: &str, data: Value) -> Result<Document> {
        let body = json!({
            "documentId": Uuid::new_v4().to_string(),
            "data": data,
        });

        debug!(collection, "Creating document");
        let raw = self
            .send(
                self.client.post(self.documents_url(collection)).json(&body),
                "create document",
            )
            .await?;
        Self::parse_document(&raw)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let response = self
            .request(self.client.get(self.document_url(collection, id)))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Document store request failed");
                AppError::Persistence("get document failed".to_string())
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            error!(status = %status, "Document store returned an error");
            return Err(AppError::Persistence(format!(
                "get document failed with status {}",
                status
            )));
        }

        let raw = response.json::<Value>().await.map_err(|e| {
            error!(error = %e, "Failed to parse document store response");
            AppError::Persistence("get document returned a malformed body".to_string())
        })?;
        Self::parse_document(&raw).map(Some)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Document> {
        let body = json!({ "data": patch });
        let raw = self
            .send(
                self.client
                    .patch(self.document_url(collection, id))
                    .json(&body),
                "update document",
            )
            .await?;
        Self::parse_document(&raw)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let response = self
            .request(self.client.delete(self.document_url(collection, id)))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Document store request failed");
                AppError::Persistence("delete document failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(status = %status, "Document store returned an error");
            return Err(AppError::Persistence(format!(
                "delete document failed with status {}",
                status
            )));
        }
        Ok(())
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Page> {
        let raw = self
            .send(
                self.client
                    .get(self.documents_url(collection))
                    .query(&Self::query_params(query)),
                "list documents",
            )
            .await?;

        let total = raw
            .get("total")
            .and_then(Value::as_u64)
            .unwrap_or_default() as usize;

        let documents = raw
            .get("documents")
            .and_then(Value::as_array)
            .map(|docs| docs.iter().map(Self::parse_document).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        Ok(Page { documents, total })
    }
}
