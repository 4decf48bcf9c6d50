//! Document and file store contracts

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};

/// One persisted document: store-assigned identity plus a JSON payload.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Value,
}

impl Document {
    /// Parse-and-validate the payload into a typed record. Malformed
    /// documents surface as persistence errors instead of bad casts.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            AppError::Persistence(format!("Malformed document '{}': {}", self.id, e))
        })
    }
}

/// Field-level filter applied when listing documents
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value
    Equal(String, Value),
    /// Field equals any of the values
    AnyOf(String, Vec<Value>),
    /// Field (string or string array) contains the text, case-insensitive
    Contains(String, String),
}

/// List query: filters, ordering and pagination
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub newest_first: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equal(field.into(), value.into()));
        self
    }

    pub fn any_of(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.filters.push(Filter::AnyOf(field.into(), values));
        self
    }

    pub fn contains(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.filters.push(Filter::Contains(field.into(), text.into()));
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of list results. `total` counts every match, not just this page.
#[derive(Debug, Clone)]
pub struct Page {
    pub documents: Vec<Document>,
    pub total: usize,
}

/// Document store collaborator: create/read/update/delete/list keyed by
/// collection name. Updates are shallow merges of top-level fields.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, data: Value) -> Result<Document>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Document>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    async fn list(&self, collection: &str, query: &Query) -> Result<Page>;
}

/// A stored file and its durable reference URL
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub url: String,
}

/// File store collaborator
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist raw bytes, returning a durable reference
    async fn save(&self, bytes: &[u8]) -> Result<StoredFile>;

    /// Read a stored file back by its id
    async fn read(&self, id: &str) -> Result<Vec<u8>>;
}
