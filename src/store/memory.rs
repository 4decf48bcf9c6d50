//! In-memory document store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::store::traits::{Document, DocumentStore, Filter, Page, Query};

/// Process-local document store. The default persistence mode when no remote
/// endpoint is configured, and the substrate the scenario tests run on.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolve a filter field; `$id` addresses the document identity itself
fn field_of(document: &Document, field: &str) -> Option<Value> {
    if field == "$id" {
        Some(Value::String(document.id.clone()))
    } else {
        document.data.get(field).cloned()
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Equal(field, value) => field_of(document, field).as_ref() == Some(value),
        Filter::AnyOf(field, values) => field_of(document, field)
            .map(|v| values.contains(&v))
            .unwrap_or(false),
        Filter::Contains(field, text) => {
            let needle = text.to_lowercase();
            match field_of(document, field) {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                Some(Value::Array(items)) => items.iter().any(|item| {
                    item.as_str()
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                }),
                _ => false,
            }
        }
    }
}

fn merge_patch(data: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(fields)) = (data, patch) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, data: Value) -> Result<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            data,
        };

        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Document> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("collection '{}'", collection)))?;

        let document = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("document '{}'", id)))?;

        merge_patch(&mut document.data, patch);
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("collection '{}'", collection)))?;

        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(AppError::NotFound(format!("document '{}'", id)));
        }
        Ok(())
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Page> {
        let mut matched: Vec<Document> = self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.filters.iter().all(|f| matches(d, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if query.newest_first {
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        let total = matched.len();
        let documents: Vec<Document> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(Page { documents, total })
    }
}
