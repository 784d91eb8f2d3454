//! In-process [`DocumentStore`] backed by a `RwLock`ed map of collections.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    BulkWriteSummary, Collection, Document, DocumentStore, Filter, StoreError, UpsertOp, ID_FIELD,
};
use crate::types::DocId;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<DocId, StoreError> {
        let id = match document.get(ID_FIELD) {
            Some(Value::String(raw)) => DocId::parse(raw)
                .ok_or_else(|| StoreError::Serialization(format!("invalid _id '{raw}'")))?,
            Some(other) => {
                return Err(StoreError::Serialization(format!("invalid _id {other}")));
            }
            None => DocId::new(),
        };
        document.insert(ID_FIELD.to_string(), id.clone().into());

        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn bulk_upsert(
        &self,
        collection: Collection,
        ops: &[UpsertOp],
    ) -> Result<BulkWriteSummary, StoreError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        let mut summary = BulkWriteSummary::default();

        for op in ops {
            if let Some(existing) = docs.iter_mut().find(|d| op.filter.matches(d)) {
                for (key, value) in &op.set {
                    existing.insert(key.clone(), value.clone());
                }
                summary.matched += 1;
                continue;
            }
            if !op.upsert {
                continue;
            }

            docs.push(op.inserted_document(DocId::new()));
            summary.inserted += 1;
        }

        Ok(summary)
    }
}
