//! Document-store seam.
//!
//! The importer and the auth handlers reach persistence only through
//! [`DocumentStore`]: find-one, find, insert and a bulk upsert keyed by a
//! filter. `academia-db` provides the PostgreSQL implementation;
//! [`memory::MemoryStore`] backs tests and local runs.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::types::DocId;

pub use memory::MemoryStore;

/// A stored document: a JSON object whose `_id` holds its [`DocId`].
pub type Document = serde_json::Map<String, Value>;

/// Field holding the document identifier.
pub const ID_FIELD: &str = "_id";

/// Named collections known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Students,
    Professors,
    Admins,
    Programs,
    Departments,
    Subjects,
    Classrooms,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Professors => "professors",
            Self::Admins => "admins",
            Self::Programs => "programs",
            Self::Departments => "departments",
            Self::Subjects => "subjects",
            Self::Classrooms => "classrooms",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field condition inside a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    AnyOf(Vec<Value>),
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::Eq(expected), Some(actual)) => expected == actual,
            (Self::AnyOf(options), Some(actual)) => options.contains(actual),
            (_, None) => false,
        }
    }
}

/// Conjunction of field conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn any_of(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push((field.into(), Condition::AnyOf(values)));
        self
    }

    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.matches(document.get(field)))
    }

    /// Equality pairs, copied into a document when an upsert inserts.
    pub fn equalities(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().filter_map(|(field, condition)| match condition {
            Condition::Eq(value) => Some((field.as_str(), value)),
            Condition::AnyOf(_) => None,
        })
    }
}

/// One element of a bulk upsert.
///
/// `set` is applied to the matched (or inserted) document; `set_on_insert`
/// only when no document matched and a new one is created. With
/// `upsert: false` an unmatched filter is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOp {
    pub filter: Filter,
    pub set: Document,
    pub set_on_insert: Document,
    pub upsert: bool,
}

impl UpsertOp {
    /// Document created when `filter` matches nothing: the filter's
    /// equalities, then `set_on_insert`, then `set`.
    pub fn inserted_document(&self, id: DocId) -> Document {
        let mut created = Document::new();
        created.insert(ID_FIELD.to_string(), id.into());
        for (key, value) in self.filter.equalities() {
            created.insert(key.to_string(), value.clone());
        }
        for (key, value) in self.set_on_insert.iter().chain(self.set.iter()) {
            created.insert(key.clone(), value.clone());
        }
        created
    }
}

/// Counts reported by [`DocumentStore::bulk_upsert`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkWriteSummary {
    pub matched: usize,
    pub inserted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Malformed document: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: Collection, filter: &Filter)
        -> Result<Vec<Document>, StoreError>;

    /// Insert a document, assigning an `_id` when it has none.
    async fn insert_one(&self, collection: Collection, document: Document)
        -> Result<DocId, StoreError>;

    /// Apply `ops` in order. Each document write is atomic on its own; the
    /// batch as a whole is not.
    async fn bulk_upsert(
        &self,
        collection: Collection,
        ops: &[UpsertOp],
    ) -> Result<BulkWriteSummary, StoreError>;
}

/// Read the `_id` of a stored document.
pub fn document_id(document: &Document) -> Option<DocId> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(DocId::parse)
}
