//! [`DocumentStore`] over the `documents` table.
//!
//! Every entity is one JSONB `body` row tagged with its collection. Filters
//! compile to `body -> field` comparisons against JSONB parameters; the
//! natural-key unique indexes live in the migration.

use academia_core::store::{
    BulkWriteSummary, Collection, Condition, Document, DocumentStore, Filter, StoreError,
    UpsertOp, ID_FIELD,
};
use academia_core::types::DocId;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Merge `op.set` into the oldest document matching `op.filter`.
    async fn update_one(&self, collection: Collection, op: &UpsertOp) -> Result<bool, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE documents SET updated_at = now(), body = body || ",
        );
        qb.push_bind(Json(op.set.clone()));
        qb.push(" WHERE id = (SELECT id FROM documents");
        push_filter(&mut qb, collection, &op.filter);
        qb.push(" ORDER BY created_at, id LIMIT 1)");

        let result = qb.build().execute(&self.pool).await.map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a document; with `skip_conflicts` a natural-key collision
    /// inserts nothing and returns `false`.
    async fn insert(
        &self,
        collection: Collection,
        id: &DocId,
        body: Document,
        skip_conflicts: bool,
    ) -> Result<bool, StoreError> {
        let sql = if skip_conflicts {
            "INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING"
        } else {
            "INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)"
        };
        let result = sqlx::query(sql)
            .bind(id.as_str())
            .bind(collection.as_str())
            .bind(Json(body))
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(backend)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut qb, collection, filter);
        qb.push(" ORDER BY created_at, id LIMIT 1");

        let row: Option<Json<Document>> = qb
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(|Json(body)| body))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut qb, collection, filter);
        qb.push(" ORDER BY created_at, id");

        let rows: Vec<Json<Document>> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(|Json(body)| body).collect())
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

        self.insert(collection, &id, document, false).await?;
        Ok(id)
    }

    async fn bulk_upsert(
        &self,
        collection: Collection,
        ops: &[UpsertOp],
    ) -> Result<BulkWriteSummary, StoreError> {
        let mut summary = BulkWriteSummary::default();

        for op in ops {
            if self.update_one(collection, op).await? {
                summary.matched += 1;
                continue;
            }
            if !op.upsert {
                continue;
            }

            let id = DocId::new();
            if self.insert(collection, &id, op.inserted_document(id.clone()), true).await? {
                summary.inserted += 1;
            } else if self.update_one(collection, op).await? {
                // A concurrent writer created the document between our update
                // and insert.
                summary.matched += 1;
            }
        }

        tracing::debug!(
            collection = %collection,
            ops = ops.len(),
            matched = summary.matched,
            inserted = summary.inserted,
            "Bulk upsert applied"
        );
        Ok(summary)
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, collection: Collection, filter: &Filter) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.as_str());

    for (field, condition) in filter.conditions() {
        if matches!(condition, Condition::AnyOf(values) if values.is_empty()) {
            qb.push(" AND FALSE");
            continue;
        }

        qb.push(" AND body -> ");
        qb.push_bind(field.clone());
        qb.push("::text");
        match condition {
            Condition::Eq(value) => {
                qb.push(" = ");
                qb.push_bind(Json(value.clone()));
            }
            Condition::AnyOf(values) => {
                qb.push(" IN (");
                let mut list = qb.separated(", ");
                for value in values {
                    list.push_bind(Json(value.clone()));
                }
                list.push_unseparated(")");
            }
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
