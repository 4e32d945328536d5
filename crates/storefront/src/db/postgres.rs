//! `PostgreSQL` document store.
//!
//! Documents are JSONB rows in `longbox.document`. [`Predicate`] trees are
//! compiled to SQL with [`QueryBuilder`]; field names and values are always
//! bound parameters. Price filtering and sorting go through the
//! `longbox.canonical_price` SQL function created by the migrations.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use longbox_core::catalog::{FieldSet, FindOptions, Predicate, SortOrder};
use longbox_core::{Collection, Document};

use super::{DocumentStore, StoreError, UpdateResult};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn into_document(body: Json<Value>) -> Result<Document, StoreError> {
    match body.0 {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::DataCorruption(format!(
            "expected a JSON object, found {}",
            json_type(&other)
        ))),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append the SQL form of `predicate`.
fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::And(clauses) => push_junction(qb, clauses, " AND ", "TRUE"),
        Predicate::Or(clauses) => push_junction(qb, clauses, " OR ", "FALSE"),
        Predicate::IdEquals(id) => {
            qb.push("body -> '_id' = ");
            qb.push_bind(Json(id.to_value()));
        }
        Predicate::FieldEquals { field, value } => {
            qb.push("body -> ");
            qb.push_bind(field.clone());
            qb.push(" = ");
            qb.push_bind(Json(value.clone()));
        }
        Predicate::Contains { field, needle } => {
            qb.push("longbox.jsonb_contains_text(body -> ");
            qb.push_bind(field.clone());
            qb.push(", ");
            qb.push_bind(needle.clone());
            qb.push(")");
        }
        Predicate::EqualsIgnoreCase { field, value } => {
            qb.push("lower(body ->> ");
            qb.push_bind(field.clone());
            qb.push(") = lower(");
            qb.push_bind(value.clone());
            qb.push(")");
        }
        Predicate::PriceWithin { lower, upper } => push_price_range(qb, *lower, *upper),
        Predicate::DateRecord {
            field,
            kind,
            from,
            to,
        } => {
            qb.push("longbox.has_dated_record(body -> ");
            qb.push_bind(field.clone());
            qb.push(", ");
            qb.push_bind(kind.clone());
            qb.push(", ");
            qb.push_bind(*from);
            qb.push(", ");
            qb.push_bind(*to);
            qb.push(")");
        }
    }
}

fn push_junction(
    qb: &mut QueryBuilder<'_, Postgres>,
    clauses: &[Predicate],
    joiner: &str,
    empty: &str,
) {
    if clauses.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        push_predicate(qb, clause);
    }
    qb.push(")");
}

fn push_price_range(
    qb: &mut QueryBuilder<'_, Postgres>,
    lower: std::ops::Bound<f64>,
    upper: std::ops::Bound<f64>,
) {
    use std::ops::Bound;

    qb.push("(longbox.canonical_price(body) IS NOT NULL");
    match lower {
        Bound::Included(v) => {
            qb.push(" AND longbox.canonical_price(body) >= ");
            qb.push_bind(v);
        }
        Bound::Excluded(v) => {
            qb.push(" AND longbox.canonical_price(body) > ");
            qb.push_bind(v);
        }
        Bound::Unbounded => {}
    }
    match upper {
        Bound::Included(v) => {
            qb.push(" AND longbox.canonical_price(body) <= ");
            qb.push_bind(v);
        }
        Bound::Excluded(v) => {
            qb.push(" AND longbox.canonical_price(body) < ");
            qb.push_bind(v);
        }
        Bound::Unbounded => {}
    }
    qb.push(")");
}

/// Append `WHERE` restricting to `collection` and `filter`.
fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, collection: Collection, filter: &Predicate) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.as_str());
    if !filter.is_all() {
        qb.push(" AND ");
        push_predicate(qb, filter);
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: Option<SortOrder>) {
    match sort {
        Some(SortOrder::Asc) => {
            qb.push(" ORDER BY longbox.canonical_price(body) ASC NULLS LAST, seq ASC");
        }
        Some(SortOrder::Desc) => {
            qb.push(" ORDER BY longbox.canonical_price(body) DESC NULLS LAST, seq ASC");
        }
        None => {
            qb.push(" ORDER BY seq ASC");
        }
    }
}

fn count_query(collection: Collection, filter: &Predicate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM longbox.document");
    push_scope(&mut qb, collection, filter);
    qb
}

fn find_query(
    collection: Collection,
    filter: &Predicate,
    options: FindOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT body FROM longbox.document");
    push_scope(&mut qb, collection, filter);
    push_order(&mut qb, options.sort);
    if options.skip > 0 {
        qb.push(" OFFSET ");
        qb.push_bind(to_i64(options.skip));
    }
    if let Some(limit) = options.limit {
        qb.push(" LIMIT ");
        qb.push_bind(to_i64(limit));
    }
    qb
}

/// Select the `seq` of the first matching row, locking it.
fn first_seq_query(collection: Collection, filter: &Predicate) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT seq FROM longbox.document");
    push_scope(&mut qb, collection, filter);
    qb.push(" ORDER BY seq ASC LIMIT 1 FOR UPDATE");
    qb
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, filter), fields(collection = %collection))]
    async fn count(&self, collection: Collection, filter: &Predicate) -> Result<u64, StoreError> {
        let mut qb = count_query(collection, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self, filter), fields(collection = %collection))]
    async fn find(
        &self,
        collection: Collection,
        filter: &Predicate,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = find_query(collection, filter, options);
        debug!(sql = qb.sql(), "find");

        let rows: Vec<Json<Value>> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        rows.into_iter().map(into_document).collect()
    }

    #[instrument(skip(self, filter), fields(collection = %collection))]
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Predicate,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        let mut qb = find_query(collection, filter, options);

        let row: Option<Json<Value>> = qb.build_query_scalar().fetch_optional(&self.pool).await?;
        row.map(into_document).transpose()
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn sample(&self, collection: Collection, size: u64) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<Json<Value>> = sqlx::query_scalar(
            "SELECT body FROM longbox.document WHERE collection = $1 ORDER BY random() LIMIT $2",
        )
        .bind(collection.as_str())
        .bind(to_i64(size))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_document).collect()
    }

    #[instrument(skip(self, document), fields(collection = %collection))]
    async fn insert(&self, collection: Collection, document: Document) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO longbox.document (collection, body) VALUES ($1, $2)")
            .bind(collection.as_str())
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, filter, set), fields(collection = %collection))]
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Predicate,
        set: &FieldSet,
    ) -> Result<UpdateResult, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut qb = first_seq_query(collection, filter);
        let seq: Option<i64> = qb.build_query_scalar().fetch_optional(&mut *tx).await?;
        let Some(seq) = seq else {
            tx.rollback().await?;
            return Ok(UpdateResult::default());
        };

        // `||` replaces top-level keys wholesale, so arrays are overwritten
        // rather than merged.
        let patch = Json(Value::Object(set.clone()));
        let result = sqlx::query(
            r"
            UPDATE longbox.document
            SET body = body || $2
            WHERE seq = $1 AND body IS DISTINCT FROM (body || $2)
            ",
        )
        .bind(seq)
        .bind(patch)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UpdateResult {
            matched: 1,
            modified: result.rows_affected(),
        })
    }

    #[instrument(skip(self, filter), fields(collection = %collection))]
    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Predicate,
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut qb = first_seq_query(collection, filter);
        let seq: Option<i64> = qb.build_query_scalar().fetch_optional(&mut *tx).await?;
        let Some(seq) = seq else {
            tx.rollback().await?;
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM longbox.document WHERE seq = $1")
            .bind(seq)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, key, default), fields(collection = %collection))]
    async fn get_or_insert(
        &self,
        collection: Collection,
        key_field: &str,
        key: &str,
        default: Document,
    ) -> Result<Document, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent creators of the same key until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{collection}:{key_field}:{key}"))
            .execute(&mut *tx)
            .await?;

        let filter = Predicate::field_eq(key_field, key);
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        let mut qb = find_query(collection, &filter, options);
        let existing: Option<Json<Value>> = qb.build_query_scalar().fetch_optional(&mut *tx).await?;

        if let Some(body) = existing {
            tx.commit().await?;
            return into_document(body);
        }

        sqlx::query("INSERT INTO longbox.document (collection, body) VALUES ($1, $2)")
            .bind(collection.as_str())
            .bind(Json(Value::Object(default.clone())))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("created document");
        Ok(default)
    }
}
