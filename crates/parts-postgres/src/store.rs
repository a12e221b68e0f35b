//! PostgreSQL document store with connection pooling

use async_trait::async_trait;
use parts_core::document::{assign_id, merge_fields};
use parts_core::{
    Collection, DeleteResult, Document, DocumentStore, Filter, InsertOneResult, PartsError,
    PartsResult, UpdateResult, WriteOp, WriteOutcome,
};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnection, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use tracing::{debug, info};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// PostgreSQL store configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Seconds to wait for a free connection
    pub acquire_timeout_secs: u64,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

/// PostgreSQL implementation of [`DocumentStore`].
///
/// Each collection is a table of `(seq, id, data JSONB)` rows; `seq` gives
/// insertion order. Updates read the row `FOR UPDATE`, merge in Rust and write
/// the document back inside one transaction.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool using the given configuration
    pub async fn connect(config: &PostgresConfig) -> PartsResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| PartsError::Storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Creates one table per collection if missing
    pub async fn ensure_schema(&self) -> PartsResult<()> {
        for collection in Collection::ALL {
            sqlx::query(&create_table_sql(collection))
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    PartsError::Storage(format!("Failed to create table {}: {}", collection, e))
                })?;
        }
        info!("Document tables ready");
        Ok(())
    }
}

fn create_table_sql(collection: Collection) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            seq BIGSERIAL PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        collection.name()
    )
}

fn where_clause(filter: &Filter) -> &'static str {
    match filter {
        Filter::All => "TRUE",
        Filter::Id(_) => "id = $1",
        Filter::Eq { .. } => "data -> $1::text = $2::jsonb",
    }
}

fn bind_filter<'q>(query: PgQuery<'q>, filter: &Filter) -> PgQuery<'q> {
    match filter {
        Filter::All => query,
        Filter::Id(id) => query.bind(id.clone()),
        Filter::Eq { field, value } => query.bind(field.clone()).bind(value.clone()),
    }
}

/// Advisory-lock key serializing upserts on the same filter
fn upsert_lock_key(collection: Collection, filter: &Filter) -> String {
    match filter {
        Filter::All => collection.name().to_string(),
        Filter::Id(id) => format!("{}:_id:{}", collection.name(), id),
        Filter::Eq { field, value } => format!("{}:{}:{}", collection.name(), field, value),
    }
}

fn into_document(value: Value) -> PartsResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PartsError::Serialization(format!(
            "Stored document is not an object: {}",
            other
        ))),
    }
}

fn storage_error(action: &str, collection: Collection, e: sqlx::Error) -> PartsError {
    PartsError::Storage(format!("Failed to {} in {}: {}", action, collection, e))
}

async fn insert_with(
    conn: &mut PgConnection,
    collection: Collection,
    mut document: Document,
) -> PartsResult<InsertOneResult> {
    let id = assign_id(&mut document);
    let sql = format!("INSERT INTO {} (id, data) VALUES ($1, $2)", collection.name());

    sqlx::query(&sql)
        .bind(id.clone())
        .bind(Value::Object(document))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                PartsError::Conflict(format!("Document '{}' already exists in {}", id, collection))
            } else {
                storage_error("insert document", collection, e)
            }
        })?;

    Ok(InsertOneResult::new(id))
}

async fn update_with(
    conn: &mut PgConnection,
    collection: Collection,
    filter: &Filter,
    set: &Document,
    upsert: bool,
) -> PartsResult<UpdateResult> {
    if upsert {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(upsert_lock_key(collection, filter))
            .execute(&mut *conn)
            .await
            .map_err(|e| storage_error("lock upsert key", collection, e))?;
    }

    let select = format!(
        "SELECT seq, data FROM {} WHERE {} ORDER BY seq LIMIT 1 FOR UPDATE",
        collection.name(),
        where_clause(filter)
    );
    let row = bind_filter(sqlx::query(&select), filter)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage_error("read document", collection, e))?;

    if let Some(row) = row {
        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| storage_error("decode seq", collection, e))?;
        let data: Value = row
            .try_get("data")
            .map_err(|e| storage_error("decode document", collection, e))?;
        let mut document = into_document(data)?;

        let modified = merge_fields(&mut document, set);
        if modified {
            let update = format!("UPDATE {} SET data = $2 WHERE seq = $1", collection.name());
            sqlx::query(&update)
                .bind(seq)
                .bind(Value::Object(document))
                .execute(&mut *conn)
                .await
                .map_err(|e| storage_error("update document", collection, e))?;
        }
        return Ok(UpdateResult::matched(modified));
    }

    if !upsert {
        return Ok(UpdateResult::unmatched());
    }

    let mut document = filter.upsert_seed();
    merge_fields(&mut document, set);
    let inserted = insert_with(conn, collection, document).await?;
    Ok(UpdateResult::upserted(inserted.inserted_id))
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> PartsResult<InsertOneResult> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("acquire connection", collection, e))?;
        insert_with(&mut conn, collection, document).await
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> PartsResult<Vec<Document>> {
        let sql = format!(
            "SELECT data FROM {} WHERE {} ORDER BY seq",
            collection.name(),
            where_clause(filter)
        );
        let rows = bind_filter(sqlx::query(&sql), filter)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("list documents", collection, e))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let data: Value = row
                .try_get("data")
                .map_err(|e| storage_error("decode document", collection, e))?;
            documents.push(into_document(data)?);
        }
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> PartsResult<Option<Document>> {
        let sql = format!(
            "SELECT data FROM {} WHERE {} ORDER BY seq LIMIT 1",
            collection.name(),
            where_clause(filter)
        );
        let row = bind_filter(sqlx::query(&sql), filter)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("read document", collection, e))?;

        match row {
            Some(row) => {
                let data: Value = row
                    .try_get("data")
                    .map_err(|e| storage_error("decode document", collection, e))?;
                Ok(Some(into_document(data)?))
            }
            None => Ok(None),
        }
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> PartsResult<UpdateResult> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", collection, e))?;
        let result = update_with(&mut tx, collection, filter, &set, upsert).await?;
        tx.commit()
            .await
            .map_err(|e| storage_error("commit update", collection, e))?;
        Ok(result)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> PartsResult<DeleteResult> {
        let sql = format!(
            "DELETE FROM {table} WHERE seq = (SELECT seq FROM {table} WHERE {cond} ORDER BY seq LIMIT 1)",
            table = collection.name(),
            cond = where_clause(filter)
        );
        let result = bind_filter(sqlx::query(&sql), filter)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete document", collection, e))?;

        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn write_batch(&self, ops: Vec<WriteOp>) -> PartsResult<Vec<WriteOutcome>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PartsError::Storage(format!("Failed to begin transaction: {}", e)))?;

        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            let outcome = match op {
                WriteOp::InsertOne {
                    collection,
                    document,
                } => WriteOutcome::Inserted(insert_with(&mut tx, collection, document).await?),
                WriteOp::UpdateOne {
                    collection,
                    filter,
                    set,
                    upsert,
                } => WriteOutcome::Updated(
                    update_with(&mut tx, collection, &filter, &set, upsert).await?,
                ),
            };
            outcomes.push(outcome);
        }

        // Dropping `tx` on an early return above rolls the batch back.
        tx.commit()
            .await
            .map_err(|e| PartsError::Storage(format!("Failed to commit batch: {}", e)))?;
        debug!("Committed batch of {} writes", outcomes.len());
        Ok(outcomes)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
