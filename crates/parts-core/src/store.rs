//! # Document Store Trait
//!
//! The narrow interface every handler uses to reach persistent state.
//! Implementations: in-memory (tests, local development) and PostgreSQL.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   DocumentStore (trait)                     │
//! │  ├── insert_one() / find() / find_one()                     │
//! │  ├── update_one() / delete_one()                            │
//! │  └── write_batch()                                          │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │                   │
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │ InMemoryStore │   │ PostgresStore │
//!          └───────────────┘   └───────────────┘
//! ```

use crate::document::{
    Collection, DeleteResult, Document, Filter, InsertOneResult, UpdateResult, WriteOp,
    WriteOutcome,
};
use crate::error::PartsResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for document store implementations.
///
/// Reads return documents in insertion order; callers that need
/// most-recent-first reverse the result themselves.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document, generating `_id` when the caller did not supply one.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> PartsResult<InsertOneResult>;

    /// All documents matching the filter, oldest first.
    async fn find(&self, collection: Collection, filter: &Filter) -> PartsResult<Vec<Document>>;

    /// First document matching the filter.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> PartsResult<Option<Document>>;

    /// Merge `set` into the first matching document.
    ///
    /// With `upsert`, a missing document is created from the filter's
    /// equality field plus `set`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> PartsResult<UpdateResult>;

    /// Delete the first matching document.
    async fn delete_one(&self, collection: Collection, filter: &Filter)
        -> PartsResult<DeleteResult>;

    /// Apply every op or none of them.
    async fn write_batch(&self, ops: Vec<WriteOp>) -> PartsResult<Vec<WriteOutcome>>;

    /// Backend name (for logging).
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to a store (dynamic dispatch)
pub type SharedStore = Arc<dyn DocumentStore>;
