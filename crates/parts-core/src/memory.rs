//! In-memory document store

use crate::document::{
    assign_id, document_id, merge_fields, Collection, DeleteResult, Document, Filter,
    InsertOneResult, UpdateResult, WriteOp, WriteOutcome,
};
use crate::error::{PartsError, PartsResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Collections = HashMap<Collection, Vec<Document>>;

/// In-memory implementation of [`DocumentStore`].
///
/// Each collection is a vector in insertion order. Batches are applied to a
/// copy and swapped in while the write lock is held.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map_or(0, Vec::len)
    }
}

fn insert_into(
    collections: &mut Collections,
    collection: Collection,
    mut document: Document,
) -> PartsResult<InsertOneResult> {
    let docs = collections.entry(collection).or_default();
    let id = assign_id(&mut document);

    if docs.iter().any(|d| document_id(d) == Some(id.as_str())) {
        return Err(PartsError::Conflict(format!(
            "Document '{}' already exists in {}",
            id, collection
        )));
    }

    docs.push(document);
    Ok(InsertOneResult::new(id))
}

fn update_in(
    collections: &mut Collections,
    collection: Collection,
    filter: &Filter,
    set: &Document,
    upsert: bool,
) -> PartsResult<UpdateResult> {
    let docs = collections.entry(collection).or_default();

    if let Some(existing) = docs.iter_mut().find(|d| filter.matches(d)) {
        let modified = merge_fields(existing, set);
        return Ok(UpdateResult::matched(modified));
    }

    if !upsert {
        return Ok(UpdateResult::unmatched());
    }

    let mut document = filter.upsert_seed();
    merge_fields(&mut document, set);
    let inserted = insert_into(collections, collection, document)?;
    Ok(UpdateResult::upserted(inserted.inserted_id))
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> PartsResult<InsertOneResult> {
        let mut collections = self.collections.write().await;
        insert_into(&mut collections, collection, document)
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> PartsResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> PartsResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> PartsResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        update_in(&mut collections, collection, filter, &set, upsert)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> PartsResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteResult::new(0));
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }

    async fn write_batch(&self, ops: Vec<WriteOp>) -> PartsResult<Vec<WriteOutcome>> {
        let mut collections = self.collections.write().await;
        let mut staged = collections.clone();
        let mut outcomes = Vec::with_capacity(ops.len());

        for op in ops {
            let outcome = match op {
                WriteOp::InsertOne {
                    collection,
                    document,
                } => WriteOutcome::Inserted(insert_into(&mut staged, collection, document)?),
                WriteOp::UpdateOne {
                    collection,
                    filter,
                    set,
                    upsert,
                } => WriteOutcome::Updated(update_in(
                    &mut staged,
                    collection,
                    &filter,
                    &set,
                    upsert,
                )?),
            };
            outcomes.push(outcome);
        }

        *collections = staged;
        Ok(outcomes)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = InMemoryStore::new();
        for name in ["first", "second", "third"] {
            store
                .insert_one(Collection::Reviews, doc(json!({ "text": name })))
                .await
                .unwrap();
        }

        let reviews = store.find(Collection::Reviews, &Filter::All).await.unwrap();
        let texts: Vec<_> = reviews.iter().map(|r| r["text"].clone()).collect();
        assert_eq!(texts, vec![json!("first"), json!("second"), json!("third")]);
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = InMemoryStore::new();
        store
            .insert_one(Collection::Products, doc(json!({"_id": "p1"})))
            .await
            .unwrap();

        let err = store
            .insert_one(Collection::Products, doc(json!({"_id": "p1"})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let store = InMemoryStore::new();
        let filter = Filter::eq("email", "a@x.io");

        let first = store
            .update_one(Collection::Users, &filter, doc(json!({"name": "Ann"})), true)
            .await
            .unwrap();
        assert_eq!(first.upserted_count, 1);

        let second = store
            .update_one(Collection::Users, &filter, doc(json!({"phone": "555"})), true)
            .await
            .unwrap();
        assert_eq!(second.matched_count, 1);
        assert_eq!(second.modified_count, 1);
        assert_eq!(store.count(Collection::Users).await, 1);

        let user = store
            .find_one(Collection::Users, &filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user["name"], json!("Ann"));
        assert_eq!(user["phone"], json!("555"));
        assert_eq!(user["email"], json!("a@x.io"));
    }

    #[tokio::test]
    async fn test_update_without_upsert_leaves_store_untouched() {
        let store = InMemoryStore::new();
        let result = store
            .update_one(
                Collection::Users,
                &Filter::eq("email", "ghost@x.io"),
                doc(json!({"role": "admin"})),
                false,
            )
            .await
            .unwrap();

        assert_eq!(result, UpdateResult::unmatched());
        assert_eq!(store.count(Collection::Users).await, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_reports_zero() {
        let store = InMemoryStore::new();
        let result = store
            .delete_one(Collection::Orders, &Filter::by_id("nope"))
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_failed_batch_commits_nothing() {
        let store = InMemoryStore::new();
        store
            .insert_one(Collection::Payments, doc(json!({"_id": "dup"})))
            .await
            .unwrap();

        let ops = vec![
            WriteOp::InsertOne {
                collection: Collection::Orders,
                document: doc(json!({"item": "gear"})),
            },
            WriteOp::InsertOne {
                collection: Collection::Payments,
                document: doc(json!({"_id": "dup"})),
            },
        ];

        assert!(store.write_batch(ops).await.is_err());
        assert_eq!(store.count(Collection::Orders).await, 0);
        assert_eq!(store.count(Collection::Payments).await, 1);
    }
}
