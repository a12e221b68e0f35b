//! # Document Model
//!
//! Schemaless documents, collection names, query filters and the
//! acknowledgement types returned by every write.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field holding the generated document identifier
pub const ID_FIELD: &str = "_id";

/// A schemaless JSON document
pub type Document = Map<String, Value>;

/// Generate a fresh document identifier
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Read the identifier of a stored document
pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(|v| v.as_str())
}

/// Ensure the document carries an `_id`, generating one when absent.
/// Returns the identifier.
pub fn assign_id(document: &mut Document) -> String {
    if let Some(id) = document_id(document) {
        return id.to_string();
    }
    let id = new_document_id();
    document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    id
}

/// Merge `set` into `document` at the top level.
/// Returns true if any stored value changed.
pub fn merge_fields(document: &mut Document, set: &Document) -> bool {
    let mut modified = false;
    for (key, value) in set {
        if document.get(key) != Some(value) {
            document.insert(key.clone(), value.clone());
            modified = true;
        }
    }
    modified
}

/// The five collections of the parts store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Products,
    Users,
    Orders,
    #[serde(rename = "payment")]
    Payments,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Products,
        Collection::Users,
        Collection::Orders,
        Collection::Payments,
        Collection::Reviews,
    ];

    /// Storage name of the collection
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Users => "users",
            Collection::Orders => "orders",
            Collection::Payments => "payment",
            Collection::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Query filter over a single collection
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document
    All,
    /// Document with the given `_id`
    Id(String),
    /// Documents whose top-level `field` equals `value`
    Eq { field: String, value: Value },
}

impl Filter {
    pub fn by_id(id: impl Into<String>) -> Self {
        Filter::Id(id.into())
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Check whether a document satisfies this filter
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => document_id(document) == Some(id.as_str()),
            Filter::Eq { field, value } => document.get(field) == Some(value),
        }
    }

    /// Seed document for an upsert: the equality the filter pins down
    pub fn upsert_seed(&self) -> Document {
        let mut seed = Document::new();
        match self {
            Filter::All => {}
            Filter::Id(id) => {
                seed.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            }
            Filter::Eq { field, value } => {
                seed.insert(field.clone(), value.clone());
            }
        }
        seed
    }
}

/// Acknowledgement of a single insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertOneResult {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

/// Acknowledgement of a single update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            ..Default::default()
        }
    }

    pub fn upserted(id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id.into()),
        }
    }
}

/// Acknowledgement of a single delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// One write inside an atomic batch
#[derive(Debug, Clone)]
pub enum WriteOp {
    InsertOne {
        collection: Collection,
        document: Document,
    },
    UpdateOne {
        collection: Collection,
        filter: Filter,
        set: Document,
        upsert: bool,
    },
}

/// Result of one [`WriteOp`], in batch order
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Inserted(InsertOneResult),
    Updated(UpdateResult),
}

impl WriteOutcome {
    pub fn into_update(self) -> Option<UpdateResult> {
        match self {
            WriteOutcome::Updated(result) => Some(result),
            WriteOutcome::Inserted(_) => None,
        }
    }
}
