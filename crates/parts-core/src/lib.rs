//! # parts-core
//!
//! Core types and traits for the parts store backend.
//!
//! This crate provides:
//! - `Document`, `Collection` and `Filter` for the schemaless data model
//! - `DocumentStore` trait and the `InMemoryStore` implementation
//! - `PaymentGateway` trait and `Currency` minor-unit conversion
//! - `PartsError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use parts_core::{Collection, DocumentStore, Filter, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.insert_one(Collection::Reviews, review).await?;
//!
//! // Newest first, the way the listing routes return them
//! let mut reviews = store.find(Collection::Reviews, &Filter::All).await?;
//! reviews.reverse();
//! ```

pub mod document;
pub mod error;
pub mod memory;
pub mod payment;
pub mod store;

// Re-exports for convenience
pub use document::{
    Collection, DeleteResult, Document, Filter, InsertOneResult, UpdateResult, WriteOp,
    WriteOutcome, ID_FIELD,
};
pub use error::{PartsError, PartsResult};
pub use memory::InMemoryStore;
pub use payment::{
    Currency, PaymentGateway, PaymentIntent, PaymentIntentRequest, SharedPaymentGateway,
};
pub use store::{DocumentStore, SharedStore};
