//! # parts-postgres
//!
//! Durable [`DocumentStore`](parts_core::DocumentStore) for parts-store-rs,
//! backed by PostgreSQL JSONB tables (one per collection).
//!
//! ```rust,ignore
//! use parts_postgres::{PostgresConfig, PostgresStore};
//!
//! let store = PostgresStore::connect(&PostgresConfig::new(database_url)).await?;
//! store.ensure_schema().await?;
//! ```

pub mod store;

pub use store::{PostgresConfig, PostgresStore};
