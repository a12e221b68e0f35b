//! # parts-api
//!
//! HTTP API layer for parts-store-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Bearer-token access control with an admin role check
//! - CRUD endpoints over the five store collections
//! - Payment intent creation through the configured provider
//!
//! ## Endpoints
//!
//! | Method | Path | Guard | Description |
//! |--------|------|-------|-------------|
//! | GET | `/` | | Greeting |
//! | POST | `/product` | admin | Create product |
//! | GET | `/products` | | List products |
//! | GET | `/product/{id}` | user | Get product |
//! | DELETE | `/product/{id}` | admin | Delete product |
//! | GET | `/orders` | admin | List orders |
//! | PATCH | `/order/shipped/{id}` | admin | Mark order shipped |
//! | POST | `/order` | user | Create order |
//! | GET | `/order/{email}` | | Orders of a customer |
//! | DELETE | `/order/{id}` | | Delete order |
//! | PATCH | `/order/{id}` | | Record payment, mark paid |
//! | GET | `/payment/{id}` | user | Order lookup for checkout |
//! | POST | `/create-payment-intent` | | Create payment intent |
//! | GET | `/reviews` | | List reviews |
//! | POST | `/review` | | Create review |
//! | GET | `/users` | admin | List users |
//! | PUT | `/user/admin/{email}` | admin | Grant admin role |
//! | GET | `/admin/{email}` | user | Admin status |
//! | GET | `/user/{email}` | | Get user |
//! | PUT | `/user/{email}` | | Upsert profile, issue token |

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
