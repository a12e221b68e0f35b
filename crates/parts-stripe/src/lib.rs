//! # parts-stripe
//!
//! Stripe payment delegate for parts-store-rs.
//!
//! The store never charges cards itself. It asks Stripe for a payment intent
//! sized in minor units and relays the client secret; the storefront confirms
//! the payment with Stripe.js and later reports the transaction id back.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parts_stripe::StripePaymentGateway;
//! use parts_core::{Currency, PaymentGateway, PaymentIntentRequest};
//!
//! let gateway = StripePaymentGateway::from_env()?;
//! let request = PaymentIntentRequest::from_total(45.50, Currency::USD)?;
//! let intent = gateway.create_payment_intent(&request).await?;
//!
//! // Return intent.client_secret to the browser
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripePaymentGateway;
