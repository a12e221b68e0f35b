//! # Payment Gateway Trait
//!
//! The one external payment call the store makes: create a payment intent
//! for an amount in minor currency units and hand its client secret back to
//! the caller, who completes the charge client-side.

use crate::error::{PartsError, PartsResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.),
    /// rounding to the nearest unit.
    pub fn to_minor_units(&self, amount: f64) -> PartsResult<i64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(PartsError::InvalidRequest(format!(
                "Amount must be a non-negative number, got {}",
                amount
            )));
        }
        let multiplier = 10_f64.powi(i32::from(self.decimal_places()));
        let minor = (amount * multiplier).round();
        if minor >= i64::MAX as f64 {
            return Err(PartsError::InvalidRequest(format!(
                "Amount too large: {}",
                amount
            )));
        }
        Ok(minor as i64)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Amount to charge, already in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: Currency,
}

impl PaymentIntentRequest {
    /// Build a request from a decimal total such as `12.5` dollars
    pub fn from_total(total: f64, currency: Currency) -> PartsResult<Self> {
        Ok(Self {
            amount: currency.to_minor_units(total)?,
            currency,
        })
    }
}

/// A payment intent created by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider's intent ID
    pub id: String,
    /// Opaque secret the client uses to confirm the payment
    pub client_secret: String,
    pub amount: i64,
    pub currency: Currency,
}

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for the requested amount.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PartsResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Shared handle to a payment gateway (dynamic dispatch)
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
