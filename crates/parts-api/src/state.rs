//! # Application State
//!
//! Shared state for the Axum application: the document store, the payment
//! gateway and the token service, all injected at construction time.

use crate::auth::TokenService;
use parts_core::{Currency, InMemoryStore, PartsError, PartsResult, SharedPaymentGateway, SharedStore};
use parts_postgres::{PostgresConfig, PostgresStore};
use parts_stripe::StripePaymentGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Token-signing secret
    pub token_secret: String,
    /// PostgreSQL URL; in-memory store when absent
    pub database_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("token_secret", &"[hidden]")
            .field("database_url", &self.database_url.as_ref().map(|_| "[hidden]"))
            .finish()
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> PartsResult<Self> {
        dotenvy::dotenv().ok();

        let token_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PartsError::Configuration("ACCESS_TOKEN_SECRET not set".to_string()))?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            token_secret,
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> PartsResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PartsError::Configuration(format!("Invalid socket address: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Document store holding every collection
    pub store: SharedStore,
    /// Payment provider delegate
    pub payments: SharedPaymentGateway,
    /// Bearer token signer/verifier
    pub tokens: TokenService,
    /// Currency of every payment intent
    pub currency: Currency,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Assemble state from explicit collaborators
    pub fn new(config: AppConfig, store: SharedStore, payments: SharedPaymentGateway) -> Self {
        let tokens = TokenService::new(&config.token_secret);
        Self {
            store,
            payments,
            tokens,
            currency: Currency::USD,
            config,
        }
    }

    /// Build state from the environment: Postgres when `DATABASE_URL` is set,
    /// Stripe from `STRIPE_SECRET_KEY`.
    pub async fn from_env() -> PartsResult<Self> {
        let config = AppConfig::from_env()?;
        let store = connect_store(&config).await?;
        let payments = StripePaymentGateway::from_env()?;

        Ok(Self::new(config, store, Arc::new(payments)))
    }
}

async fn connect_store(config: &AppConfig) -> PartsResult<SharedStore> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(&PostgresConfig::new(url.as_str())).await?;
            store.ensure_schema().await?;
            info!("Connected to PostgreSQL document store");
            Ok(Arc::new(store))
        }
        None => {
            if config.is_production() {
                return Err(PartsError::Configuration(
                    "DATABASE_URL is required in production".to_string(),
                ));
            }
            warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
